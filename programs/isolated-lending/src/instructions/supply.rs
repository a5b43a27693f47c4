use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};
use crate::constants::*;
use crate::errors::LendingError;
use crate::interest::KinkRateModel;
use crate::ledger;
use crate::state::*;
use super::{deposit, token_amount};

/// Supply loan assets to a market
///
/// Lenders receive supply shares whose value grows as borrowers pay
/// interest. The caller pays; the shares are credited to `on_behalf`.
/// Exactly one of `assets` and `shares` must be nonzero.
#[derive(Accounts)]
pub struct Supply<'info> {
    #[account(mut)]
    pub user: Signer<'info>,

    /// CHECK: any account may be credited; only its key is used
    pub on_behalf: UncheckedAccount<'info>,

    #[account(
        mut,
        seeds = [MARKET_SEED, market.id.as_ref()],
        bump = market.bump
    )]
    pub market: Account<'info, Market>,

    #[account(
        init_if_needed,
        payer = user,
        space = Position::SIZE,
        seeds = [POSITION_SEED, market.key().as_ref(), on_behalf.key().as_ref()],
        bump
    )]
    pub position: Account<'info, Position>,

    #[account(address = market.params.irm @ LendingError::InvalidMarketConfig)]
    pub rate_model: Account<'info, KinkRateModel>,

    /// User's token account (source of supply)
    #[account(
        mut,
        constraint = user_token_account.owner == user.key() @ LendingError::Unauthorized,
        constraint = user_token_account.mint == market.params.loan_mint @ LendingError::InvalidMarketConfig
    )]
    pub user_token_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        seeds = [LOAN_VAULT_SEED, market.key().as_ref()],
        bump = market.loan_vault_bump
    )]
    pub loan_vault: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<Supply>, assets: u64, shares: u128) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let market_key = ctx.accounts.market.key();
    let on_behalf = ctx.accounts.on_behalf.key();
    let rate_model: &KinkRateModel = &ctx.accounts.rate_model;
    let market = &mut ctx.accounts.market;
    let position = &mut ctx.accounts.position;

    position.initialize_if_needed(market_key, on_behalf, ctx.bumps.position)?;
    let (assets, shares) = ledger::supply(market, position, rate_model, now, assets.into(), shares)?;

    deposit(
        &ctx.accounts.token_program,
        &ctx.accounts.user_token_account,
        &ctx.accounts.loan_vault,
        &ctx.accounts.user,
        token_amount(assets)?,
    )?;

    emit!(Supplied {
        market_id: ctx.accounts.market.id,
        caller: ctx.accounts.user.key(),
        on_behalf,
        assets,
        shares,
        timestamp: now,
    });

    Ok(())
}

#[event]
pub struct Supplied {
    pub market_id: [u8; 32],
    pub caller: Pubkey,
    pub on_behalf: Pubkey,
    pub assets: u128,
    pub shares: u128,
    pub timestamp: i64,
}
