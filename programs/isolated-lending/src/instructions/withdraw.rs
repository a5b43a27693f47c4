use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};
use crate::constants::*;
use crate::errors::LendingError;
use crate::interest::KinkRateModel;
use crate::ledger;
use crate::state::*;
use super::{release, token_amount};

/// Withdraw supplied loan assets
///
/// Burns supply shares of the signer's position and pays the assets to
/// `receiver_token_account`. Fails when the assets are currently lent out.
#[derive(Accounts)]
pub struct Withdraw<'info> {
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [MARKET_SEED, market.id.as_ref()],
        bump = market.bump
    )]
    pub market: Account<'info, Market>,

    #[account(
        mut,
        seeds = [POSITION_SEED, market.key().as_ref(), owner.key().as_ref()],
        bump = position.bump
    )]
    pub position: Account<'info, Position>,

    #[account(address = market.params.irm @ LendingError::InvalidMarketConfig)]
    pub rate_model: Account<'info, KinkRateModel>,

    #[account(
        mut,
        constraint = receiver_token_account.mint == market.params.loan_mint @ LendingError::InvalidMarketConfig
    )]
    pub receiver_token_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        seeds = [LOAN_VAULT_SEED, market.key().as_ref()],
        bump = market.loan_vault_bump
    )]
    pub loan_vault: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn handler(ctx: Context<Withdraw>, assets: u64, shares: u128) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let rate_model: &KinkRateModel = &ctx.accounts.rate_model;
    let market = &mut ctx.accounts.market;
    let position = &mut ctx.accounts.position;

    let (assets, shares) = ledger::withdraw(market, position, rate_model, now, assets.into(), shares)?;

    release(
        &ctx.accounts.token_program,
        &ctx.accounts.loan_vault,
        &ctx.accounts.receiver_token_account,
        &ctx.accounts.market,
        token_amount(assets)?,
    )?;

    emit!(Withdrawn {
        market_id: ctx.accounts.market.id,
        owner: ctx.accounts.owner.key(),
        receiver: ctx.accounts.receiver_token_account.key(),
        assets,
        shares,
        timestamp: now,
    });

    Ok(())
}

#[event]
pub struct Withdrawn {
    pub market_id: [u8; 32],
    pub owner: Pubkey,
    pub receiver: Pubkey,
    pub assets: u128,
    pub shares: u128,
    pub timestamp: i64,
}
