use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};
use crate::constants::*;
use crate::errors::LendingError;
use crate::interest::KinkRateModel;
use crate::liquidation;
use crate::oracle::PriceFeed;
use crate::state::*;
use super::{deposit, release, token_amount};

/// Liquidate an unhealthy position
///
/// The liquidator repays part of the borrower's debt and receives collateral
/// worth the repaid amount times the market's incentive factor. Exactly one
/// of `seized_assets` and `repaid_shares` must be nonzero. If the borrower's
/// collateral runs out, their remaining debt is written off against lenders.
#[derive(Accounts)]
pub struct Liquidate<'info> {
    pub liquidator: Signer<'info>,

    #[account(
        mut,
        seeds = [MARKET_SEED, market.id.as_ref()],
        bump = market.bump
    )]
    pub market: Account<'info, Market>,

    #[account(
        mut,
        seeds = [POSITION_SEED, market.key().as_ref(), borrower_position.owner.as_ref()],
        bump = borrower_position.bump
    )]
    pub borrower_position: Account<'info, Position>,

    #[account(address = market.params.irm @ LendingError::InvalidMarketConfig)]
    pub rate_model: Account<'info, KinkRateModel>,

    #[account(address = market.params.oracle @ LendingError::InvalidMarketConfig)]
    pub price_feed: Account<'info, PriceFeed>,

    /// Liquidator's loan token account (source of repayment)
    #[account(
        mut,
        constraint = liquidator_loan_account.owner == liquidator.key() @ LendingError::Unauthorized,
        constraint = liquidator_loan_account.mint == market.params.loan_mint @ LendingError::InvalidMarketConfig
    )]
    pub liquidator_loan_account: Account<'info, TokenAccount>,

    /// Receives the seized collateral
    #[account(
        mut,
        constraint = liquidator_collateral_account.mint == market.params.collateral_mint @ LendingError::InvalidMarketConfig
    )]
    pub liquidator_collateral_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        seeds = [LOAN_VAULT_SEED, market.key().as_ref()],
        bump = market.loan_vault_bump
    )]
    pub loan_vault: Account<'info, TokenAccount>,

    #[account(
        mut,
        seeds = [COLLATERAL_VAULT_SEED, market.key().as_ref()],
        bump = market.collateral_vault_bump
    )]
    pub collateral_vault: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn handler(ctx: Context<Liquidate>, seized_assets: u64, repaid_shares: u128) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let rate_model: &KinkRateModel = &ctx.accounts.rate_model;
    let oracle = ctx.accounts.price_feed.at(now);
    let market = &mut ctx.accounts.market;
    let borrower_position = &mut ctx.accounts.borrower_position;

    let outcome = liquidation::liquidate(
        market,
        borrower_position,
        rate_model,
        &oracle,
        now,
        seized_assets.into(),
        repaid_shares,
    )?;

    deposit(
        &ctx.accounts.token_program,
        &ctx.accounts.liquidator_loan_account,
        &ctx.accounts.loan_vault,
        &ctx.accounts.liquidator,
        token_amount(outcome.repaid_assets)?,
    )?;

    release(
        &ctx.accounts.token_program,
        &ctx.accounts.collateral_vault,
        &ctx.accounts.liquidator_collateral_account,
        &ctx.accounts.market,
        token_amount(outcome.seized_assets)?,
    )?;

    emit!(Liquidated {
        market_id: ctx.accounts.market.id,
        liquidator: ctx.accounts.liquidator.key(),
        borrower: ctx.accounts.borrower_position.owner,
        repaid_assets: outcome.repaid_assets,
        repaid_shares: outcome.repaid_shares,
        seized_assets: outcome.seized_assets,
        bad_debt_assets: outcome.bad_debt_assets,
        bad_debt_shares: outcome.bad_debt_shares,
        timestamp: now,
    });

    Ok(())
}

#[event]
pub struct Liquidated {
    pub market_id: [u8; 32],
    pub liquidator: Pubkey,
    pub borrower: Pubkey,
    pub repaid_assets: u128,
    pub repaid_shares: u128,
    pub seized_assets: u128,
    pub bad_debt_assets: u128,
    pub bad_debt_shares: u128,
    pub timestamp: i64,
}
