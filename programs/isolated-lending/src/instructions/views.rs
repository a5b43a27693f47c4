use anchor_lang::prelude::*;
use crate::constants::*;
use crate::errors::LendingError;
use crate::health::{current_health, PositionHealth};
use crate::interest::{accrue_interest, market_apy, KinkRateModel, MarketApy};
use crate::oracle::PriceFeed;
use crate::state::*;

/// Read-only view of a position's solvency
///
/// Interest is accrued on a copy of the market, so the figures are current
/// without writing anything.
#[derive(Accounts)]
pub struct GetPositionHealth<'info> {
    #[account(
        seeds = [MARKET_SEED, market.id.as_ref()],
        bump = market.bump
    )]
    pub market: Account<'info, Market>,

    #[account(constraint = position.market == market.key() @ LendingError::InvalidMarketConfig)]
    pub position: Account<'info, Position>,

    #[account(address = market.params.irm @ LendingError::InvalidMarketConfig)]
    pub rate_model: Account<'info, KinkRateModel>,

    #[account(address = market.params.oracle @ LendingError::InvalidMarketConfig)]
    pub price_feed: Account<'info, PriceFeed>,
}

pub fn position_health_handler(ctx: Context<GetPositionHealth>) -> Result<PositionHealth> {
    let now = Clock::get()?.unix_timestamp;
    let rate_model: &KinkRateModel = &ctx.accounts.rate_model;

    let mut market = Market::clone(&ctx.accounts.market);
    accrue_interest(&mut market, rate_model, now)?;

    current_health(&market, &ctx.accounts.position, &ctx.accounts.price_feed.at(now))
}

/// Read-only view of a market's utilization and yields
#[derive(Accounts)]
pub struct GetMarketApy<'info> {
    #[account(
        seeds = [MARKET_SEED, market.id.as_ref()],
        bump = market.bump
    )]
    pub market: Account<'info, Market>,

    #[account(address = market.params.irm @ LendingError::InvalidMarketConfig)]
    pub rate_model: Account<'info, KinkRateModel>,
}

pub fn market_apy_handler(ctx: Context<GetMarketApy>) -> Result<MarketApy> {
    let now = Clock::get()?.unix_timestamp;
    let rate_model: &KinkRateModel = &ctx.accounts.rate_model;

    let mut market = Market::clone(&ctx.accounts.market);
    accrue_interest(&mut market, rate_model, now)?;

    market_apy(&market, rate_model)
}
