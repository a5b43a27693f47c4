use anchor_lang::prelude::*;

pub mod constants;
pub mod errors;
pub mod math;
pub mod shares;
pub mod state;
pub mod oracle;
pub mod interest;
pub mod health;
pub mod ledger;
pub mod liquidation;
pub mod instructions;

#[cfg(test)]
mod testing;

use instructions::*;
use health::PositionHealth;
use interest::MarketApy;

declare_id!("8WjFsimtWN8fFb2U9f8krSURV4DAXXiAGT38mi9x3Mcb");

#[program]
pub mod isolated_lending {
    use super::*;

    /// Initialize the global protocol configuration
    pub fn initialize(ctx: Context<Initialize>, fee_recipient: Pubkey) -> Result<()> {
        instructions::initialize::handler(ctx, fee_recipient)
    }

    /// Allow markets to be created with `lltv`
    pub fn enable_lltv(ctx: Context<UpdateConfig>, lltv: u128) -> Result<()> {
        instructions::initialize::enable_lltv_handler(ctx, lltv)
    }

    /// Change the receiver of protocol fees
    pub fn set_fee_recipient(ctx: Context<UpdateConfig>, fee_recipient: Pubkey) -> Result<()> {
        instructions::initialize::set_fee_recipient_handler(ctx, fee_recipient)
    }

    /// Register an interest rate model
    pub fn create_rate_model(
        ctx: Context<CreateRateModel>,
        index: u32,
        config: RateModelConfig,
    ) -> Result<()> {
        instructions::rate_model::handler(ctx, index, config)
    }

    /// Create a price feed owned by the signer
    pub fn create_price_feed(ctx: Context<CreatePriceFeed>) -> Result<()> {
        instructions::price_feed::handler(ctx)
    }

    /// Push a new price to a feed
    pub fn set_price(ctx: Context<SetPrice>, price: u128) -> Result<()> {
        instructions::price_feed::set_price_handler(ctx, price)
    }

    /// Create an isolated lending market
    pub fn create_market(ctx: Context<CreateMarket>, id: [u8; 32], params: MarketParams) -> Result<()> {
        instructions::market::handler(ctx, id, params)
    }

    /// Set a market's protocol fee
    pub fn set_fee(ctx: Context<SetFee>, fee: u128) -> Result<()> {
        instructions::market::set_fee_handler(ctx, fee)
    }

    /// Accrue interest on a market
    pub fn accrue_interest(ctx: Context<AccrueInterest>) -> Result<()> {
        instructions::market::accrue_interest_handler(ctx)
    }

    /// Move accrued fee shares to the fee recipient's position
    pub fn claim_fee_shares(ctx: Context<ClaimFeeShares>) -> Result<()> {
        instructions::market::claim_fee_shares_handler(ctx)
    }

    /// Create an empty position
    pub fn open_position(ctx: Context<OpenPosition>) -> Result<()> {
        instructions::position::handler(ctx)
    }

    /// Supply loan assets
    pub fn supply(ctx: Context<Supply>, assets: u64, shares: u128) -> Result<()> {
        instructions::supply::handler(ctx, assets, shares)
    }

    /// Withdraw supplied loan assets
    pub fn withdraw(ctx: Context<Withdraw>, assets: u64, shares: u128) -> Result<()> {
        instructions::withdraw::handler(ctx, assets, shares)
    }

    /// Post collateral
    pub fn supply_collateral(ctx: Context<SupplyCollateral>, assets: u64) -> Result<()> {
        instructions::collateral::handler(ctx, assets)
    }

    /// Post collateral to several positions, skipping rejected entries
    pub fn supply_collateral_batch<'info>(
        ctx: Context<'_, '_, 'info, 'info, SupplyCollateralBatch<'info>>,
        amounts: Vec<u64>,
    ) -> Result<Vec<bool>> {
        instructions::collateral::supply_collateral_batch_handler(ctx, amounts)
    }

    /// Withdraw collateral
    pub fn withdraw_collateral(ctx: Context<WithdrawCollateral>, assets: u64) -> Result<()> {
        instructions::collateral::withdraw_collateral_handler(ctx, assets)
    }

    /// Borrow loan assets against collateral
    pub fn borrow(ctx: Context<Borrow>, assets: u64, shares: u128) -> Result<()> {
        instructions::borrow::handler(ctx, assets, shares)
    }

    /// Repay borrowed assets
    pub fn repay(ctx: Context<Repay>, assets: u64, shares: u128) -> Result<()> {
        instructions::repay::handler(ctx, assets, shares)
    }

    /// Liquidate an unhealthy position
    pub fn liquidate(ctx: Context<Liquidate>, seized_assets: u64, repaid_shares: u128) -> Result<()> {
        instructions::liquidate::handler(ctx, seized_assets, repaid_shares)
    }

    /// Solvency of a position at the current price
    pub fn position_health(ctx: Context<GetPositionHealth>) -> Result<PositionHealth> {
        instructions::views::position_health_handler(ctx)
    }

    /// Utilization and yields of a market
    pub fn market_apy(ctx: Context<GetMarketApy>) -> Result<MarketApy> {
        instructions::views::market_apy_handler(ctx)
    }
}

// Re-export for external use
pub use state::*;
pub use errors::*;
pub use constants::*;
pub use math::*;
pub use oracle::{FreshPrice, Oracle, PriceFeed};
pub use interest::{KinkRateModel, RateModel, RateModelConfig};
