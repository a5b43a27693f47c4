use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};
use crate::constants::*;
use crate::errors::LendingError;
use crate::interest::{accrue_interest, KinkRateModel};
use crate::oracle::PriceFeed;
use crate::state::*;

/// Create an isolated lending market
///
/// A market is identified by the hash of its parameters, so each
/// `(loan, collateral, oracle, irm, lltv)` tuple has exactly one market.
/// Creation is permissionless; the LLTV must be enabled and the rate model
/// registered.
#[derive(Accounts)]
#[instruction(id: [u8; 32], params: MarketParams)]
pub struct CreateMarket<'info> {
    #[account(mut)]
    pub creator: Signer<'info>,

    #[account(
        seeds = [GLOBAL_CONFIG_SEED],
        bump = global_config.bump
    )]
    pub global_config: Account<'info, GlobalConfig>,

    #[account(address = params.loan_mint @ LendingError::InvalidMarketConfig)]
    pub loan_mint: Account<'info, Mint>,

    #[account(address = params.collateral_mint @ LendingError::InvalidMarketConfig)]
    pub collateral_mint: Account<'info, Mint>,

    #[account(
        address = params.oracle @ LendingError::InvalidMarketConfig,
        constraint = price_feed.collateral_mint == params.collateral_mint @ LendingError::InvalidMarketConfig,
        constraint = price_feed.loan_mint == params.loan_mint @ LendingError::InvalidMarketConfig
    )]
    pub price_feed: Account<'info, PriceFeed>,

    #[account(address = params.irm @ LendingError::InvalidMarketConfig)]
    pub rate_model: Account<'info, KinkRateModel>,

    #[account(
        init,
        payer = creator,
        space = Market::SIZE,
        seeds = [MARKET_SEED, id.as_ref()],
        bump
    )]
    pub market: Account<'info, Market>,

    /// Holds supplied loan assets
    #[account(
        init,
        payer = creator,
        seeds = [LOAN_VAULT_SEED, market.key().as_ref()],
        bump,
        token::mint = loan_mint,
        token::authority = market
    )]
    pub loan_vault: Account<'info, TokenAccount>,

    /// Holds posted collateral
    #[account(
        init,
        payer = creator,
        seeds = [COLLATERAL_VAULT_SEED, market.key().as_ref()],
        bump,
        token::mint = collateral_mint,
        token::authority = market
    )]
    pub collateral_vault: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<CreateMarket>, id: [u8; 32], params: MarketParams) -> Result<()> {
    require!(id == params.id(), LendingError::InvalidMarketConfig);
    require!(
        ctx.accounts.global_config.is_lltv_enabled(params.lltv),
        LendingError::LltvNotEnabled
    );

    let now = Clock::get()?.unix_timestamp;
    let market = &mut ctx.accounts.market;
    market.initialize(
        params,
        ctx.bumps.market,
        ctx.bumps.loan_vault,
        ctx.bumps.collateral_vault,
        now,
    )?;

    msg!("market created with lltv {}", params.lltv);
    emit!(MarketCreated {
        market_id: id,
        market: market.key(),
        creator: ctx.accounts.creator.key(),
        loan_mint: params.loan_mint,
        collateral_mint: params.collateral_mint,
        oracle: params.oracle,
        irm: params.irm,
        lltv: params.lltv,
        timestamp: now,
    });

    Ok(())
}

/// Owner-only change of a market's protocol fee
#[derive(Accounts)]
pub struct SetFee<'info> {
    pub owner: Signer<'info>,

    #[account(
        seeds = [GLOBAL_CONFIG_SEED],
        bump = global_config.bump,
        has_one = owner @ LendingError::Unauthorized
    )]
    pub global_config: Account<'info, GlobalConfig>,

    #[account(
        mut,
        seeds = [MARKET_SEED, market.id.as_ref()],
        bump = market.bump
    )]
    pub market: Account<'info, Market>,

    #[account(address = market.params.irm @ LendingError::InvalidMarketConfig)]
    pub rate_model: Account<'info, KinkRateModel>,
}

pub fn set_fee_handler(ctx: Context<SetFee>, fee: u128) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let rate_model: &KinkRateModel = &ctx.accounts.rate_model;
    let market = &mut ctx.accounts.market;

    // interest up to now is charged at the old fee
    accrue_interest(market, rate_model, now)?;
    market.set_fee(fee)?;

    emit!(FeeSet {
        market_id: market.id,
        fee,
        timestamp: now,
    });

    Ok(())
}

/// Brings a market's totals current. Anyone may call it.
#[derive(Accounts)]
pub struct AccrueInterest<'info> {
    #[account(
        mut,
        seeds = [MARKET_SEED, market.id.as_ref()],
        bump = market.bump
    )]
    pub market: Account<'info, Market>,

    #[account(address = market.params.irm @ LendingError::InvalidMarketConfig)]
    pub rate_model: Account<'info, KinkRateModel>,
}

pub fn accrue_interest_handler(ctx: Context<AccrueInterest>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let rate_model: &KinkRateModel = &ctx.accounts.rate_model;
    let market = &mut ctx.accounts.market;

    let outcome = accrue_interest(market, rate_model, now)?;

    emit!(InterestAccrued {
        market_id: market.id,
        borrow_rate: outcome.borrow_rate,
        interest: outcome.interest,
        fee_shares: outcome.fee_shares,
        total_supply_assets: market.total_supply_assets,
        total_borrow_assets: market.total_borrow_assets,
        timestamp: now,
    });

    Ok(())
}

/// Moves fee shares minted during accrual into the fee recipient's position
#[derive(Accounts)]
pub struct ClaimFeeShares<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,

    #[account(
        seeds = [GLOBAL_CONFIG_SEED],
        bump = global_config.bump
    )]
    pub global_config: Account<'info, GlobalConfig>,

    #[account(
        mut,
        seeds = [MARKET_SEED, market.id.as_ref()],
        bump = market.bump
    )]
    pub market: Account<'info, Market>,

    #[account(
        init_if_needed,
        payer = payer,
        space = Position::SIZE,
        seeds = [
            POSITION_SEED,
            market.key().as_ref(),
            global_config.fee_recipient.as_ref(),
        ],
        bump
    )]
    pub fee_position: Account<'info, Position>,

    pub system_program: Program<'info, System>,
}

pub fn claim_fee_shares_handler(ctx: Context<ClaimFeeShares>) -> Result<()> {
    let market_key = ctx.accounts.market.key();
    let fee_recipient = ctx.accounts.global_config.fee_recipient;
    let market = &mut ctx.accounts.market;
    let fee_position = &mut ctx.accounts.fee_position;

    fee_position.initialize_if_needed(market_key, fee_recipient, ctx.bumps.fee_position)?;
    let shares = market.claim_fee_shares(fee_position)?;

    emit!(FeeSharesClaimed {
        market_id: market.id,
        fee_recipient,
        shares,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

#[event]
pub struct MarketCreated {
    pub market_id: [u8; 32],
    pub market: Pubkey,
    pub creator: Pubkey,
    pub loan_mint: Pubkey,
    pub collateral_mint: Pubkey,
    pub oracle: Pubkey,
    pub irm: Pubkey,
    pub lltv: u128,
    pub timestamp: i64,
}

#[event]
pub struct FeeSet {
    pub market_id: [u8; 32],
    pub fee: u128,
    pub timestamp: i64,
}

#[event]
pub struct InterestAccrued {
    pub market_id: [u8; 32],
    pub borrow_rate: u128,
    pub interest: u128,
    pub fee_shares: u128,
    pub total_supply_assets: u128,
    pub total_borrow_assets: u128,
    pub timestamp: i64,
}

#[event]
pub struct FeeSharesClaimed {
    pub market_id: [u8; 32],
    pub fee_recipient: Pubkey,
    pub shares: u128,
    pub timestamp: i64,
}
