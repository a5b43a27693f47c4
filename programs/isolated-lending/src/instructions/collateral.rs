use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};
use crate::constants::*;
use crate::errors::LendingError;
use crate::interest::KinkRateModel;
use crate::ledger;
use crate::oracle::PriceFeed;
use crate::state::*;
use super::{deposit, release};

/// Post collateral to a position
///
/// Collateral earns no interest and is only ever seized by liquidation.
#[derive(Accounts)]
pub struct SupplyCollateral<'info> {
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

    #[account(
        mut,
        constraint = user_token_account.owner == user.key() @ LendingError::Unauthorized,
        constraint = user_token_account.mint == market.params.collateral_mint @ LendingError::InvalidMarketConfig
    )]
    pub user_token_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        seeds = [COLLATERAL_VAULT_SEED, market.key().as_ref()],
        bump = market.collateral_vault_bump
    )]
    pub collateral_vault: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<SupplyCollateral>, assets: u64) -> Result<()> {
    let market_key = ctx.accounts.market.key();
    let on_behalf = ctx.accounts.on_behalf.key();
    let market = &mut ctx.accounts.market;
    let position = &mut ctx.accounts.position;

    position.initialize_if_needed(market_key, on_behalf, ctx.bumps.position)?;
    ledger::supply_collateral(market, position, assets.into())?;

    deposit(
        &ctx.accounts.token_program,
        &ctx.accounts.user_token_account,
        &ctx.accounts.collateral_vault,
        &ctx.accounts.user,
        assets,
    )?;

    emit!(CollateralSupplied {
        market_id: ctx.accounts.market.id,
        caller: ctx.accounts.user.key(),
        on_behalf,
        assets: assets.into(),
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

/// Withdraw collateral from the signer's position
///
/// The position must remain healthy at the oracle price afterwards.
#[derive(Accounts)]
pub struct WithdrawCollateral<'info> {
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

    #[account(address = market.params.oracle @ LendingError::InvalidMarketConfig)]
    pub price_feed: Account<'info, PriceFeed>,

    #[account(
        mut,
        constraint = receiver_token_account.mint == market.params.collateral_mint @ LendingError::InvalidMarketConfig
    )]
    pub receiver_token_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        seeds = [COLLATERAL_VAULT_SEED, market.key().as_ref()],
        bump = market.collateral_vault_bump
    )]
    pub collateral_vault: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn withdraw_collateral_handler(ctx: Context<WithdrawCollateral>, assets: u64) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let rate_model: &KinkRateModel = &ctx.accounts.rate_model;
    let oracle = ctx.accounts.price_feed.at(now);
    let market = &mut ctx.accounts.market;
    let position = &mut ctx.accounts.position;

    ledger::withdraw_collateral(market, position, rate_model, &oracle, now, assets.into())?;

    release(
        &ctx.accounts.token_program,
        &ctx.accounts.collateral_vault,
        &ctx.accounts.receiver_token_account,
        &ctx.accounts.market,
        assets,
    )?;

    emit!(CollateralWithdrawn {
        market_id: ctx.accounts.market.id,
        owner: ctx.accounts.owner.key(),
        receiver: ctx.accounts.receiver_token_account.key(),
        assets: assets.into(),
        timestamp: now,
    });

    Ok(())
}

/// Post collateral to several existing positions of one market
///
/// Target positions are passed as writable remaining accounts, one per entry
/// of `amounts`. Each deposit stands on its own: a rejected entry is logged
/// and skipped, and only the accepted total is transferred. Returns one flag
/// per entry telling whether it was accepted.
#[derive(Accounts)]
pub struct SupplyCollateralBatch<'info> {
    pub user: Signer<'info>,

    #[account(
        mut,
        seeds = [MARKET_SEED, market.id.as_ref()],
        bump = market.bump
    )]
    pub market: Account<'info, Market>,

    #[account(
        mut,
        constraint = user_token_account.owner == user.key() @ LendingError::Unauthorized,
        constraint = user_token_account.mint == market.params.collateral_mint @ LendingError::InvalidMarketConfig
    )]
    pub user_token_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        seeds = [COLLATERAL_VAULT_SEED, market.key().as_ref()],
        bump = market.collateral_vault_bump
    )]
    pub collateral_vault: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

fn load_position<'info>(
    info: &'info AccountInfo<'info>,
    market: &Pubkey,
) -> Result<Account<'info, Position>> {
    require!(info.is_writable, LendingError::InconsistentInput);

    let position = Account::<Position>::try_from(info)?;
    require_keys_eq!(position.market, *market, LendingError::InvalidMarketConfig);

    Ok(position)
}

pub fn supply_collateral_batch_handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, SupplyCollateralBatch<'info>>,
    amounts: Vec<u64>,
) -> Result<Vec<bool>> {
    require_eq!(
        amounts.len(),
        ctx.remaining_accounts.len(),
        LendingError::InconsistentInput
    );

    let now = Clock::get()?.unix_timestamp;
    let market_key = ctx.accounts.market.key();
    let mut accepted = vec![false; amounts.len()];

    let mut slots: Vec<(usize, Account<'info, Position>)> = Vec::with_capacity(amounts.len());
    for (index, info) in ctx.remaining_accounts.iter().enumerate() {
        let duplicate = slots
            .iter()
            .any(|(_, position)| position.key() == info.key());
        if duplicate {
            msg!("deposit {} rejected: position listed twice", index);
            continue;
        }

        match load_position(info, &market_key) {
            Ok(position) => slots.push((index, position)),
            Err(err) => msg!("deposit {} rejected: {}", index, err),
        }
    }

    let results = ledger::supply_collateral_batch(
        &mut ctx.accounts.market,
        slots
            .iter_mut()
            .map(|(index, position)| (&mut **position, u128::from(amounts[*index]))),
    );

    let mut total: u64 = 0;
    for ((index, position), result) in slots.iter().zip(results) {
        match result {
            Ok(_) => {
                accepted[*index] = true;
                total = total
                    .checked_add(amounts[*index])
                    .ok_or(LendingError::MathOverflow)?;
                position.exit(ctx.program_id)?;

                emit!(CollateralSupplied {
                    market_id: ctx.accounts.market.id,
                    caller: ctx.accounts.user.key(),
                    on_behalf: position.owner,
                    assets: amounts[*index].into(),
                    timestamp: now,
                });
            }
            Err(err) => msg!("deposit {} rejected: {}", index, err),
        }
    }

    deposit(
        &ctx.accounts.token_program,
        &ctx.accounts.user_token_account,
        &ctx.accounts.collateral_vault,
        &ctx.accounts.user,
        total,
    )?;

    Ok(accepted)
}

#[event]
pub struct CollateralSupplied {
    pub market_id: [u8; 32],
    pub caller: Pubkey,
    pub on_behalf: Pubkey,
    pub assets: u128,
    pub timestamp: i64,
}

#[event]
pub struct CollateralWithdrawn {
    pub market_id: [u8; 32],
    pub owner: Pubkey,
    pub receiver: Pubkey,
    pub assets: u128,
    pub timestamp: i64,
}
