use anchor_lang::prelude::*;
use crate::constants::*;
use crate::errors::LendingError;
use crate::interest::{KinkRateModel, RateModelConfig};
use crate::state::GlobalConfig;

/// Register a kinked interest rate model
///
/// Models are indexed in registration order. Markets may only reference a
/// registered model.
#[derive(Accounts)]
#[instruction(index: u32)]
pub struct CreateRateModel<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [GLOBAL_CONFIG_SEED],
        bump = global_config.bump,
        has_one = owner @ LendingError::Unauthorized
    )]
    pub global_config: Account<'info, GlobalConfig>,

    #[account(
        init,
        payer = owner,
        space = KinkRateModel::SIZE,
        seeds = [RATE_MODEL_SEED, index.to_le_bytes().as_ref()],
        bump
    )]
    pub rate_model: Account<'info, KinkRateModel>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<CreateRateModel>, index: u32, config: RateModelConfig) -> Result<()> {
    let global_config = &mut ctx.accounts.global_config;
    require_eq!(index, global_config.rate_model_count, LendingError::InconsistentInput);

    ctx.accounts.rate_model.initialize(index, config, ctx.bumps.rate_model)?;

    global_config.rate_model_count = global_config.rate_model_count
        .checked_add(1)
        .ok_or(LendingError::MathOverflow)?;

    emit!(RateModelCreated {
        rate_model: ctx.accounts.rate_model.key(),
        index,
        base_rate: config.base_rate,
        slope_1: config.slope_1,
        slope_2: config.slope_2,
        optimal_utilization: config.optimal_utilization,
    });

    Ok(())
}

#[event]
pub struct RateModelCreated {
    pub rate_model: Pubkey,
    pub index: u32,
    pub base_rate: u128,
    pub slope_1: u128,
    pub slope_2: u128,
    pub optimal_utilization: u128,
}
