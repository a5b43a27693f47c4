use anchor_lang::prelude::*;
use crate::constants::*;
use crate::errors::LendingError;
use crate::state::*;

/// Initialize the global protocol configuration
///
/// This must be called once by the protocol owner. The signer becomes the
/// owner allowed to enable LLTVs, register rate models and set fees.
#[derive(Accounts)]
pub struct Initialize<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        init,
        payer = owner,
        space = GlobalConfig::SIZE,
        seeds = [GLOBAL_CONFIG_SEED],
        bump
    )]
    pub global_config: Account<'info, GlobalConfig>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<Initialize>, fee_recipient: Pubkey) -> Result<()> {
    let global_config = &mut ctx.accounts.global_config;

    global_config.initialize(
        ctx.accounts.owner.key(),
        fee_recipient,
        ctx.bumps.global_config,
    )?;

    emit!(ProtocolInitialized {
        owner: global_config.owner,
        fee_recipient,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

/// Owner-only update of the global configuration
#[derive(Accounts)]
pub struct UpdateConfig<'info> {
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [GLOBAL_CONFIG_SEED],
        bump = global_config.bump,
        has_one = owner @ LendingError::Unauthorized
    )]
    pub global_config: Account<'info, GlobalConfig>,
}

pub fn enable_lltv_handler(ctx: Context<UpdateConfig>, lltv: u128) -> Result<()> {
    ctx.accounts.global_config.enable_lltv(lltv)?;

    msg!("lltv {} enabled", lltv);
    emit!(LltvEnabled {
        lltv,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

pub fn set_fee_recipient_handler(ctx: Context<UpdateConfig>, fee_recipient: Pubkey) -> Result<()> {
    let global_config = &mut ctx.accounts.global_config;
    let previous = global_config.fee_recipient;
    global_config.set_fee_recipient(fee_recipient)?;

    emit!(FeeRecipientSet {
        previous,
        fee_recipient,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

#[event]
pub struct ProtocolInitialized {
    pub owner: Pubkey,
    pub fee_recipient: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct LltvEnabled {
    pub lltv: u128,
    pub timestamp: i64,
}

#[event]
pub struct FeeRecipientSet {
    pub previous: Pubkey,
    pub fee_recipient: Pubkey,
    pub timestamp: i64,
}
