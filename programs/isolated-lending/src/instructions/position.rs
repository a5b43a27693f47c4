use anchor_lang::prelude::*;
use crate::constants::*;
use crate::state::*;

/// Create an empty position for the signer in a market
///
/// Supplying and posting collateral create positions on the fly; this is for
/// owners who want the account to exist before anything is credited to it.
#[derive(Accounts)]
pub struct OpenPosition<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        seeds = [MARKET_SEED, market.id.as_ref()],
        bump = market.bump
    )]
    pub market: Account<'info, Market>,

    #[account(
        init,
        payer = owner,
        space = Position::SIZE,
        seeds = [POSITION_SEED, market.key().as_ref(), owner.key().as_ref()],
        bump
    )]
    pub position: Account<'info, Position>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<OpenPosition>) -> Result<()> {
    let market = &ctx.accounts.market;
    market.ensure_created()?;

    ctx.accounts.position.initialize(
        market.key(),
        ctx.accounts.owner.key(),
        ctx.bumps.position,
    )?;

    emit!(PositionOpened {
        market_id: market.id,
        owner: ctx.accounts.owner.key(),
        position: ctx.accounts.position.key(),
    });

    Ok(())
}

#[event]
pub struct PositionOpened {
    pub market_id: [u8; 32],
    pub owner: Pubkey,
    pub position: Pubkey,
}
