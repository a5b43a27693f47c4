use anchor_lang::prelude::*;
use anchor_spl::token::Mint;
use crate::constants::*;
use crate::errors::LendingError;
use crate::oracle::PriceFeed;

/// Create a price feed quoting `collateral_mint` in `loan_mint` units
#[derive(Accounts)]
pub struct CreatePriceFeed<'info> {
    #[account(mut)]
    pub authority: Signer<'info>,

    pub collateral_mint: Account<'info, Mint>,

    pub loan_mint: Account<'info, Mint>,

    #[account(
        init,
        payer = authority,
        space = PriceFeed::SIZE,
        seeds = [
            PRICE_FEED_SEED,
            authority.key().as_ref(),
            collateral_mint.key().as_ref(),
            loan_mint.key().as_ref(),
        ],
        bump
    )]
    pub price_feed: Account<'info, PriceFeed>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<CreatePriceFeed>) -> Result<()> {
    ctx.accounts.price_feed.initialize(
        ctx.accounts.authority.key(),
        ctx.accounts.collateral_mint.key(),
        ctx.accounts.loan_mint.key(),
        ctx.bumps.price_feed,
    );

    emit!(PriceFeedCreated {
        price_feed: ctx.accounts.price_feed.key(),
        authority: ctx.accounts.authority.key(),
        collateral_mint: ctx.accounts.collateral_mint.key(),
        loan_mint: ctx.accounts.loan_mint.key(),
    });

    Ok(())
}

#[derive(Accounts)]
pub struct SetPrice<'info> {
    pub authority: Signer<'info>,

    #[account(
        mut,
        has_one = authority @ LendingError::Unauthorized
    )]
    pub price_feed: Account<'info, PriceFeed>,
}

pub fn set_price_handler(ctx: Context<SetPrice>, price: u128) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    ctx.accounts.price_feed.set_price(price, now)?;

    emit!(PriceUpdated {
        price_feed: ctx.accounts.price_feed.key(),
        price,
        timestamp: now,
    });

    Ok(())
}

#[event]
pub struct PriceFeedCreated {
    pub price_feed: Pubkey,
    pub authority: Pubkey,
    pub collateral_mint: Pubkey,
    pub loan_mint: Pubkey,
}

#[event]
pub struct PriceUpdated {
    pub price_feed: Pubkey,
    pub price: u128,
    pub timestamp: i64,
}
