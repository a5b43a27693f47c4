pub mod initialize;
pub mod rate_model;
pub mod price_feed;
pub mod market;
pub mod position;
pub mod supply;
pub mod withdraw;
pub mod collateral;
pub mod borrow;
pub mod repay;
pub mod liquidate;
pub mod views;

pub use initialize::*;
pub use rate_model::*;
pub use price_feed::*;
pub use market::*;
pub use position::*;
pub use supply::*;
pub use withdraw::*;
pub use collateral::*;
pub use borrow::*;
pub use repay::*;
pub use liquidate::*;
pub use views::*;

use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};
use crate::constants::MARKET_SEED;
use crate::errors::LendingError;
use crate::state::Market;

/// Ledger amounts are `u128`; SPL token amounts are `u64`.
pub(crate) fn token_amount(amount: u128) -> Result<u64> {
    u64::try_from(amount).map_err(|_| error!(LendingError::MathOverflow))
}

/// Moves tokens from a user-owned account into a market vault.
pub(crate) fn deposit<'info>(
    token_program: &Program<'info, Token>,
    from: &Account<'info, TokenAccount>,
    vault: &Account<'info, TokenAccount>,
    authority: &Signer<'info>,
    amount: u64,
) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }

    let transfer_ctx = CpiContext::new(
        token_program.to_account_info(),
        Transfer {
            from: from.to_account_info(),
            to: vault.to_account_info(),
            authority: authority.to_account_info(),
        },
    );
    token::transfer(transfer_ctx, amount)
}

/// Moves tokens out of a market vault, signed by the market PDA.
pub(crate) fn release<'info>(
    token_program: &Program<'info, Token>,
    vault: &Account<'info, TokenAccount>,
    to: &Account<'info, TokenAccount>,
    market: &Account<'info, Market>,
    amount: u64,
) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }

    let seeds = &[MARKET_SEED, market.id.as_ref(), &[market.bump]];
    let signer = &[&seeds[..]];

    let transfer_ctx = CpiContext::new_with_signer(
        token_program.to_account_info(),
        Transfer {
            from: vault.to_account_info(),
            to: to.to_account_info(),
            authority: market.to_account_info(),
        },
        signer,
    );
    token::transfer(transfer_ctx, amount)
}
