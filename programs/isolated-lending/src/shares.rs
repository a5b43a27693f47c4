//! Asset/share conversions for the supply and borrow pools of a market.
//!
//! Both sides of every ratio carry a virtual offset so an empty pool converts
//! one to one and the first depositor cannot inflate the share price.
//!
//! Whichever amount is derived from the caller's input is rounded against the
//! caller:
//!
//! | Operation | assets given      | shares given      |
//! |-----------|-------------------|-------------------|
//! | supply    | `to_shares_down`  | `to_assets_up`    |
//! | withdraw  | `to_shares_up`    | `to_assets_down`  |
//! | borrow    | `to_shares_up`    | `to_assets_down`  |
//! | repay     | `to_shares_down`  | `to_assets_up`    |

use anchor_lang::prelude::*;
use crate::constants::{VIRTUAL_ASSETS, VIRTUAL_SHARES};
use crate::errors::LendingError;
use crate::math::{mul_div_down, mul_div_up};

fn virtual_totals(total_assets: u128, total_shares: u128) -> Result<(u128, u128)> {
    let assets = total_assets
        .checked_add(VIRTUAL_ASSETS)
        .ok_or(LendingError::MathOverflow)?;
    let shares = total_shares
        .checked_add(VIRTUAL_SHARES)
        .ok_or(LendingError::MathOverflow)?;

    Ok((assets, shares))
}

pub fn to_shares_down(assets: u128, total_assets: u128, total_shares: u128) -> Result<u128> {
    let (virtual_assets, virtual_shares) = virtual_totals(total_assets, total_shares)?;
    mul_div_down(assets, virtual_shares, virtual_assets)
}

pub fn to_shares_up(assets: u128, total_assets: u128, total_shares: u128) -> Result<u128> {
    let (virtual_assets, virtual_shares) = virtual_totals(total_assets, total_shares)?;
    mul_div_up(assets, virtual_shares, virtual_assets)
}

pub fn to_assets_down(shares: u128, total_assets: u128, total_shares: u128) -> Result<u128> {
    let (virtual_assets, virtual_shares) = virtual_totals(total_assets, total_shares)?;
    mul_div_down(shares, virtual_assets, virtual_shares)
}

pub fn to_assets_up(shares: u128, total_assets: u128, total_shares: u128) -> Result<u128> {
    let (virtual_assets, virtual_shares) = virtual_totals(total_assets, total_shares)?;
    mul_div_up(shares, virtual_assets, virtual_shares)
}
