//! Solvency checks and projections for a single position.
//!
//! Debt is always rounded up and borrowing capacity always rounded down, so
//! a position reported healthy is healthy under exact arithmetic too. None
//! of these functions mutate their inputs.
//!
//! The planning queries (`max_*` and [`health_factor_after`]) accrue interest
//! on a copy of the market up to `now` first, as the real operation would.

use anchor_lang::prelude::*;
use crate::constants::*;
use crate::errors::LendingError;
use crate::interest::{accrue_interest, RateModel};
use crate::math::*;
use crate::oracle::Oracle;
use crate::shares::to_assets_up;
use crate::state::{Market, Position};

/// Upper bound on the loop in [`max_borrowable`]; each step covers one
/// borrow share of rounding.
const MAX_ROUNDING_STEPS: usize = 4;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PositionHealth {
    /// Debt in loan assets, rounded up
    pub borrowed: u128,
    /// Debt ceiling at the current price and LLTV, rounded down
    pub max_borrow: u128,
    /// `max_borrow / borrowed` (WAD), `u128::MAX` without debt
    pub health_factor: u128,
    pub healthy: bool,
}

/// Collateral value times LLTV, in loan assets.
pub fn max_borrow(market: &Market, position: &Position, price: u128) -> Result<u128> {
    let collateral_value = mul_div_down(position.collateral, price, ORACLE_SCALE)?;
    w_mul_down(collateral_value, market.params.lltv)
}

pub fn is_healthy(market: &Market, position: &Position, price: u128) -> Result<bool> {
    if position.borrow_shares == 0 {
        return Ok(true);
    }

    let borrowed = market.borrowed_assets(position)?;
    Ok(max_borrow(market, position, price)? >= borrowed)
}

/// 1.0 (WAD) at the liquidation boundary, above when healthy, below when
/// liquidatable.
pub fn health_factor(market: &Market, position: &Position, price: u128) -> Result<u128> {
    let borrowed = market.borrowed_assets(position)?;
    if borrowed == 0 {
        return Ok(HEALTH_FACTOR_MAX);
    }

    w_div_down(max_borrow(market, position, price)?, borrowed)
}

pub fn position_health(market: &Market, position: &Position, price: u128) -> Result<PositionHealth> {
    let borrowed = market.borrowed_assets(position)?;
    let max_borrow = max_borrow(market, position, price)?;
    let health_factor = if borrowed == 0 {
        HEALTH_FACTOR_MAX
    } else {
        w_div_down(max_borrow, borrowed)?
    };

    Ok(PositionHealth {
        borrowed,
        max_borrow,
        health_factor,
        healthy: position.borrow_shares == 0 || max_borrow >= borrowed,
    })
}

/// [`position_health`] at the oracle's current price.
///
/// A debt-free position is healthy at any price, so an unusable feed only
/// zeroes its borrowing capacity instead of failing.
pub fn current_health<O: Oracle + ?Sized>(
    market: &Market,
    position: &Position,
    oracle: &O,
) -> Result<PositionHealth> {
    let price = match oracle.price() {
        Ok(price) => price,
        Err(_) if !position.has_debt() => 0,
        Err(err) => return Err(err),
    };

    position_health(market, position, price)
}

/// Health factor `position` would have after depositing (positive) or
/// withdrawing (negative) `collateral_delta` and borrowing (positive) or
/// repaying (negative) `borrow_delta` loan assets at `now`.
///
/// The deltas go through the same ledger arithmetic as the real operations,
/// applied to copies of the accrued market, so the result matches the
/// post-state of executing them at `now`. Collateral and debt floor at zero.
pub fn health_factor_after<R: RateModel + ?Sized>(
    market: &Market,
    position: &Position,
    rate_model: &R,
    now: i64,
    price: u128,
    collateral_delta: i128,
    borrow_delta: i128,
) -> Result<u128> {
    let market = accrued(market, rate_model, now)?;
    let (market, position) = project(&market, position, collateral_delta, borrow_delta)?;
    health_factor(&market, &position, price)
}

fn accrued<R: RateModel + ?Sized>(market: &Market, rate_model: &R, now: i64) -> Result<Market> {
    let mut market = market.clone();
    accrue_interest(&mut market, rate_model, now)?;
    Ok(market)
}

fn project(
    market: &Market,
    position: &Position,
    collateral_delta: i128,
    borrow_delta: i128,
) -> Result<(Market, Position)> {
    let mut market = market.clone();
    let mut position = position.clone();

    if collateral_delta >= 0 {
        market.apply_supply_collateral(&mut position, collateral_delta.unsigned_abs())?;
    } else {
        position.collateral = zero_floor_sub(position.collateral, collateral_delta.unsigned_abs());
    }

    if borrow_delta > 0 {
        market.apply_borrow(&mut position, borrow_delta.unsigned_abs(), 0)?;
    } else if borrow_delta < 0 {
        let repaid = borrow_delta.unsigned_abs();
        if repaid >= market.borrowed_assets(&position)? {
            let shares = position.borrow_shares;
            market.apply_repay(&mut position, 0, shares)?;
        } else {
            market.apply_repay(&mut position, repaid, 0)?;
        }
    }

    Ok((market, position))
}

/// Loan assets `position` can borrow at `now` and `price`, bounded by market
/// liquidity.
pub fn max_borrowable<R: RateModel + ?Sized>(
    market: &Market,
    position: &Position,
    rate_model: &R,
    now: i64,
    price: u128,
) -> Result<u128> {
    let market = accrued(market, rate_model, now)?;
    let borrowed = market.borrowed_assets(position)?;
    let capacity = zero_floor_sub(max_borrow(&market, position, price)?, borrowed);
    let mut amount = capacity.min(market.liquidity());

    // share rounding can add up to one share of debt on top of `amount`
    let step = to_assets_up(1, market.total_borrow_assets, market.total_borrow_shares)?;
    for _ in 0..MAX_ROUNDING_STEPS {
        if amount == 0 {
            break;
        }
        let delta = i128::try_from(amount).map_err(|_| error!(LendingError::MathOverflow))?;
        let (after_market, after_position) = project(&market, position, 0, delta)?;
        if is_healthy(&after_market, &after_position, price)? {
            return Ok(amount);
        }
        amount = zero_floor_sub(amount, step);
    }

    Ok(0)
}

/// Collateral `position` can withdraw at `now` and `price` and stay healthy.
pub fn max_withdrawable_collateral<R: RateModel + ?Sized>(
    market: &Market,
    position: &Position,
    rate_model: &R,
    now: i64,
    price: u128,
) -> Result<u128> {
    if !position.has_debt() {
        return Ok(position.collateral);
    }

    let market = accrued(market, rate_model, now)?;
    let borrowed = market.borrowed_assets(position)?;
    let required_value = w_div_up(borrowed, market.params.lltv)?;
    let required = mul_div_up(required_value, ORACLE_SCALE, price)?;

    Ok(zero_floor_sub(position.collateral, required))
}

/// Loan assets `position` can withdraw from the supply side at `now`.
pub fn max_withdrawable_supply<R: RateModel + ?Sized>(
    market: &Market,
    position: &Position,
    rate_model: &R,
    now: i64,
) -> Result<u128> {
    let market = accrued(market, rate_model, now)?;
    Ok(market.supplied_assets(position)?.min(market.liquidity()))
}
