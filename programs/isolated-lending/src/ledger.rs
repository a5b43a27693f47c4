//! Lending operations on a market and one of its positions.
//!
//! Each operation brings the market current, converts the caller's amount,
//! mutates the ledger and validates the result. Work happens on copies that
//! are written back only on success, so a failed call leaves both accounts
//! untouched.

use anchor_lang::prelude::*;
use crate::errors::LendingError;
use crate::health::is_healthy;
use crate::interest::{accrue_interest, RateModel};
use crate::math::exactly_one_zero;
use crate::oracle::Oracle;
use crate::state::{Market, Position};

pub(crate) fn transact<T>(
    market: &mut Market,
    position: &mut Position,
    op: impl FnOnce(&mut Market, &mut Position) -> Result<T>,
) -> Result<T> {
    let mut next_market = market.clone();
    let mut next_position = position.clone();

    let outcome = op(&mut next_market, &mut next_position)?;

    *market = next_market;
    *position = next_position;

    Ok(outcome)
}

/// Deposits loan assets for `position`. Returns `(assets, shares)`.
pub fn supply<R: RateModel + ?Sized>(
    market: &mut Market,
    position: &mut Position,
    rate_model: &R,
    now: i64,
    assets: u128,
    shares: u128,
) -> Result<(u128, u128)> {
    market.ensure_created()?;
    require!(exactly_one_zero(assets, shares), LendingError::InconsistentInput);

    transact(market, position, |market, position| {
        accrue_interest(market, rate_model, now)?;
        market.apply_supply(position, assets, shares)
    })
}

/// Withdraws loan assets from `position`'s supply. Returns `(assets, shares)`.
pub fn withdraw<R: RateModel + ?Sized>(
    market: &mut Market,
    position: &mut Position,
    rate_model: &R,
    now: i64,
    assets: u128,
    shares: u128,
) -> Result<(u128, u128)> {
    market.ensure_created()?;
    require!(exactly_one_zero(assets, shares), LendingError::InconsistentInput);

    transact(market, position, |market, position| {
        accrue_interest(market, rate_model, now)?;
        market.apply_withdraw(position, assets, shares)
    })
}

/// Borrows loan assets against `position`'s collateral. Returns `(assets, shares)`.
pub fn borrow<R: RateModel + ?Sized, O: Oracle + ?Sized>(
    market: &mut Market,
    position: &mut Position,
    rate_model: &R,
    oracle: &O,
    now: i64,
    assets: u128,
    shares: u128,
) -> Result<(u128, u128)> {
    market.ensure_created()?;
    require!(exactly_one_zero(assets, shares), LendingError::InconsistentInput);

    transact(market, position, |market, position| {
        accrue_interest(market, rate_model, now)?;
        let outcome = market.apply_borrow(position, assets, shares)?;

        market.ensure_liquidity()?;
        require!(
            is_healthy(market, position, oracle.price()?)?,
            LendingError::InsufficientCollateral
        );

        Ok(outcome)
    })
}

/// Repays `position`'s debt. Returns `(assets, shares)`.
pub fn repay<R: RateModel + ?Sized>(
    market: &mut Market,
    position: &mut Position,
    rate_model: &R,
    now: i64,
    assets: u128,
    shares: u128,
) -> Result<(u128, u128)> {
    market.ensure_created()?;
    require!(exactly_one_zero(assets, shares), LendingError::InconsistentInput);

    transact(market, position, |market, position| {
        accrue_interest(market, rate_model, now)?;
        market.apply_repay(position, assets, shares)
    })
}

/// Posts collateral. Collateral earns nothing, so the market is not accrued.
pub fn supply_collateral(market: &mut Market, position: &mut Position, assets: u128) -> Result<()> {
    market.ensure_created()?;
    require_gt!(assets, 0, LendingError::ZeroAmount);

    transact(market, position, |market, position| {
        market.apply_supply_collateral(position, assets)
    })
}

/// Releases collateral, provided the position stays healthy.
pub fn withdraw_collateral<R: RateModel + ?Sized, O: Oracle + ?Sized>(
    market: &mut Market,
    position: &mut Position,
    rate_model: &R,
    oracle: &O,
    now: i64,
    assets: u128,
) -> Result<()> {
    market.ensure_created()?;
    require_gt!(assets, 0, LendingError::ZeroAmount);

    transact(market, position, |market, position| {
        accrue_interest(market, rate_model, now)?;
        market.apply_withdraw_collateral(position, assets)?;

        // without debt the position is healthy at any price, so the feed is not read
        if position.has_debt() {
            require!(
                is_healthy(market, position, oracle.price()?)?,
                LendingError::InsufficientCollateral
            );
        }

        Ok(())
    })
}

/// Posts collateral to several positions of one market.
///
/// Items are independent: a rejected deposit does not undo the ones before
/// or after it. The returned vector holds one result per item, in order.
pub fn supply_collateral_batch<'a, I>(market: &mut Market, deposits: I) -> Vec<Result<u128>>
where
    I: IntoIterator<Item = (&'a mut Position, u128)>,
{
    deposits
        .into_iter()
        .map(|(position, assets)| supply_collateral(market, position, assets).map(|_| assets))
        .collect()
}
