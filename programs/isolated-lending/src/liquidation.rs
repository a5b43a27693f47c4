use anchor_lang::prelude::*;
use crate::constants::*;
use crate::errors::LendingError;
use crate::health::is_healthy;
use crate::interest::{accrue_interest, RateModel};
use crate::ledger::transact;
use crate::math::*;
use crate::oracle::Oracle;
use crate::shares::*;
use crate::state::{Market, Position};

/// Bonus applied to seized collateral, as a WAD multiplier:
/// `min(MAX_LIF, 1 / (1 - CURSOR * (1 - lltv)))`.
///
/// Riskier markets (lower LLTV) pay a larger bonus, capped at 15%.
pub fn liquidation_incentive_factor(lltv: u128) -> Result<u128> {
    let discount = w_mul_down(LIQUIDATION_CURSOR, zero_floor_sub(WAD, lltv))?;
    let factor = w_div_down(WAD, WAD - discount)?;

    Ok(factor.min(MAX_LIQUIDATION_INCENTIVE_FACTOR))
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LiquidationOutcome {
    pub repaid_assets: u128,
    pub repaid_shares: u128,
    pub seized_assets: u128,
    pub bad_debt_assets: u128,
    pub bad_debt_shares: u128,
}

/// Closes part or all of an unhealthy position.
///
/// The liquidator names either the collateral to seize or the borrow shares
/// to repay; the other side is derived with the incentive factor applied and
/// rounded in the protocol's favor. Seized collateral is capped at what the
/// borrower holds and derived repayments at what the borrower owes. When the
/// seizure leaves the borrower with no collateral but some debt, that debt is
/// written off against lenders.
pub fn liquidate<R: RateModel + ?Sized, O: Oracle + ?Sized>(
    market: &mut Market,
    borrower: &mut Position,
    rate_model: &R,
    oracle: &O,
    now: i64,
    seized_assets: u128,
    repaid_shares: u128,
) -> Result<LiquidationOutcome> {
    market.ensure_created()?;
    require!(
        exactly_one_zero(seized_assets, repaid_shares),
        LendingError::InconsistentInput
    );

    transact(market, borrower, |market, borrower| {
        accrue_interest(market, rate_model, now)?;

        let price = oracle.price()?;
        require!(
            !is_healthy(market, borrower, price)?,
            LendingError::HealthyPosition
        );

        let incentive = liquidation_incentive_factor(market.params.lltv)?;
        let (seized_assets, repaid_shares) = if seized_assets > 0 {
            let seized_assets = seized_assets.min(borrower.collateral);
            let seized_quoted = mul_div_up(seized_assets, price, ORACLE_SCALE)?;
            let repaid_assets = w_div_up(seized_quoted, incentive)?;
            let repaid_shares = to_shares_up(
                repaid_assets,
                market.total_borrow_assets,
                market.total_borrow_shares,
            )?;
            (seized_assets, repaid_shares.min(borrower.borrow_shares))
        } else {
            require_gte!(borrower.borrow_shares, repaid_shares, LendingError::RepayExceedsDebt);

            let repaid_assets = to_assets_down(
                repaid_shares,
                market.total_borrow_assets,
                market.total_borrow_shares,
            )?;
            let seized_quoted = w_mul_down(repaid_assets, incentive)?;
            let seized_assets = mul_div_down(seized_quoted, ORACLE_SCALE, price)?;
            (seized_assets.min(borrower.collateral), repaid_shares)
        };

        let repaid_assets = to_assets_up(
            repaid_shares,
            market.total_borrow_assets,
            market.total_borrow_shares,
        )?;

        require_gte!(
            repaid_assets,
            MIN_LIQUIDATION_REPAY_ASSETS,
            LendingError::LiquidationTooSmall
        );
        require_gt!(seized_assets, 0, LendingError::LiquidationTooSmall);

        borrower.borrow_shares -= repaid_shares;
        borrower.collateral -= seized_assets;
        market.total_borrow_shares = market.total_borrow_shares
            .checked_sub(repaid_shares)
            .ok_or(LendingError::MathOverflow)?;
        market.total_borrow_assets = zero_floor_sub(market.total_borrow_assets, repaid_assets);

        let mut outcome = LiquidationOutcome {
            repaid_assets,
            repaid_shares,
            seized_assets,
            ..LiquidationOutcome::default()
        };

        if borrower.collateral == 0 && borrower.borrow_shares > 0 {
            let bad_debt_shares = borrower.borrow_shares;
            let bad_debt_assets = to_assets_up(
                bad_debt_shares,
                market.total_borrow_assets,
                market.total_borrow_shares,
            )?
            .min(market.total_borrow_assets);

            market.total_borrow_assets -= bad_debt_assets;
            market.total_supply_assets = market.total_supply_assets
                .checked_sub(bad_debt_assets)
                .ok_or(LendingError::MathOverflow)?;
            market.total_borrow_shares = market.total_borrow_shares
                .checked_sub(bad_debt_shares)
                .ok_or(LendingError::MathOverflow)?;
            borrower.borrow_shares = 0;

            outcome.bad_debt_assets = bad_debt_assets;
            outcome.bad_debt_shares = bad_debt_shares;

            msg!("bad debt realized: {} assets, {} shares", bad_debt_assets, bad_debt_shares);
        }

        Ok(outcome)
    })
}
