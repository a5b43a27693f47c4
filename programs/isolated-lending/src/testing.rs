//! Doubles and fixtures shared by the unit tests.

use anchor_lang::error::Error;
use anchor_lang::prelude::*;
use crate::constants::*;
use crate::errors::LendingError;
use crate::interest::RateModel;
use crate::oracle::Oracle;
use crate::state::*;

pub const START: i64 = 1_700_000_000;

/// Rate model returning the same per-second rate at any utilization.
pub struct FixedRate(pub u128);

impl RateModel for FixedRate {
    fn borrow_rate(&self, _market: &Market) -> Result<u128> {
        Ok(self.0)
    }
}

/// Oracle returning a constant price.
pub struct StaticPrice(pub u128);

impl Oracle for StaticPrice {
    fn price(&self) -> Result<u128> {
        require_gt!(self.0, 0, LendingError::InvalidOraclePrice);
        Ok(self.0)
    }
}

pub fn price(whole: u128) -> StaticPrice {
    StaticPrice(whole * ORACLE_SCALE)
}

pub fn sample_params(lltv: u128) -> MarketParams {
    MarketParams {
        loan_mint: Pubkey::new_unique(),
        collateral_mint: Pubkey::new_unique(),
        oracle: Pubkey::new_unique(),
        irm: Pubkey::new_unique(),
        lltv,
    }
}

pub fn created_market(lltv: u128) -> Market {
    let mut market = Market::default();
    market
        .initialize(sample_params(lltv), 255, 254, 253, START)
        .unwrap();
    market
}

/// Market with 80% LLTV and the given totals, shares priced one to one.
pub fn funded_market(supply_assets: u128, borrow_assets: u128) -> Market {
    let mut market = created_market(WAD * 8 / 10);
    market.total_supply_assets = supply_assets;
    market.total_supply_shares = supply_assets;
    market.total_borrow_assets = borrow_assets;
    market.total_borrow_shares = borrow_assets;
    market
}

pub fn new_position() -> Position {
    let mut position = Position::default();
    position
        .initialize(Pubkey::new_unique(), Pubkey::new_unique(), 255)
        .unwrap();
    position
}

pub fn assert_error<T: std::fmt::Debug>(result: Result<T>, expected: LendingError) {
    match result {
        Err(Error::AnchorError(err)) => {
            assert_eq!(err.error_code_number, u32::from(expected), "got {}", err.error_name)
        }
        other => panic!("expected {expected:?}, got {other:?}"),
    }
}
