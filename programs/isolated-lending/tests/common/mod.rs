#![allow(dead_code)]

use anchor_lang::error::Error;
use anchor_lang::prelude::*;
use isolated_lending::constants::*;
use isolated_lending::errors::LendingError;
use isolated_lending::interest::RateModel;
use isolated_lending::oracle::Oracle;
use isolated_lending::state::{Market, MarketParams, Position};

pub const START: i64 = 1_700_000_000;
pub const LLTV: u128 = WAD * 8 / 10;

pub struct FixedRate(pub u128);

impl RateModel for FixedRate {
    fn borrow_rate(&self, _market: &Market) -> Result<u128> {
        Ok(self.0)
    }
}

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

pub fn market(lltv: u128) -> Market {
    let params = MarketParams {
        loan_mint: Pubkey::new_unique(),
        collateral_mint: Pubkey::new_unique(),
        oracle: Pubkey::new_unique(),
        irm: Pubkey::new_unique(),
        lltv,
    };

    let mut market = Market::default();
    market.initialize(params, 255, 254, 253, START).unwrap();
    market
}

pub fn position(market: &Market) -> Position {
    let mut position = Position::default();
    position
        .initialize(Pubkey::new_from_array(market.id), Pubkey::new_unique(), 255)
        .unwrap();
    position
}

/// Supply shares held by `positions` plus the unclaimed fee shares.
pub fn accounted_supply_shares(market: &Market, positions: &[&Position]) -> u128 {
    positions.iter().map(|p| p.supply_shares).sum::<u128>() + market.fee_shares
}

pub fn accounted_borrow_shares(positions: &[&Position]) -> u128 {
    positions.iter().map(|p| p.borrow_shares).sum()
}

pub fn is_error<T>(result: &Result<T>, expected: LendingError) -> bool {
    matches!(
        result,
        Err(Error::AnchorError(err)) if err.error_code_number == u32::from(expected)
    )
}
