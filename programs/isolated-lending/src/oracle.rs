use anchor_lang::prelude::*;
use crate::constants::*;
use crate::errors::LendingError;

/// Source of the collateral price, quoted in loan-token units and scaled by
/// `ORACLE_SCALE`. Implementations must return a fresh value on every call.
pub trait Oracle {
    fn price(&self) -> Result<u128>;
}

/// Program-owned price feed maintained by its authority
#[account]
#[derive(Default, Debug)]
pub struct PriceFeed {
    /// Only key allowed to push prices
    pub authority: Pubkey,
    /// Collateral token being priced
    pub collateral_mint: Pubkey,
    /// Token the price is quoted in
    pub loan_mint: Pubkey,
    /// Last pushed price (ORACLE_SCALE)
    pub price: u128,
    /// Timestamp of the last push
    pub updated_at: i64,
    /// Bump seed for the feed PDA
    pub bump: u8,
}

impl PriceFeed {
    pub const SIZE: usize = 8 + // discriminator
        32 + // authority
        32 + // collateral_mint
        32 + // loan_mint
        16 + // price
        8 +  // updated_at
        1;   // bump

    pub fn initialize(
        &mut self,
        authority: Pubkey,
        collateral_mint: Pubkey,
        loan_mint: Pubkey,
        bump: u8,
    ) {
        self.authority = authority;
        self.collateral_mint = collateral_mint;
        self.loan_mint = loan_mint;
        self.price = 0;
        self.updated_at = 0;
        self.bump = bump;
    }

    pub fn set_price(&mut self, price: u128, now: i64) -> Result<()> {
        require_gt!(price, 0, LendingError::InvalidOraclePrice);
        self.price = price;
        self.updated_at = now;
        Ok(())
    }

    /// Reads the feed as of `now`.
    pub fn at(&self, now: i64) -> FreshPrice<'_> {
        FreshPrice { feed: self, now }
    }
}

/// A [`PriceFeed`] read that rejects zero and stale prices.
pub struct FreshPrice<'a> {
    pub feed: &'a PriceFeed,
    pub now: i64,
}

impl Oracle for FreshPrice<'_> {
    fn price(&self) -> Result<u128> {
        require_gt!(self.feed.price, 0, LendingError::InvalidOraclePrice);

        let age = self
            .now
            .checked_sub(self.feed.updated_at)
            .ok_or(LendingError::MathOverflow)?;
        require_gte!(ORACLE_STALENESS_THRESHOLD, age, LendingError::StaleOraclePrice);

        Ok(self.feed.price)
    }
}
