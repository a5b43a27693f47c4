use anchor_lang::prelude::*;
use crate::constants::*;
use crate::errors::LendingError;
use crate::math::*;
use crate::shares::to_shares_down;
use crate::state::Market;

/// Per-second borrow rate source for a market, WAD-scaled.
pub trait RateModel {
    fn borrow_rate(&self, market: &Market) -> Result<u128>;
}

/// Parameters of a [`KinkRateModel`], all per-second WAD rates except the
/// kink position.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateModelConfig {
    pub base_rate: u128,
    pub slope_1: u128,
    pub slope_2: u128,
    pub optimal_utilization: u128,
}

impl Default for RateModelConfig {
    /// 2% at zero utilization, 12% at the 80% kink, 112% when fully utilized
    fn default() -> Self {
        Self {
            base_rate: DEFAULT_BASE_RATE_PER_SECOND,
            slope_1: DEFAULT_SLOPE_1_PER_SECOND,
            slope_2: DEFAULT_SLOPE_2_PER_SECOND,
            optimal_utilization: DEFAULT_OPTIMAL_UTILIZATION,
        }
    }
}

/// Piecewise linear rate model with a kink at `optimal_utilization`:
/// - Below optimal: base_rate + slope_1 * (util / optimal)
/// - Above optimal: base_rate + slope_1 + slope_2 * ((util - optimal) / (1 - optimal))
#[account]
#[derive(Default, Debug)]
pub struct KinkRateModel {
    /// Registration index, part of the PDA seeds
    pub index: u32,
    /// Rate at zero utilization (per second, WAD)
    pub base_rate: u128,
    /// Rate added between zero and optimal utilization (per second, WAD)
    pub slope_1: u128,
    /// Rate added between optimal and full utilization (per second, WAD)
    pub slope_2: u128,
    /// Kink position (WAD)
    pub optimal_utilization: u128,
    /// Bump seed for the model PDA
    pub bump: u8,
}

impl KinkRateModel {
    pub const SIZE: usize = 8 + // discriminator
        4 +  // index
        16 + // base_rate
        16 + // slope_1
        16 + // slope_2
        16 + // optimal_utilization
        1;   // bump

    pub fn initialize(&mut self, index: u32, config: RateModelConfig, bump: u8) -> Result<()> {
        let RateModelConfig {
            base_rate,
            slope_1,
            slope_2,
            optimal_utilization,
        } = config;

        require!(
            optimal_utilization > 0 && optimal_utilization < WAD,
            LendingError::InvalidRateModel
        );

        let max_rate = base_rate
            .checked_add(slope_1)
            .and_then(|rate| rate.checked_add(slope_2))
            .ok_or(LendingError::MathOverflow)?;
        require_gte!(MAX_BORROW_RATE_PER_SECOND, max_rate, LendingError::InvalidRateModel);

        self.index = index;
        self.base_rate = base_rate;
        self.slope_1 = slope_1;
        self.slope_2 = slope_2;
        self.optimal_utilization = optimal_utilization;
        self.bump = bump;

        Ok(())
    }

    pub fn rate_at(&self, utilization: u128) -> Result<u128> {
        let rate = if utilization <= self.optimal_utilization {
            let slope = mul_div_down(self.slope_1, utilization, self.optimal_utilization)?;
            self.base_rate.checked_add(slope).ok_or(LendingError::MathOverflow)?
        } else {
            // Above optimal: steeper increase
            let excess_utilization = utilization.min(WAD) - self.optimal_utilization;
            let slope = mul_div_down(
                self.slope_2,
                excess_utilization,
                WAD - self.optimal_utilization,
            )?;
            self.base_rate
                .checked_add(self.slope_1)
                .and_then(|rate| rate.checked_add(slope))
                .ok_or(LendingError::MathOverflow)?
        };

        Ok(rate.min(MAX_BORROW_RATE_PER_SECOND))
    }
}

impl RateModel for KinkRateModel {
    fn borrow_rate(&self, market: &Market) -> Result<u128> {
        let utilization = utilization(market.total_borrow_assets, market.total_supply_assets)?;
        self.rate_at(utilization)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AccrualOutcome {
    pub elapsed: u128,
    pub borrow_rate: u128,
    pub interest: u128,
    pub fee_shares: u128,
}

/// Brings `market` current to `now`.
///
/// Interest is compounded with [`w_taylor_compounded`] and credited to both
/// the borrow and supply totals. The protocol fee is minted as supply shares
/// priced against the supply total excluding the fee itself, so the fee
/// recipient is not diluted by its own mint. Nothing is written back unless
/// every step succeeds.
pub fn accrue_interest<R: RateModel + ?Sized>(
    market: &mut Market,
    rate_model: &R,
    now: i64,
) -> Result<AccrualOutcome> {
    market.ensure_created()?;
    require_gte!(now, market.last_update, LendingError::TimestampRegression);

    let elapsed = now
        .checked_sub(market.last_update)
        .ok_or(LendingError::MathOverflow)? as u128;
    if elapsed == 0 {
        return Ok(AccrualOutcome::default());
    }

    let mut next = market.clone();
    let mut outcome = AccrualOutcome {
        elapsed,
        ..AccrualOutcome::default()
    };

    if next.total_borrow_assets > 0 {
        let borrow_rate = rate_model.borrow_rate(&next)?;
        let interest = w_mul_down(
            next.total_borrow_assets,
            w_taylor_compounded(borrow_rate, elapsed)?,
        )?;

        next.total_borrow_assets = next.total_borrow_assets
            .checked_add(interest)
            .ok_or(LendingError::MathOverflow)?;
        next.total_supply_assets = next.total_supply_assets
            .checked_add(interest)
            .ok_or(LendingError::MathOverflow)?;

        if next.fee > 0 {
            let fee_amount = w_mul_down(interest, next.fee)?;
            let fee_shares = to_shares_down(
                fee_amount,
                next.total_supply_assets - fee_amount,
                next.total_supply_shares,
            )?;

            next.fee_shares = next.fee_shares
                .checked_add(fee_shares)
                .ok_or(LendingError::MathOverflow)?;
            next.total_supply_shares = next.total_supply_shares
                .checked_add(fee_shares)
                .ok_or(LendingError::MathOverflow)?;
            outcome.fee_shares = fee_shares;
        }

        outcome.borrow_rate = borrow_rate;
        outcome.interest = interest;
    }

    next.last_update = now;
    *market = next;

    msg!(
        "accrued {} over {}s at rate {} (fee shares {})",
        outcome.interest,
        outcome.elapsed,
        outcome.borrow_rate,
        outcome.fee_shares
    );

    Ok(outcome)
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MarketApy {
    /// Borrowed over supplied (WAD)
    pub utilization: u128,
    /// Per-second borrow rate (WAD)
    pub borrow_rate: u128,
    /// Per-second rate earned by lenders after the protocol fee (WAD)
    pub supply_rate: u128,
    pub borrow_apy_bps: u64,
    pub supply_apy_bps: u64,
}

/// Display yields at the market's current state.
///
/// Supply rate = borrow_rate * utilization * (1 - fee). Yields compound
/// per second with [`rate_to_apy`], not with the accrual approximation.
pub fn market_apy<R: RateModel + ?Sized>(market: &Market, rate_model: &R) -> Result<MarketApy> {
    let utilization = utilization(market.total_borrow_assets, market.total_supply_assets)?;
    let borrow_rate = rate_model.borrow_rate(market)?;
    let supply_rate = w_mul_down(
        w_mul_down(borrow_rate, utilization)?,
        zero_floor_sub(WAD, market.fee),
    )?;

    Ok(MarketApy {
        utilization,
        borrow_rate,
        supply_rate,
        borrow_apy_bps: apy_to_bps(rate_to_apy(borrow_rate)),
        supply_apy_bps: apy_to_bps(rate_to_apy(supply_rate)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;

    fn default_model() -> KinkRateModel {
        let mut model = KinkRateModel::default();
        model.initialize(0, RateModelConfig::default(), 255).unwrap();
        model
    }

    #[test]
    fn kink_model_is_piecewise_linear() {
        let model = default_model();

        assert_eq!(model.rate_at(0).unwrap(), DEFAULT_BASE_RATE_PER_SECOND);
        assert_eq!(
            model.rate_at(DEFAULT_OPTIMAL_UTILIZATION).unwrap(),
            DEFAULT_BASE_RATE_PER_SECOND + DEFAULT_SLOPE_1_PER_SECOND
        );
        assert_eq!(
            model.rate_at(WAD).unwrap(),
            DEFAULT_BASE_RATE_PER_SECOND + DEFAULT_SLOPE_1_PER_SECOND + DEFAULT_SLOPE_2_PER_SECOND
        );

        let below = model.rate_at(DEFAULT_OPTIMAL_UTILIZATION / 2).unwrap();
        assert_eq!(below, DEFAULT_BASE_RATE_PER_SECOND + DEFAULT_SLOPE_1_PER_SECOND / 2);
    }

    #[test]
    fn kink_model_rejects_bad_parameters() {
        let mut model = KinkRateModel::default();
        let config = |base_rate, slope_1, optimal_utilization| RateModelConfig {
            base_rate,
            slope_1,
            slope_2: 0,
            optimal_utilization,
        };

        assert_error(model.initialize(0, config(0, 0, 0), 1), LendingError::InvalidRateModel);
        assert_error(model.initialize(0, config(0, 0, WAD), 1), LendingError::InvalidRateModel);
        assert_error(
            model.initialize(0, config(MAX_BORROW_RATE_PER_SECOND, 1, WAD / 2), 1),
            LendingError::InvalidRateModel,
        );
    }

    #[test]
    fn accrual_in_same_instant_is_noop() {
        let mut market = funded_market(1_000_000, 500_000);
        let before = market.clone();
        let now = market.last_update;

        let outcome = accrue_interest(&mut market, &FixedRate(WAD / 1_000), now).unwrap();

        assert_eq!(outcome, AccrualOutcome::default());
        assert_eq!(market, before);
    }

    #[test]
    fn accrual_credits_both_sides_and_advances_clock() {
        let mut market = funded_market(1_000_000, 500_000);
        let start = market.last_update;

        // 0.1% per second for 10 seconds
        let outcome = accrue_interest(&mut market, &FixedRate(WAD / 1_000), start + 10).unwrap();

        let growth = w_taylor_compounded(WAD / 1_000, 10).unwrap();
        let expected = w_mul_down(500_000, growth).unwrap();
        assert_eq!(outcome.interest, expected);
        assert_eq!(market.total_borrow_assets, 500_000 + expected);
        assert_eq!(market.total_supply_assets, 1_000_000 + expected);
        assert_eq!(market.last_update, start + 10);
        assert_eq!(market.fee_shares, 0);
    }

    #[test]
    fn fee_shares_are_priced_before_their_own_mint() {
        let mut market = funded_market(1_000_000, 1_000_000);
        market.fee = WAD / 10;
        let start = market.last_update;

        let outcome = accrue_interest(&mut market, &FixedRate(WAD / 100), start + 1).unwrap();

        let fee_amount = w_mul_down(outcome.interest, WAD / 10).unwrap();
        let expected_shares =
            to_shares_down(fee_amount, market.total_supply_assets - fee_amount, 1_000_000).unwrap();
        assert_eq!(outcome.fee_shares, expected_shares);
        assert_eq!(market.fee_shares, expected_shares);
        assert_eq!(market.total_supply_shares, 1_000_000 + expected_shares);
        assert!(outcome.fee_shares > 0);
    }

    #[test]
    fn idle_market_only_moves_the_clock() {
        let mut market = funded_market(1_000, 0);
        let start = market.last_update;

        let outcome = accrue_interest(&mut market, &FixedRate(WAD), start + 100).unwrap();

        assert_eq!(outcome.interest, 0);
        assert_eq!(market.total_supply_assets, 1_000);
        assert_eq!(market.last_update, start + 100);
    }

    #[test]
    fn failed_accrual_persists_nothing() {
        let mut market = funded_market(u128::MAX / 2, u128::MAX / 4);
        let before = market.clone();

        let result = accrue_interest(&mut market, &FixedRate(WAD), before.last_update + 1_000_000);

        assert_error(result, LendingError::MathOverflow);
        assert_eq!(market, before);
    }

    #[test]
    fn clock_never_moves_backwards() {
        let mut market = funded_market(1_000, 100);
        let last = market.last_update;
        assert_error(
            accrue_interest(&mut market, &FixedRate(0), last - 1),
            LendingError::TimestampRegression,
        );
    }

    #[test]
    fn apy_reflects_utilization_and_fee() {
        let mut market = funded_market(1_000_000, 500_000);
        let rate = FixedRate(WAD / 10 / SECONDS_PER_YEAR as u128);

        let apy = market_apy(&market, &rate).unwrap();
        assert_eq!(apy.utilization, WAD / 2);
        assert_eq!(apy.borrow_apy_bps, 1_051);
        assert_eq!(apy.supply_apy_bps, 512);

        market.fee = WAD / 10;
        let with_fee = market_apy(&market, &rate).unwrap();
        assert!(with_fee.supply_rate < apy.supply_rate);
        assert_eq!(with_fee.borrow_rate, apy.borrow_rate);
    }
}
