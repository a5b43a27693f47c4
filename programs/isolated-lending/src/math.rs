use anchor_lang::prelude::*;
use crate::constants::*;
use crate::errors::LendingError;

/// Floor of `a * b / c` and whether the division left a remainder.
///
/// When `a * b` does not fit in a `u128` the product is split as
/// `(a / c) * b * c + (a % c) * b`, trying both operand orders, so only a
/// quotient that is itself unrepresentable fails with `MathOverflow`.
fn mul_div(a: u128, b: u128, c: u128) -> Result<(u128, bool)> {
    require!(c != 0, LendingError::DivisionByZero);

    if let Some(product) = a.checked_mul(b) {
        return Ok((product / c, product % c != 0));
    }

    for (x, y) in [(a, b), (b, a)] {
        if let Some(rest) = (x % c).checked_mul(y) {
            let quotient = (x / c)
                .checked_mul(y)
                .and_then(|whole| whole.checked_add(rest / c))
                .ok_or(LendingError::MathOverflow)?;
            return Ok((quotient, rest % c != 0));
        }
    }

    err!(LendingError::MathOverflow)
}

/// `a * b / c`, rounded down.
pub fn mul_div_down(a: u128, b: u128, c: u128) -> Result<u128> {
    let (quotient, _) = mul_div(a, b, c)?;
    Ok(quotient)
}

/// `a * b / c`, rounded up whenever the division leaves a remainder.
pub fn mul_div_up(a: u128, b: u128, c: u128) -> Result<u128> {
    let (quotient, remainder) = mul_div(a, b, c)?;
    if remainder {
        quotient.checked_add(1).ok_or_else(|| error!(LendingError::MathOverflow))
    } else {
        Ok(quotient)
    }
}

/// True when exactly one of a dual-mode `(assets, shares)` pair is set.
pub fn exactly_one_zero(a: u128, b: u128) -> bool {
    (a == 0) != (b == 0)
}

/// `a * b / WAD`, rounded down.
pub fn w_mul_down(a: u128, b: u128) -> Result<u128> {
    mul_div_down(a, b, WAD)
}

/// `a * WAD / b`, rounded down.
pub fn w_div_down(a: u128, b: u128) -> Result<u128> {
    mul_div_down(a, WAD, b)
}

/// `a * WAD / b`, rounded up.
pub fn w_div_up(a: u128, b: u128) -> Result<u128> {
    mul_div_up(a, WAD, b)
}

/// `max(a - b, 0)`
pub fn zero_floor_sub(a: u128, b: u128) -> u128 {
    a.saturating_sub(b)
}

/// Growth factor of `(1 + x)^n - 1` approximated by the first three terms of
/// the Taylor expansion of `e^(x*n) - 1`.
///
/// Cost is constant in `n`. This is the only compounding used to mutate market
/// state; see [`rate_to_apy`] for the display-side computation.
pub fn w_taylor_compounded(x: u128, n: u128) -> Result<u128> {
    let first_term = x.checked_mul(n).ok_or(LendingError::MathOverflow)?;
    let second_term = mul_div_down(first_term, first_term, 2 * WAD)?;
    let third_term = mul_div_down(second_term, first_term, 3 * WAD)?;

    first_term
        .checked_add(second_term)
        .and_then(|sum| sum.checked_add(third_term))
        .ok_or_else(|| error!(LendingError::MathOverflow))
}

/// Utilization of a pool (borrowed / supplied), WAD-scaled.
/// Returns 0 when nothing has been supplied.
pub fn utilization(total_borrow_assets: u128, total_supply_assets: u128) -> Result<u128> {
    if total_supply_assets == 0 {
        return Ok(0);
    }

    w_div_down(total_borrow_assets, total_supply_assets)
}

/// Annualized yield of a per-second WAD rate, `(1 + r)^SECONDS_PER_YEAR - 1`.
///
/// Uses full floating point exponentiation and is for display only. Never
/// feed its output back into accounting.
pub fn rate_to_apy(rate_per_second: u128) -> f64 {
    let rate = rate_per_second as f64 / WAD as f64;
    (1.0 + rate).powf(SECONDS_PER_YEAR as f64) - 1.0
}

/// Converts a fractional yield into basis points, saturating at `u64::MAX`.
pub fn apy_to_bps(apy: f64) -> u64 {
    let bps = apy * BPS_SCALE as f64;
    if bps.is_nan() || bps <= 0.0 {
        0
    } else if bps >= u64::MAX as f64 {
        u64::MAX
    } else {
        bps as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mul_div_rounds_in_requested_direction() {
        assert_eq!(mul_div_down(10, 10, 3).unwrap(), 33);
        assert_eq!(mul_div_up(10, 10, 3).unwrap(), 34);
        assert_eq!(mul_div_up(10, 9, 3).unwrap(), 30);
        assert_eq!(mul_div_down(0, 7, 3).unwrap(), 0);
        assert_eq!(mul_div_up(0, 7, 3).unwrap(), 0);
    }

    #[test]
    fn mul_div_reports_overflow_and_zero_divisor() {
        assert!(mul_div_down(u128::MAX, 2, 1).is_err());
        assert!(mul_div_up(u128::MAX, 3, 2).is_err());
        assert!(mul_div_down(1, 1, 0).is_err());
        assert!(mul_div_up(1, 1, 0).is_err());
    }

    #[test]
    fn mul_div_survives_wide_products() {
        assert_eq!(mul_div_down(u128::MAX, 10, 20).unwrap(), u128::MAX / 2);
        assert_eq!(mul_div_up(u128::MAX, 10, 20).unwrap(), u128::MAX / 2 + 1);
        assert_eq!(mul_div_down(3, u128::MAX, u128::MAX).unwrap(), 3);
        assert_eq!(mul_div_up(3, u128::MAX, u128::MAX).unwrap(), 3);
    }

    #[test]
    fn dual_mode_inputs() {
        assert!(exactly_one_zero(1, 0));
        assert!(exactly_one_zero(0, 1));
        assert!(!exactly_one_zero(0, 0));
        assert!(!exactly_one_zero(1, 1));
    }

    #[test]
    fn wad_helpers() {
        let half = WAD / 2;
        assert_eq!(w_mul_down(3 * WAD, half).unwrap(), 3 * WAD / 2);
        assert_eq!(w_div_down(WAD, 3 * WAD).unwrap(), 333_333_333_333_333_333);
        assert_eq!(w_div_up(WAD, 3 * WAD).unwrap(), 333_333_333_333_333_334);
        assert_eq!(zero_floor_sub(5, 7), 0);
        assert_eq!(zero_floor_sub(7, 5), 2);
    }

    #[test]
    fn taylor_is_close_to_exact_compounding() {
        // 10% APR per second for one year
        let rate = WAD / 10 / SECONDS_PER_YEAR as u128;
        let growth = w_taylor_compounded(rate, SECONDS_PER_YEAR as u128).unwrap();

        let exact = (0.1f64).exp() - 1.0;
        let approx = growth as f64 / WAD as f64;
        assert!((exact - approx).abs() < 1e-5, "{exact} vs {approx}");
        assert!(approx <= exact);
    }

    #[test]
    fn taylor_of_zero_is_zero() {
        assert_eq!(w_taylor_compounded(0, 1_000).unwrap(), 0);
        assert_eq!(w_taylor_compounded(1_000, 0).unwrap(), 0);
    }

    #[test]
    fn utilization_of_empty_pool_is_zero() {
        assert_eq!(utilization(0, 0).unwrap(), 0);
        assert_eq!(utilization(50, 100).unwrap(), WAD / 2);
    }

    #[test]
    fn display_apy_uses_exact_compounding() {
        let rate = WAD / 10 / SECONDS_PER_YEAR as u128;
        let apy = rate_to_apy(rate);
        assert!((apy - ((0.1f64).exp() - 1.0)).abs() < 1e-6);
        assert_eq!(apy_to_bps(0.05), 500);
        assert_eq!(apy_to_bps(-1.0), 0);
    }
}
