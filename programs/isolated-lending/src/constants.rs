/// PDA seed for the protocol configuration
pub const GLOBAL_CONFIG_SEED: &[u8] = b"global_config";

/// PDA seed for markets, followed by the 32-byte market id
pub const MARKET_SEED: &[u8] = b"market";

/// PDA seed for positions, followed by market and owner
pub const POSITION_SEED: &[u8] = b"position";

/// PDA seed for the loan-token vault of a market
pub const LOAN_VAULT_SEED: &[u8] = b"loan_vault";

/// PDA seed for the collateral-token vault of a market
pub const COLLATERAL_VAULT_SEED: &[u8] = b"collateral_vault";

/// PDA seed for rate model accounts, followed by the model index
pub const RATE_MODEL_SEED: &[u8] = b"rate_model";

/// PDA seed for price feeds, followed by authority, collateral and loan mints
pub const PRICE_FEED_SEED: &[u8] = b"price_feed";

/// Fixed-point scale (1e18)
pub const WAD: u128 = 1_000_000_000_000_000_000;

/// Scale of oracle prices (1e18)
pub const ORACLE_SCALE: u128 = 1_000_000_000_000_000_000;

/// Virtual shares added to every share/asset conversion
pub const VIRTUAL_SHARES: u128 = 1;

/// Virtual assets added to every share/asset conversion
pub const VIRTUAL_ASSETS: u128 = 1;

/// Maximum protocol fee on interest (25%)
pub const MAX_FEE: u128 = WAD / 4;

/// Maximum number of enabled LLTVs
pub const MAX_LLTVS: usize = 16;

/// Maximum liquidation incentive factor (115%)
pub const MAX_LIQUIDATION_INCENTIVE_FACTOR: u128 = 1_150_000_000_000_000_000;

/// Liquidation cursor (30%)
pub const LIQUIDATION_CURSOR: u128 = 300_000_000_000_000_000;

/// Smallest debt a single liquidation may repay, in loan-token units
pub const MIN_LIQUIDATION_REPAY_ASSETS: u128 = 1;

/// Seconds per year (approximate)
pub const SECONDS_PER_YEAR: u64 = 31_536_000;

/// Upper bound on any per-second borrow rate (1000% APR)
pub const MAX_BORROW_RATE_PER_SECOND: u128 = WAD * 10 / SECONDS_PER_YEAR as u128;

/// Oracle price staleness threshold (5 minutes in seconds)
pub const ORACLE_STALENESS_THRESHOLD: i64 = 300;

/// Default rate model: base rate (~2% APR per second, WAD)
pub const DEFAULT_BASE_RATE_PER_SECOND: u128 = 634_195_839;

/// Default rate model: slope below optimal utilization (~10% APR)
pub const DEFAULT_SLOPE_1_PER_SECOND: u128 = 3_170_979_198;

/// Default rate model: slope above optimal utilization (~100% APR)
pub const DEFAULT_SLOPE_2_PER_SECOND: u128 = 31_709_791_983;

/// Default rate model: optimal utilization (80%, WAD)
pub const DEFAULT_OPTIMAL_UTILIZATION: u128 = 800_000_000_000_000_000;

/// Basis points (10000 = 100%)
pub const BPS_SCALE: u64 = 10_000;

/// Marker for an unbounded health factor (no debt)
pub const HEALTH_FACTOR_MAX: u128 = u128::MAX;
