use anchor_lang::prelude::*;

#[error_code]
pub enum LendingError {
    // Input
    #[msg("Exactly one of the asset and share amounts must be nonzero")]
    InconsistentInput,

    #[msg("Amount must be nonzero")]
    ZeroAmount,

    #[msg("Address must not be the default pubkey")]
    ZeroAddress,

    #[msg("Market not created")]
    MarketNotCreated,

    #[msg("Market already created")]
    MarketAlreadyCreated,

    #[msg("LLTV is not enabled")]
    LltvNotEnabled,

    #[msg("LLTV must be strictly below 100%")]
    InvalidLltv,

    #[msg("Too many enabled LLTVs")]
    TooManyLltvs,

    #[msg("Fee exceeds the protocol maximum")]
    MaxFeeExceeded,

    #[msg("Value already set")]
    AlreadySet,

    #[msg("Unauthorized")]
    Unauthorized,

    #[msg("Invalid market configuration")]
    InvalidMarketConfig,

    #[msg("Invalid rate model parameters")]
    InvalidRateModel,

    #[msg("Timestamp is earlier than the last accrual")]
    TimestampRegression,

    // Solvency
    #[msg("Insufficient collateral")]
    InsufficientCollateral,

    #[msg("Repay exceeds outstanding debt")]
    RepayExceedsDebt,

    #[msg("Withdraw exceeds supplied balance")]
    WithdrawExceedsBalance,

    // Liquidation eligibility
    #[msg("Position is healthy")]
    HealthyPosition,

    #[msg("Liquidation amount below the minimum increment")]
    LiquidationTooSmall,

    // Oracle
    #[msg("Oracle price is zero or invalid")]
    InvalidOraclePrice,

    #[msg("Oracle price is stale")]
    StaleOraclePrice,

    // Liquidity
    #[msg("Insufficient liquidity in market")]
    InsufficientLiquidity,

    // Arithmetic
    #[msg("Math overflow")]
    MathOverflow,

    #[msg("Division by zero")]
    DivisionByZero,
}
