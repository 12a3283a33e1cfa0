use anchor_lang::prelude::*;

#[error_code]
pub enum KswapError {
    // Governance
    #[msg("Controller: only governance may transfer governance")]
    NotGovernanceTransfer,

    #[msg("Controller: only governance may set theta")]
    NotGovernanceTheta,

    #[msg("Controller: only governance may set timespan")]
    NotGovernanceTimespan,

    #[msg("Controller: only governance may set the K refresh interval")]
    NotGovernanceRefreshInterval,

    #[msg("Controller: only governance may set K bounds")]
    NotGovernanceKBounds,

    #[msg("Controller: only governance may set the destruction amount")]
    NotGovernanceDestructionAmount,

    #[msg("Controller: only governance may set the K table")]
    NotGovernanceKTable,

    #[msg("Controller: only governance may set the oracle fee collector")]
    NotGovernanceFeeCollector,

    #[msg("Controller: only governance may manage callers")]
    NotGovernanceCaller,

    #[msg("Controller: only governance may activate")]
    NotGovernanceActivate,

    #[msg("Only the program upgrade authority may initialize the controller")]
    NotUpgradeAuthority,

    #[msg("Invalid program data account")]
    InvalidProgramData,

    #[msg("Only the factory may create pools")]
    OnlyFactory,

    #[msg("K table: not authorized")]
    NotAuthorized,

    #[msg("Caller not allowed")]
    CallerNotAllowed,

    // Staleness / availability
    #[msg("Controller not activated")]
    NotActivated,

    #[msg("Oracle price too stale")]
    PriceTooStale,

    #[msg("K unavailable for the current buckets")]
    KUnavailable,

    #[msg("K out of bounds")]
    KOutOfBounds,

    // Validation
    #[msg("K table index out of range")]
    IndexOutOfRange,

    #[msg("K table batch length mismatch")]
    LengthMismatch,

    #[msg("K table cell already set")]
    CellAlreadySet,

    #[msg("Invalid asset ratio")]
    InvalidAssetRatio,

    #[msg("Invalid theta")]
    InvalidTheta,

    #[msg("Invalid K bounds")]
    InvalidKBounds,

    #[msg("Invalid timespan")]
    InvalidTimespan,

    #[msg("Invalid K table account")]
    InvalidKTable,

    #[msg("Invalid price feed")]
    InvalidPriceFeed,

    #[msg("Invalid fee collector")]
    InvalidFeeCollector,

    // Pool
    #[msg("Token mints must be different")]
    IdenticalTokenMints,

    #[msg("Token decimals not supported")]
    UnsupportedDecimals,

    #[msg("Pool not initialized")]
    PoolNotInitialized,

    #[msg("Pool holds reserves but no shares")]
    OrphanedReserves,

    #[msg("Amount too small")]
    AmountTooSmall,

    #[msg("Insufficient liquidity minted")]
    InsufficientLiquidityMinted,

    #[msg("Insufficient liquidity burned")]
    InsufficientLiquidityBurned,

    #[msg("Insufficient liquidity for swap")]
    InsufficientLiquidity,

    #[msg("Slippage tolerance exceeded")]
    SlippageExceeded,

    // Math
    #[msg("Math overflow")]
    MathOverflow,

    #[msg("Division by zero")]
    DivisionByZero,

    // Accounts
    #[msg("Invalid token mint")]
    InvalidTokenMint,

    #[msg("Invalid vault")]
    InvalidVault,
}

/// Errors raised by the price oracle. They are returned to the caller unchanged.
#[error_code(offset = 7000)]
pub enum OracleError {
    #[msg("Oracle: insufficient fee")]
    InsufficientFee,

    #[msg("Oracle: no price available")]
    NoPrice,

    #[msg("Oracle: token mismatch")]
    MalformedToken,

    #[msg("Oracle: price must be positive")]
    InvalidPrice,

    #[msg("Oracle: not the feeder")]
    NotFeeder,
}
