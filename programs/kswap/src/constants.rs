/// kswap constants

// ============================================================================
// SCALING CONSTANTS
// ============================================================================

/// Denominator of the K coefficient when expressed as an integer (1.0 = 1e8)
pub const K_BASE: u128 = 100_000_000;

/// Denominator of the trading fee rate theta (1.0 = 1e8)
pub const THETA_BASE: u128 = 100_000_000;

/// Net asset value per share of an empty pool
pub const NAVPS_BASE: u128 = 1_000_000_000_000_000_000;

/// Basis points denominator (100% = 10000 BPS)
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Volumes handed to the impact cost model use 18 decimals
pub const VOLUME_DECIMALS: u8 = 18;

/// 1.0 in the impact cost volume unit
pub const VOLUME_UNIT: u128 = 1_000_000_000_000_000_000;

/// `timespan` is expressed in milliseconds per slot
pub const TIMESPAN_BASE: u64 = 1_000;

// ============================================================================
// K TABLE
// ============================================================================

/// Number of elapsed-time buckets (10 second steps, 0..=900s)
pub const T_BUCKETS: usize = 91;

/// Number of volatility buckets
pub const SIGMA_BUCKETS: usize = 20;

/// Total number of cells
pub const K_TABLE_CELLS: usize = T_BUCKETS * SIGMA_BUCKETS;

/// Bytes of the presence bitmap (one bit per cell)
pub const K_TABLE_BITMAP_BYTES: usize = (K_TABLE_CELLS + 7) / 8;

/// Width of a time bucket in seconds
pub const T_BUCKET_SECONDS: u64 = 10;

/// Width of a volatility bucket: 0.0005 as 64.64
pub const SIGMA_STEP: i128 = 9_223_372_036_854_775;

/// 0.5 as 64.64
pub const ZERO_POINT_FIVE: i128 = 1 << 63;

// ============================================================================
// K ENGINE DEFAULTS
// ============================================================================

/// Ceiling of K0 accepted by default: 0.05 as 64.64
pub const MAX_K0: i128 = 922_337_203_685_477_580;

/// Default fee: 0.2% of THETA_BASE
pub const DEFAULT_THETA: u32 = 200_000;

/// Default slot duration in milliseconds
pub const DEFAULT_TIMESPAN: u64 = 400;

/// Default K cache lifetime in seconds
pub const DEFAULT_K_REFRESH_INTERVAL: i64 = 5 * 60;

// ============================================================================
// IMPACT COST
// ============================================================================

/// Trades below 500 ETH-equivalent carry no impact cost
pub const IMPACT_COST_THRESHOLD: u128 = 500 * VOLUME_UNIT;

/// 2.570e-05 as 64.64
pub const C_BUYIN_ALPHA: i128 = 474_081_322_694_335;

/// 8.542e-07 as 64.64
pub const C_BUYIN_BETA: i128 = 15_757_208_787_762;

/// -1.171e-04 as 64.64
pub const C_SELLOUT_ALPHA: i128 = -2_160_113_731_031_388;

/// 8.386e-07 as 64.64
pub const C_SELLOUT_BETA: i128 = 15_469_439_580_212;

// ============================================================================
// POOL LIMITS
// ============================================================================

/// Tolerance of the first deposit against the oracle ratio (1%)
pub const ASSET_RATIO_TOLERANCE_BPS: u128 = 100;

/// Minimum swap amount (prevents dust attacks)
pub const MIN_SWAP_AMOUNT: u64 = 100;

/// Minimum liquidity locked forever on first deposit
pub const MINIMUM_LIQUIDITY: u64 = 1_000;

/// Number of samples kept by a legacy list feed
pub const LEGACY_LIST_LEN: usize = 16;

// ============================================================================
// PDA SEEDS
// ============================================================================

/// Seed for the controller PDA
pub const CONTROLLER_SEED: &[u8] = b"controller";

/// Seed for per-token K info PDAs
pub const K_INFO_SEED: &[u8] = b"k_info";

/// Seed for allowed caller records
pub const CALLER_SEED: &[u8] = b"caller";

/// Seed for per-token price feeds
pub const PRICE_FEED_SEED: &[u8] = b"price_feed";

/// Seed for pool PDA
pub const POOL_SEED: &[u8] = b"pool";

/// Seed for token 0 vault PDA
pub const VAULT_0_SEED: &[u8] = b"vault_0";

/// Seed for token 1 vault PDA
pub const VAULT_1_SEED: &[u8] = b"vault_1";

/// Seed for LP token mint PDA
pub const LP_MINT_SEED: &[u8] = b"lp_mint";

/// Seed for LP mint authority PDA
pub const LP_MINT_AUTHORITY_SEED: &[u8] = b"lp_mint_authority";

// ============================================================================
// PROTOCOL
// ============================================================================

/// Current protocol version
pub const PROTOCOL_VERSION: u8 = 1;

// ============================================================================
// HELPERS
// ============================================================================

/// Validate a trading fee rate
pub fn validate_theta(theta: u32) -> bool {
    (theta as u128) < THETA_BASE
}
