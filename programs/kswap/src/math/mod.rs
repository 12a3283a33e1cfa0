pub mod fixed_point;
pub mod impact_cost;
pub mod pricing;
pub mod u256;

pub use fixed_point::FixedPoint128;
pub use impact_cost::{QueryHint, QueryOp};
pub use pricing::{BurnQuote, OraclePriceView};

use anchor_lang::prelude::*;

use crate::errors::KswapError;

/// Narrow a computed amount to a token amount
pub fn to_u64(value: u128) -> Result<u64> {
    u64::try_from(value).map_err(|_| error!(KswapError::MathOverflow))
}
