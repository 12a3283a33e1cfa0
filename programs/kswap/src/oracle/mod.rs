//! Price oracle capability.
//!
//! The K engine reads prices only through [`PriceOracle`]. Three feed layouts implement it:
//! a list of raw price records, a feed that publishes a triggered average and variance, and
//! a constant mock used by tests and devnet pools.

use anchor_lang::prelude::*;

use crate::errors::OracleError;
use crate::math::u256::product;
use crate::math::FixedPoint128;

pub mod avg_price;
pub mod const_mock;
pub mod legacy_list;

pub use avg_price::*;
pub use const_mock::*;
pub use legacy_list::*;

/// Normalized oracle sample
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PriceSample {
    /// Token0 side of the price
    pub eth_amount: u128,
    /// Token1 side of the price
    pub erc20_amount: u128,
    /// Slot the price became effective
    pub slot: u64,
    /// Per-slot variance of the relative price change
    pub sigma_sq: FixedPoint128,
}

pub trait PriceOracle {
    /// Latest usable sample for `token` as seen at `current_slot`
    fn latest_sample(&self, token: &Pubkey, current_slot: u64) -> Result<PriceSample>;
}

/// One raw price as published by a feeder
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq, InitSpace)]
pub struct PriceRecord {
    pub eth_amount: u128,
    pub erc20_amount: u128,
    pub slot: u64,
}

impl PriceRecord {
    pub fn new(eth_amount: u128, erc20_amount: u128, slot: u64) -> Result<Self> {
        require!(
            eth_amount > 0 && erc20_amount > 0,
            OracleError::InvalidPrice
        );
        Ok(Self {
            eth_amount,
            erc20_amount,
            slot,
        })
    }
}

/// Squared relative price change between two records, per elapsed slot.
///
/// Prices are `erc20 / eth`, so `p1 / p0 = erc20_1 * eth_0 / (eth_1 * erc20_0)`.
/// Returns `None` when both records share a slot.
pub fn per_slot_variance(prev: &PriceRecord, next: &PriceRecord) -> Result<Option<FixedPoint128>> {
    let slots = next.slot.saturating_sub(prev.slot);
    if slots == 0 {
        return Ok(None);
    }
    let numerator = product(&[next.erc20_amount, prev.eth_amount])?;
    let denominator = product(&[next.eth_amount, prev.erc20_amount])?;

    let change =
        FixedPoint128::from_wide_ratio(numerator, denominator)?.checked_sub(FixedPoint128::ONE)?;
    let variance = change
        .checked_mul(change)?
        .checked_div(FixedPoint128::from_int(slots as i64))?;
    Ok(Some(variance))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variance_of_unchanged_price_is_zero() {
        let a = PriceRecord::new(10, 38, 100).unwrap();
        let b = PriceRecord::new(20, 76, 110).unwrap();
        assert_eq!(per_slot_variance(&a, &b).unwrap(), Some(FixedPoint128::ZERO));
    }

    #[test]
    fn test_variance_scales_with_slots() {
        let a = PriceRecord::new(100, 100, 0).unwrap();
        let b = PriceRecord::new(100, 110, 1).unwrap();
        let c = PriceRecord::new(100, 110, 4).unwrap();
        let one_slot = per_slot_variance(&a, &b).unwrap().unwrap().to_f64();
        assert!((one_slot - 0.01).abs() < 1e-15);

        let b_late = PriceRecord { slot: 4, ..b };
        let four_slots = per_slot_variance(&a, &b_late).unwrap().unwrap().to_f64();
        assert!((four_slots - 0.0025).abs() < 1e-15);

        assert_eq!(per_slot_variance(&b_late, &c).unwrap(), None);
    }

    #[test]
    fn test_variance_of_18_decimal_prices() {
        let unit = 1_000_000_000_000_000_000u128;
        let a = PriceRecord::new(unit, 3_000 * unit, 0).unwrap();
        let b = PriceRecord::new(unit, 3_001 * unit, 1).unwrap();
        let variance = per_slot_variance(&a, &b).unwrap().unwrap().to_f64();
        let expected = (1.0f64 / 3_000.0).powi(2);
        assert!((variance - expected).abs() / expected < 1e-9);
    }

    #[test]
    fn test_zero_price_rejected() {
        let e: Error = OracleError::InvalidPrice.into();
        assert_eq!(PriceRecord::new(0, 1, 0).unwrap_err(), e);
        assert_eq!(PriceRecord::new(1, 0, 0).unwrap_err(), e);
    }
}
