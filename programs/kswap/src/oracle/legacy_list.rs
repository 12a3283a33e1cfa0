use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::{KswapError, OracleError};
use crate::math::FixedPoint128;
use crate::oracle::{per_slot_variance, PriceOracle, PriceRecord, PriceSample};

/// Feed that keeps the last `LEGACY_LIST_LEN` raw prices and derives the variance itself
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, InitSpace)]
pub struct LegacyListOracle {
    /// Ring buffer of records
    pub records: [PriceRecord; LEGACY_LIST_LEN],
    /// Number of valid records
    pub len: u8,
    /// Index the next record is written to
    pub head: u8,
}

impl Default for LegacyListOracle {
    fn default() -> Self {
        Self {
            records: [PriceRecord::default(); LEGACY_LIST_LEN],
            len: 0,
            head: 0,
        }
    }
}

impl LegacyListOracle {
    pub fn push(&mut self, record: PriceRecord) -> Result<()> {
        if let Some(last) = self.latest() {
            require!(record.slot >= last.slot, OracleError::InvalidPrice);
        }
        self.records[self.head as usize] = record;
        self.head = ((self.head as usize + 1) % LEGACY_LIST_LEN) as u8;
        if (self.len as usize) < LEGACY_LIST_LEN {
            self.len += 1;
        }
        Ok(())
    }

    pub fn latest(&self) -> Option<&PriceRecord> {
        self.nth_newest(0)
    }

    /// `n = 0` is the newest record
    fn nth_newest(&self, n: usize) -> Option<&PriceRecord> {
        if n >= self.len as usize {
            return None;
        }
        let idx = (self.head as usize + LEGACY_LIST_LEN - 1 - n) % LEGACY_LIST_LEN;
        self.records.get(idx)
    }

    /// Mean per-slot variance over consecutive records, oldest to newest
    pub fn sigma_sq(&self) -> Result<FixedPoint128> {
        let mut sum = FixedPoint128::ZERO;
        let mut count: i64 = 0;
        for n in (1..self.len as usize).rev() {
            let (Some(prev), Some(next)) = (self.nth_newest(n), self.nth_newest(n - 1)) else {
                continue;
            };
            if let Some(variance) = per_slot_variance(prev, next)? {
                sum = sum.checked_add(variance)?;
                count += 1;
            }
        }
        if count == 0 {
            return Ok(FixedPoint128::ZERO);
        }
        sum.checked_div(FixedPoint128::from_int(count))
    }
}

impl PriceOracle for LegacyListOracle {
    fn latest_sample(&self, _token: &Pubkey, _current_slot: u64) -> Result<PriceSample> {
        let latest = self.latest().ok_or(OracleError::NoPrice)?;
        require!(latest.eth_amount > 0, KswapError::DivisionByZero);
        Ok(PriceSample {
            eth_amount: latest.eth_amount,
            erc20_amount: latest.erc20_amount,
            slot: latest.slot,
            sigma_sq: self.sigma_sq()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(erc20: u128, slot: u64) -> PriceRecord {
        PriceRecord::new(1_000_000, erc20, slot).unwrap()
    }

    #[test]
    fn test_empty_feed_has_no_price() {
        let feed = LegacyListOracle::default();
        let e: Error = OracleError::NoPrice.into();
        assert_eq!(
            feed.latest_sample(&Pubkey::default(), 0).unwrap_err(),
            e
        );
    }

    #[test]
    fn test_single_record_has_zero_variance() {
        let mut feed = LegacyListOracle::default();
        feed.push(record(3_862, 10)).unwrap();
        let sample = feed.latest_sample(&Pubkey::default(), 50).unwrap();
        assert_eq!(sample.slot, 10);
        assert_eq!(sample.erc20_amount, 3_862);
        assert_eq!(sample.sigma_sq, FixedPoint128::ZERO);
    }

    #[test]
    fn test_variance_is_mean_of_pairs() {
        let mut feed = LegacyListOracle::default();
        feed.push(record(1_000, 0)).unwrap();
        feed.push(record(1_100, 1)).unwrap();
        feed.push(record(1_100, 2)).unwrap();
        // (0.01 + 0) / 2
        let sigma_sq = feed.sigma_sq().unwrap().to_f64();
        assert!((sigma_sq - 0.005).abs() < 1e-15);
    }

    #[test]
    fn test_18_decimal_prices() {
        let unit = VOLUME_UNIT;
        let mut feed = LegacyListOracle::default();
        feed.push(PriceRecord::new(unit, 3_000 * unit, 0).unwrap()).unwrap();
        feed.push(PriceRecord::new(unit, 3_001 * unit, 1).unwrap()).unwrap();

        let sample = feed.latest_sample(&Pubkey::default(), 1).unwrap();
        assert_eq!(sample.erc20_amount, 3_001 * unit);
        let expected = (1.0f64 / 3_000.0).powi(2);
        assert!((sample.sigma_sq.to_f64() - expected).abs() / expected < 1e-9);
    }

    #[test]
    fn test_ring_buffer_keeps_newest() {
        let mut feed = LegacyListOracle::default();
        for i in 0..(LEGACY_LIST_LEN as u64 + 5) {
            feed.push(record(1_000 + i as u128, i)).unwrap();
        }
        assert_eq!(feed.len as usize, LEGACY_LIST_LEN);
        assert_eq!(feed.latest().unwrap().slot, LEGACY_LIST_LEN as u64 + 4);
        assert_eq!(feed.nth_newest(LEGACY_LIST_LEN - 1).unwrap().slot, 5);
        assert!(feed.nth_newest(LEGACY_LIST_LEN).is_none());
    }

    #[test]
    fn test_out_of_order_record_rejected() {
        let mut feed = LegacyListOracle::default();
        feed.push(record(1_000, 10)).unwrap();
        assert!(feed.push(record(1_000, 9)).is_err());
    }
}
