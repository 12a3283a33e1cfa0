use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::{KswapError, OracleError};
use crate::math::u256::{mul_div, Rounding};
use crate::math::FixedPoint128;
use crate::oracle::{per_slot_variance, PriceOracle, PriceRecord, PriceSample};

/// Weight of the previous average, in percent
const AVG_DECAY_PCT: u128 = 95;

/// Feed that publishes a triggered price with a running average and variance.
///
/// A fed price is `latest` until a later slot is fed; it then becomes the triggered price
/// the oracle serves, and the averages absorb it.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq, InitSpace)]
pub struct AvgPriceOracle {
    pub latest: PriceRecord,
    pub triggered: PriceRecord,
    /// Average token1 per `VOLUME_UNIT` of token0
    pub triggered_avg_price: u128,
    /// Running per-slot variance (64.64)
    pub triggered_sigma_sq: i128,
}

impl AvgPriceOracle {
    pub fn feed(&mut self, record: PriceRecord) -> Result<()> {
        require!(record.slot >= self.latest.slot, OracleError::InvalidPrice);
        if self.latest.eth_amount > 0 && record.slot > self.latest.slot {
            self.trigger()?;
        }
        self.latest = record;
        Ok(())
    }

    fn trigger(&mut self) -> Result<()> {
        let price = mul_div(
            &[self.latest.erc20_amount, VOLUME_UNIT],
            &[self.latest.eth_amount],
            Rounding::Down,
        )?;

        if self.triggered.eth_amount == 0 {
            self.triggered_avg_price = price;
            self.triggered_sigma_sq = 0;
        } else {
            let weighted = self
                .triggered_avg_price
                .checked_mul(AVG_DECAY_PCT)
                .and_then(|a| a.checked_add(price.checked_mul(100 - AVG_DECAY_PCT)?))
                .ok_or(KswapError::MathOverflow)?;
            self.triggered_avg_price = weighted / 100;

            if let Some(variance) = per_slot_variance(&self.triggered, &self.latest)? {
                let decay = FixedPoint128::from_ratio(AVG_DECAY_PCT, 100)?;
                let gain = FixedPoint128::from_ratio(100 - AVG_DECAY_PCT, 100)?;
                self.triggered_sigma_sq = FixedPoint128::from_raw(self.triggered_sigma_sq)
                    .checked_mul(decay)?
                    .checked_add(variance.checked_mul(gain)?)?
                    .raw();
            }
        }

        self.triggered = self.latest;
        Ok(())
    }
}

impl PriceOracle for AvgPriceOracle {
    fn latest_sample(&self, _token: &Pubkey, _current_slot: u64) -> Result<PriceSample> {
        require!(self.triggered.eth_amount > 0, OracleError::NoPrice);
        Ok(PriceSample {
            eth_amount: self.triggered.eth_amount,
            erc20_amount: self.triggered.erc20_amount,
            slot: self.triggered.slot,
            sigma_sq: FixedPoint128::from_raw(self.triggered_sigma_sq),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(erc20: u128, slot: u64) -> PriceRecord {
        PriceRecord::new(VOLUME_UNIT, erc20, slot).unwrap()
    }

    #[test]
    fn test_untriggered_feed_has_no_price() {
        let mut feed = AvgPriceOracle::default();
        feed.feed(record(1_000, 5)).unwrap();
        let e: Error = OracleError::NoPrice.into();
        assert_eq!(feed.latest_sample(&Pubkey::default(), 5).unwrap_err(), e);
    }

    #[test]
    fn test_same_slot_feed_replaces_latest() {
        let mut feed = AvgPriceOracle::default();
        feed.feed(record(1_000, 5)).unwrap();
        feed.feed(record(2_000, 5)).unwrap();
        feed.feed(record(3_000, 6)).unwrap();
        let sample = feed.latest_sample(&Pubkey::default(), 6).unwrap();
        assert_eq!(sample.erc20_amount, 2_000);
        assert_eq!(sample.slot, 5);
        assert_eq!(feed.triggered_avg_price, 2_000);
    }

    #[test]
    fn test_running_average_and_variance() {
        let mut feed = AvgPriceOracle::default();
        feed.feed(record(1_000, 1)).unwrap();
        feed.feed(record(1_100, 2)).unwrap();
        feed.feed(record(1_100, 3)).unwrap();

        // triggered: 1000 @1, then 1100 @2
        assert_eq!(feed.triggered.slot, 2);
        assert_eq!(feed.triggered_avg_price, (1_000 * 95 + 1_100 * 5) / 100);
        let sigma_sq = FixedPoint128::from_raw(feed.triggered_sigma_sq).to_f64();
        assert!((sigma_sq - 0.05 * 0.01).abs() < 1e-15);
    }

    #[test]
    fn test_18_decimal_prices() {
        let mut feed = AvgPriceOracle::default();
        feed.feed(record(3_000 * VOLUME_UNIT, 1)).unwrap();
        feed.feed(record(3_001 * VOLUME_UNIT, 2)).unwrap();
        feed.feed(record(3_002 * VOLUME_UNIT, 3)).unwrap();

        let sample = feed.latest_sample(&Pubkey::default(), 3).unwrap();
        assert_eq!(sample.erc20_amount, 3_001 * VOLUME_UNIT);
        let expected = 0.05 * (1.0f64 / 3_000.0).powi(2);
        assert!((sample.sigma_sq.to_f64() - expected).abs() / expected < 1e-9);
    }

    #[test]
    fn test_backwards_slot_rejected() {
        let mut feed = AvgPriceOracle::default();
        feed.feed(record(1_000, 10)).unwrap();
        let e: Error = OracleError::InvalidPrice.into();
        assert_eq!(feed.feed(record(1_000, 9)).unwrap_err(), e);
    }
}
