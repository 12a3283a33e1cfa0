//! K engine: turns an oracle sample into a K coefficient.
//!
//! Elapsed time since the sample and the sample's volatility select a cell of the K table.
//! The result is cached per token in [`KInfo`] and reused for `k_refresh_interval` seconds
//! while the sample and the table cell stay the same. Staleness and the K bounds are checked
//! on every query, so neither a stale price nor an out-of-bounds K is ever served.

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::KswapError;
use crate::math::impact_cost::impact_cost_for;
use crate::math::u256::{mul_div, Rounding};
use crate::math::{FixedPoint128, OraclePriceView, QueryHint};
use crate::oracle::PriceOracle;
use crate::state::{Controller, KInfo, KTable};

/// Result of a K query, returned to the caller
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct KQuote {
    /// K (64.64)
    pub k: i128,
    /// Impact cost for the hinted trade (64.64, never negative)
    pub impact_cost: i128,
    pub theta: u32,
    pub eth_amount: u128,
    pub erc20_amount: u128,
    pub price_slot: u64,
    pub t_index: u8,
    pub sigma_index: u8,
    /// True when K came from a new table lookup instead of the cache
    pub refreshed: bool,
}

impl KQuote {
    /// Replace the impact cost with the one for `hint`
    pub fn with_hint(mut self, hint: &QueryHint) -> Result<Self> {
        self.impact_cost = impact_cost_for(hint)?.raw();
        Ok(self)
    }

    /// Token0 value of a token1 amount at the raw oracle price, rounded down
    pub fn token0_equivalent(&self, amount1: u128) -> Result<u128> {
        mul_div(&[amount1, self.eth_amount], &[self.erc20_amount], Rounding::Down)
    }

    pub fn price_view(&self) -> Result<OraclePriceView> {
        OraclePriceView::new(
            self.eth_amount,
            self.erc20_amount,
            self.price_slot,
            FixedPoint128::from_raw(self.k),
            FixedPoint128::from_raw(self.impact_cost),
            self.theta,
        )
    }
}

/// Elapsed-time bucket: `(slots * timespan / 1000 + 5) / 10`, rejecting anything past the
/// last bucket.
pub fn t_index(elapsed_slots: u64, timespan: u64) -> Result<u8> {
    let elapsed_ms = (elapsed_slots as u128)
        .checked_mul(timespan as u128)
        .ok_or(KswapError::MathOverflow)?;
    let elapsed_secs = elapsed_ms / TIMESPAN_BASE as u128;
    let bucket = (elapsed_secs + (T_BUCKET_SECONDS / 2) as u128) / T_BUCKET_SECONDS as u128;
    require!(bucket < T_BUCKETS as u128, KswapError::PriceTooStale);
    Ok(bucket as u8)
}

/// Volatility bucket: `round(sqrt(|sigma_sq|) / 0.0005)`, minus one when positive,
/// clamped to the last bucket.
pub fn sigma_index(sigma_sq: FixedPoint128) -> Result<u8> {
    let sigma = sigma_sq.abs()?.sqrt()?;
    let steps = sigma
        .checked_div(FixedPoint128::from_raw(SIGMA_STEP))?
        .checked_add(FixedPoint128::from_raw(ZERO_POINT_FIVE))?
        .to_u128_floor()?;
    let index = steps.saturating_sub(1).min(SIGMA_BUCKETS as u128 - 1);
    Ok(index as u8)
}

/// Query K for `token`.
///
/// Oracle errors are returned unchanged. On success the cache in `k_info` holds the K that
/// was served; on failure nothing is written.
#[allow(clippy::too_many_arguments)]
pub fn query_k(
    controller: &Controller,
    table: &KTable,
    k_info: &mut KInfo,
    oracle: &dyn PriceOracle,
    token: &Pubkey,
    hint: &QueryHint,
    current_slot: u64,
    now: i64,
) -> Result<KQuote> {
    controller.require_activated()?;
    let config = &controller.config;

    let sample = oracle.latest_sample(token, current_slot)?;
    let elapsed_slots = current_slot.saturating_sub(sample.slot);
    let t = t_index(elapsed_slots, config.timespan)?;
    let s = sigma_index(sample.sigma_sq)?;

    let cached =
        k_info.is_fresh(now, config.k_refresh_interval) && k_info.caches(sample.slot, t, s);
    let k = if cached {
        k_info.k()
    } else {
        table.slot(t, s)?.ok_or(KswapError::KUnavailable)?
    };
    config.check_k_bounds(k)?;
    let refreshed = !cached;

    let impact_cost = impact_cost_for(hint)?;

    if refreshed {
        k_info.store(k, now, sample.slot, t, s);
    }

    Ok(KQuote {
        k: k.raw(),
        impact_cost: impact_cost.raw(),
        theta: k_info.theta,
        eth_amount: sample.eth_amount,
        erc20_amount: sample.erc20_amount,
        price_slot: sample.slot,
        t_index: t,
        sigma_index: s,
        refreshed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::OracleError;
    use crate::math::QueryOp;
    use crate::oracle::{ConstMockOracle, LegacyListOracle, PriceRecord};
    use crate::state::GovernanceConfig;

    fn err(e: KswapError) -> Error {
        e.into()
    }

    fn controller() -> Controller {
        let gov = Pubkey::new_unique();
        Controller {
            version: PROTOCOL_VERSION,
            bump: 255,
            config: GovernanceConfig::new(gov, Pubkey::new_unique(), Pubkey::new_unique()),
            activated: true,
            activated_at: 1,
            total_queries: 0,
            _reserved: [0; 64],
        }
    }

    fn table_with(cells: &[(u8, u8, i128)]) -> Box<KTable> {
        let mut table: Box<KTable> = Box::new(bytemuck::Zeroable::zeroed());
        for &(t, s, v) in cells {
            table.set_k0(t, s, FixedPoint128::from_raw(v)).unwrap();
        }
        table
    }

    fn full_table(value: i128) -> Box<KTable> {
        let mut cells = Vec::new();
        for t in 0..T_BUCKETS as u8 {
            for s in 0..SIGMA_BUCKETS as u8 {
                cells.push((t, s, value + t as i128 * 100 + s as i128));
            }
        }
        table_with(&cells)
    }

    fn mock(eth: u128, erc20: u128) -> ConstMockOracle {
        let mut oracle = ConstMockOracle::default();
        oracle.set(eth, erc20).unwrap();
        oracle
    }

    fn query(
        controller: &Controller,
        table: &KTable,
        info: &mut KInfo,
        oracle: &dyn PriceOracle,
        hint: &QueryHint,
        slot: u64,
        now: i64,
    ) -> Result<KQuote> {
        query_k(controller, table, info, oracle, &Pubkey::default(), hint, slot, now)
    }

    fn k_info() -> KInfo {
        let mut info = KInfo::default();
        info.init_if_new(Pubkey::default(), 255);
        info
    }

    #[test]
    fn test_t_index_buckets() {
        // 400ms slots
        assert_eq!(t_index(0, 400).unwrap(), 0);
        assert_eq!(t_index(12, 400).unwrap(), 0); // 4.8s -> 4s
        assert_eq!(t_index(13, 400).unwrap(), 1); // 5.2s -> 5s
        assert_eq!(t_index(2_262, 400).unwrap(), 90); // 904s
        assert_eq!(t_index(2_263, 400).unwrap_err(), err(KswapError::PriceTooStale)); // 905s
        assert_eq!(t_index(u64::MAX, 400).unwrap_err(), err(KswapError::PriceTooStale));
    }

    #[test]
    fn test_sigma_index_buckets() {
        let sq = |sigma: &str| {
            let s = FixedPoint128::from_decimal_str(sigma).unwrap();
            s.checked_mul(s).unwrap()
        };
        assert_eq!(sigma_index(FixedPoint128::ZERO).unwrap(), 0);
        assert_eq!(sigma_index(sq("0.0002")).unwrap(), 0);
        assert_eq!(sigma_index(sq("0.0005")).unwrap(), 0);
        assert_eq!(sigma_index(sq("0.0008")).unwrap(), 1);
        assert_eq!(sigma_index(sq("0.0021")).unwrap(), 3);
        assert_eq!(sigma_index(sq("0.5")).unwrap(), 19);
        // variance sign is ignored
        assert_eq!(
            sigma_index(sq("0.0021").checked_mul(FixedPoint128::from_int(-1)).unwrap()).unwrap(),
            3
        );
    }

    #[test]
    fn test_zero_cell_yields_zero_k() {
        let controller = controller();
        let table = table_with(&[(0, 0, 0)]);
        let mut info = k_info();
        let oracle = mock(10_000_000_000_000_000_000, 3_862_600_000);

        let quote = query_k(
            &controller,
            &table,
            &mut info,
            &oracle,
            &Pubkey::default(),
            &QueryHint::mint(),
            500,
            1_000,
        )
        .unwrap();
        assert_eq!(quote.k, 0);
        assert_eq!((quote.t_index, quote.sigma_index), (0, 0));
        assert!(quote.refreshed);
        assert_eq!(info.updated_at, 1_000);
        assert_eq!(quote.theta, DEFAULT_THETA);
    }

    #[test]
    fn test_unset_cell_is_unavailable() {
        let controller = controller();
        let table = table_with(&[(0, 1, 5)]);
        let mut info = k_info();
        let r = query_k(
            &controller,
            &table,
            &mut info,
            &mock(1, 1),
            &Pubkey::default(),
            &QueryHint::mint(),
            0,
            1_000,
        );
        assert_eq!(r.unwrap_err(), err(KswapError::KUnavailable));
        assert_eq!(info.updated_at, 0);
    }

    #[test]
    fn test_not_activated() {
        let mut controller = controller();
        controller.activated = false;
        let table = full_table(0);
        let r = query_k(
            &controller,
            &table,
            &mut k_info(),
            &mock(1, 1),
            &Pubkey::default(),
            &QueryHint::mint(),
            0,
            0,
        );
        assert_eq!(r.unwrap_err(), err(KswapError::NotActivated));
    }

    #[test]
    fn test_oracle_errors_pass_through() {
        let controller = controller();
        let table = full_table(0);
        let mut info = k_info();
        let r = query_k(
            &controller,
            &table,
            &mut info,
            &LegacyListOracle::default(),
            &Pubkey::default(),
            &QueryHint::mint(),
            0,
            0,
        );
        let e: Error = OracleError::NoPrice.into();
        assert_eq!(r.unwrap_err(), e);
    }

    #[test]
    fn test_staleness_is_monotonic() {
        let mut controller = controller();
        controller.config.k_refresh_interval = 0;
        let table = full_table(1_000);
        let mut info = k_info();
        let mut feed = LegacyListOracle::default();
        feed.push(PriceRecord::new(100, 100, 0).unwrap()).unwrap();

        let mut last_t = 0;
        let mut slot = 0;
        loop {
            let r = query_k(
                &controller,
                &table,
                &mut info,
                &feed,
                &Pubkey::default(),
                &QueryHint::mint(),
                slot,
                slot as i64,
            );
            match r {
                Ok(quote) => {
                    assert!(quote.t_index >= last_t);
                    assert!(quote.t_index <= 90);
                    assert_eq!(quote.k, 1_000 + quote.t_index as i128 * 100);
                    last_t = quote.t_index;
                }
                Err(e) => {
                    assert_eq!(e, err(KswapError::PriceTooStale));
                    break;
                }
            }
            slot += 50;
        }
        assert_eq!(last_t, 90);

        // a cached K is never served for a stale price
        controller.config.k_refresh_interval = i64::MAX;
        let r = query_k(
            &controller,
            &table,
            &mut info,
            &feed,
            &Pubkey::default(),
            &QueryHint::mint(),
            slot,
            slot as i64,
        );
        assert_eq!(r.unwrap_err(), err(KswapError::PriceTooStale));
    }

    fn single_price_feed(slot: u64) -> LegacyListOracle {
        let mut feed = LegacyListOracle::default();
        feed.push(PriceRecord::new(100, 100, slot).unwrap()).unwrap();
        feed
    }

    #[test]
    fn test_fresh_cache_is_reused() {
        let controller = controller();
        let table = full_table(1_000);
        let mut info = k_info();
        let feed = single_price_feed(0);
        let hint = QueryHint::mint();

        let first = query(&controller, &table, &mut info, &feed, &hint, 0, 1_000).unwrap();
        assert!(first.refreshed);

        // 10 slots is 4s, still bucket 0
        let cached = query(&controller, &table, &mut info, &feed, &hint, 10, 1_100).unwrap();
        assert!(!cached.refreshed);
        assert_eq!(cached.k, first.k);
        assert_eq!(info.updated_at, 1_000);

        let interval = controller.config.k_refresh_interval;
        let again = query_k(
            &controller,
            &table,
            &mut info,
            &feed,
            &Pubkey::default(),
            &hint,
            10,
            1_000 + interval,
        )
        .unwrap();
        assert!(again.refreshed);
        assert_eq!(info.updated_at, 1_000 + interval);
    }

    #[test]
    fn test_cache_follows_the_time_bucket() {
        let controller = controller();
        let table = full_table(1_000);
        let mut info = k_info();
        let feed = single_price_feed(0);
        let hint = QueryHint::mint();

        let first = query(&controller, &table, &mut info, &feed, &hint, 0, 1_000).unwrap();
        assert_eq!(first.t_index, 0);

        // 700 slots is 280s, inside the refresh interval but bucket 28
        let later = query(&controller, &table, &mut info, &feed, &hint, 700, 1_280).unwrap();
        assert!(later.refreshed);
        assert_eq!(later.t_index, 28);
        assert_eq!(later.k, 1_000 + 28 * 100);
        assert_eq!(info.last_t_index, 28);
    }

    #[test]
    fn test_cache_follows_a_new_sample() {
        let controller = controller();
        let table = full_table(1_000);
        let mut info = k_info();
        let mut feed = single_price_feed(0);
        let hint = QueryHint::mint();

        query(&controller, &table, &mut info, &feed, &hint, 0, 1_000).unwrap();

        // a 10% move one slot later lands in the top volatility bucket
        feed.push(PriceRecord::new(100, 110, 1).unwrap()).unwrap();
        let quote = query(&controller, &table, &mut info, &feed, &hint, 1, 1_001).unwrap();
        assert!(quote.refreshed);
        assert_eq!(quote.sigma_index, 19);
        assert_eq!(quote.price_slot, 1);
        assert_eq!(quote.k, 1_000 + 19);
    }

    #[test]
    fn test_cached_k_is_bounds_checked() {
        let mut controller = controller();
        let gov = controller.config.governance;
        let table = full_table(1_000);
        let mut info = k_info();
        let feed = single_price_feed(0);
        let hint = QueryHint::mint();

        query(&controller, &table, &mut info, &feed, &hint, 0, 1_000).unwrap();

        controller.config.set_k_bounds(&gov, 0, 500).unwrap();
        let r = query(&controller, &table, &mut info, &feed, &hint, 0, 1_001);
        assert_eq!(r.unwrap_err(), err(KswapError::KOutOfBounds));
    }

    #[test]
    fn test_out_of_bounds_k_is_rejected() {
        let gov_controller = controller();
        let gov = gov_controller.config.governance;
        let mut controller = gov_controller;
        controller.config.set_k_bounds(&gov, 0, 500).unwrap();

        let table = table_with(&[(0, 0, 501)]);
        let mut info = k_info();
        let r = query_k(
            &controller,
            &table,
            &mut info,
            &mock(1, 1),
            &Pubkey::default(),
            &QueryHint::mint(),
            0,
            1,
        );
        assert_eq!(r.unwrap_err(), err(KswapError::KOutOfBounds));
        assert_eq!(info.k, 0);
        assert_eq!(info.updated_at, 0);
    }

    #[test]
    fn test_impact_cost_follows_hint() {
        let controller = controller();
        let table = full_table(0);
        let mut info = k_info();
        let hint = QueryHint {
            op: QueryOp::SwapBuyIn,
            volume: 1_000 * VOLUME_UNIT,
        };
        let quote = query(&controller, &table, &mut info, &mock(1, 1), &hint, 0, 1).unwrap();
        assert!(quote.impact_cost > 0);

        let view = quote.price_view().unwrap();
        let expected = FixedPoint128::from_raw(quote.impact_cost)
            .mul_u128(K_BASE, Rounding::Up)
            .unwrap();
        assert_eq!(view.k, expected);
    }

    #[test]
    fn test_rehinting_a_quote() {
        let controller = controller();
        let table = full_table(0);
        let mut info = k_info();
        let oracle = mock(10_000_000_000_000_000_000, 3_862_600_000);
        let sell = QueryHint {
            op: QueryOp::SwapSellOut,
            volume: 0,
        };
        let quote = query(&controller, &table, &mut info, &oracle, &sell, 0, 1).unwrap();
        assert_eq!(quote.impact_cost, 0);

        // a thousand times the quoted token1 amount is worth a thousand times eth_amount
        let volume = quote.token0_equivalent(3_862_600_000_000).unwrap();
        assert_eq!(volume, 10_000_000_000_000_000_000_000);

        let large = quote
            .with_hint(&QueryHint {
                op: QueryOp::SwapSellOut,
                volume: 1_000 * VOLUME_UNIT,
            })
            .unwrap();
        assert!(large.impact_cost > 0);
        assert_eq!(large.k, quote.k);
    }
}
