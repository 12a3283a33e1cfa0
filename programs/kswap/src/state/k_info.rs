use anchor_lang::prelude::*;

use crate::constants::*;
use crate::math::FixedPoint128;

/// Cached K for one token
/// PDA Seeds: ["k_info", token]
#[account]
#[derive(InitSpace, Default, Debug)]
pub struct KInfo {
    /// Bump seed for PDA
    pub bump: u8,

    /// Token the K applies to
    pub token: Pubkey,

    /// Last K (64.64), always inside the controller's bounds
    pub k: i128,

    /// Timestamp of the last lookup, never decreases
    pub updated_at: i64,

    /// Trading fee, in `THETA_BASE` units
    pub theta: u32,

    pub last_t_index: u8,
    pub last_sigma_index: u8,

    /// Slot of the oracle sample the cached K was looked up for
    pub last_price_slot: u64,
}

impl KInfo {
    /// Fill a freshly created record. A no-op for an existing one.
    pub fn init_if_new(&mut self, token: Pubkey, bump: u8) {
        if self.token == Pubkey::default() {
            self.token = token;
            self.bump = bump;
            self.theta = DEFAULT_THETA;
        }
    }

    pub fn k(&self) -> FixedPoint128 {
        FixedPoint128::from_raw(self.k)
    }

    /// Whether the cached K can be served at `now` without a new table lookup
    pub fn is_fresh(&self, now: i64, refresh_interval: i64) -> bool {
        self.updated_at > 0 && now.saturating_sub(self.updated_at) < refresh_interval
    }

    /// Whether the cached K was looked up for this exact sample and table cell
    pub fn caches(&self, price_slot: u64, t_index: u8, sigma_index: u8) -> bool {
        self.last_price_slot == price_slot
            && self.last_t_index == t_index
            && self.last_sigma_index == sigma_index
    }

    pub fn store(
        &mut self,
        k: FixedPoint128,
        now: i64,
        price_slot: u64,
        t_index: u8,
        sigma_index: u8,
    ) {
        self.k = k.raw();
        self.updated_at = self.updated_at.max(now);
        self.last_price_slot = price_slot;
        self.last_t_index = t_index;
        self.last_sigma_index = sigma_index;
    }

    pub fn view(&self) -> KInfoView {
        KInfoView {
            k: self.k,
            updated_at: self.updated_at,
            theta: self.theta,
        }
    }
}

/// Read-only projection returned by `get_k_info`
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KInfoView {
    pub k: i128,
    pub updated_at: i64,
    pub theta: u32,
}
