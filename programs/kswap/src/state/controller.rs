use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::KswapError;
use crate::math::FixedPoint128;
use crate::state::KInfo;

/// Governance-tunable parameters of the K engine.
///
/// Every mutator takes the key of the caller and fails with its own error when the
/// caller is not the governance key.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq, InitSpace)]
pub struct GovernanceConfig {
    pub governance: Pubkey,

    /// K table account consulted by queries
    pub k_table: Pubkey,

    /// Receiver of the activation payment
    pub oracle_fee_collector: Pubkey,

    /// Milliseconds per slot, used to turn elapsed slots into seconds
    pub timespan: u64,

    /// Seconds a cached K stays usable without a new lookup
    pub k_refresh_interval: i64,

    /// Lower bound of accepted K (64.64)
    pub min_k: i128,

    /// Upper bound of accepted K (64.64)
    pub max_k: i128,

    /// Lamports paid to the oracle on activation
    pub destruction_amount: u64,
}

impl GovernanceConfig {
    pub fn new(governance: Pubkey, k_table: Pubkey, oracle_fee_collector: Pubkey) -> Self {
        Self {
            governance,
            k_table,
            oracle_fee_collector,
            timespan: DEFAULT_TIMESPAN,
            k_refresh_interval: DEFAULT_K_REFRESH_INTERVAL,
            min_k: 0,
            max_k: MAX_K0,
            destruction_amount: 0,
        }
    }

    pub fn authorize(&self, caller: &Pubkey, error: KswapError) -> Result<()> {
        if *caller != self.governance {
            return Err(error.into());
        }
        Ok(())
    }

    pub fn set_governance(&mut self, caller: &Pubkey, new_governance: Pubkey) -> Result<()> {
        self.authorize(caller, KswapError::NotGovernanceTransfer)?;
        self.governance = new_governance;
        Ok(())
    }

    pub fn set_theta(&self, caller: &Pubkey, k_info: &mut KInfo, theta: u32) -> Result<()> {
        self.authorize(caller, KswapError::NotGovernanceTheta)?;
        require!(validate_theta(theta), KswapError::InvalidTheta);
        k_info.theta = theta;
        Ok(())
    }

    pub fn set_timespan(&mut self, caller: &Pubkey, timespan: u64) -> Result<()> {
        self.authorize(caller, KswapError::NotGovernanceTimespan)?;
        require!(timespan > 0, KswapError::InvalidTimespan);
        self.timespan = timespan;
        Ok(())
    }

    pub fn set_k_refresh_interval(&mut self, caller: &Pubkey, interval: i64) -> Result<()> {
        self.authorize(caller, KswapError::NotGovernanceRefreshInterval)?;
        require!(interval >= 0, KswapError::InvalidTimespan);
        self.k_refresh_interval = interval;
        Ok(())
    }

    pub fn set_k_bounds(&mut self, caller: &Pubkey, min_k: i128, max_k: i128) -> Result<()> {
        self.authorize(caller, KswapError::NotGovernanceKBounds)?;
        require!(0 <= min_k && min_k <= max_k, KswapError::InvalidKBounds);
        // K_BASE units must stay below 1.0 once converted
        require!(max_k < FixedPoint128::ONE.raw(), KswapError::InvalidKBounds);
        self.min_k = min_k;
        self.max_k = max_k;
        Ok(())
    }

    pub fn set_destruction_amount(&mut self, caller: &Pubkey, amount: u64) -> Result<()> {
        self.authorize(caller, KswapError::NotGovernanceDestructionAmount)?;
        self.destruction_amount = amount;
        Ok(())
    }

    pub fn set_k_table(&mut self, caller: &Pubkey, k_table: Pubkey) -> Result<()> {
        self.authorize(caller, KswapError::NotGovernanceKTable)?;
        self.k_table = k_table;
        Ok(())
    }

    pub fn set_oracle_fee_collector(&mut self, caller: &Pubkey, collector: Pubkey) -> Result<()> {
        self.authorize(caller, KswapError::NotGovernanceFeeCollector)?;
        self.oracle_fee_collector = collector;
        Ok(())
    }

    /// Reject a K outside `[min_k, max_k]`. No clamping.
    pub fn check_k_bounds(&self, k: FixedPoint128) -> Result<()> {
        require!(
            self.min_k <= k.raw() && k.raw() <= self.max_k,
            KswapError::KOutOfBounds
        );
        Ok(())
    }
}

/// K engine state
/// PDA Seeds: ["controller"]
#[account]
#[derive(InitSpace)]
pub struct Controller {
    /// Version for future upgrades
    pub version: u8,

    /// Bump seed for PDA
    pub bump: u8,

    pub config: GovernanceConfig,

    /// Set once the activation payment went through
    pub activated: bool,

    /// Activation timestamp
    pub activated_at: i64,

    /// Number of K lookups served
    pub total_queries: u64,

    /// Reserved for future upgrades
    pub _reserved: [u8; 64],
}

impl Controller {
    pub fn require_activated(&self) -> Result<()> {
        require!(self.activated, KswapError::NotActivated);
        Ok(())
    }

    /// Mark the controller activated. Returns false if it already was.
    pub fn activate(&mut self, caller: &Pubkey, timestamp: i64) -> Result<bool> {
        self.config
            .authorize(caller, KswapError::NotGovernanceActivate)?;
        if self.activated {
            return Ok(false);
        }
        self.activated = true;
        self.activated_at = timestamp;
        Ok(true)
    }
}
