use anchor_lang::prelude::*;

/// Emitted when the controller is created
#[event]
pub struct ControllerInitialized {
    pub controller: Pubkey,
    pub governance: Pubkey,
    pub k_table: Pubkey,
    pub timestamp: i64,
}

/// Emitted when governance moves to a new key
#[event]
pub struct GovernanceChanged {
    pub old_governance: Pubkey,
    pub new_governance: Pubkey,
}

#[event]
pub struct ThetaChanged {
    pub token: Pubkey,
    pub old_theta: u32,
    pub new_theta: u32,
}

#[event]
pub struct TimespanChanged {
    pub old_timespan: u64,
    pub new_timespan: u64,
}

#[event]
pub struct KRefreshIntervalChanged {
    pub old_interval: i64,
    pub new_interval: i64,
}

#[event]
pub struct KBoundsChanged {
    pub min_k: i128,
    pub max_k: i128,
}

#[event]
pub struct DestructionAmountChanged {
    pub old_amount: u64,
    pub new_amount: u64,
}

#[event]
pub struct KTableChanged {
    pub old_k_table: Pubkey,
    pub new_k_table: Pubkey,
}

#[event]
pub struct FeeCollectorChanged {
    pub old_collector: Pubkey,
    pub new_collector: Pubkey,
}

#[event]
pub struct CallerAdded {
    pub caller: Pubkey,
}

#[event]
pub struct CallerRemoved {
    pub caller: Pubkey,
}

/// Emitted once when the activation payment is made
#[event]
pub struct Activated {
    pub governance: Pubkey,
    pub amount: u64,
    pub timestamp: i64,
}

/// Emitted for every K table cell written
#[event]
pub struct K0Set {
    pub k_table: Pubkey,
    pub t_index: u8,
    pub sigma_index: u8,
    pub value: i128,
}

/// Emitted when a K table is bound to the controller
#[event]
pub struct KTableInitialized {
    pub k_table: Pubkey,
    pub authority: Pubkey,
}

/// Emitted when a query looked K up from the table
#[event]
pub struct KRefreshed {
    pub token: Pubkey,
    /// Account the query was made for
    pub account: Pubkey,
    pub k: i128,
    pub t_index: u8,
    pub sigma_index: u8,
    pub price_slot: u64,
    pub timestamp: i64,
}

#[event]
pub struct PriceFeedCreated {
    pub price_feed: Pubkey,
    pub token: Pubkey,
    pub feeder: Pubkey,
    pub query_fee: u64,
}

#[event]
pub struct PriceFed {
    pub token: Pubkey,
    pub eth_amount: u128,
    pub erc20_amount: u128,
    pub slot: u64,
}

/// Emitted when a new pool is created
#[event]
pub struct PoolCreated {
    pub pool: Pubkey,
    pub token0_mint: Pubkey,
    pub token1_mint: Pubkey,
    pub timestamp: i64,
}

/// Emitted when liquidity is added
#[event]
pub struct LiquidityAdded {
    pub pool: Pubkey,
    pub user: Pubkey,
    pub amount0: u64,
    pub amount1: u64,
    pub liquidity_minted: u64,
    pub nav_per_share: u128,
    pub reserve0: u64,
    pub reserve1: u64,
    pub timestamp: i64,
}

/// Emitted when liquidity is removed
#[event]
pub struct LiquidityRemoved {
    pub pool: Pubkey,
    pub user: Pubkey,
    pub liquidity_burned: u64,
    pub amount0: u64,
    pub amount1: u64,
    pub fee: u64,
    pub nav_per_share: u128,
    pub reserve0: u64,
    pub reserve1: u64,
    pub timestamp: i64,
}

/// Emitted when a swap occurs
#[event]
pub struct SwapExecuted {
    pub pool: Pubkey,
    pub user: Pubkey,
    pub token_in: Pubkey,
    pub token_out: Pubkey,
    pub amount_in: u64,
    pub amount_out: u64,
    pub fee_amount: u64,
    pub k: u128,
    pub reserve0: u64,
    pub reserve1: u64,
    pub timestamp: i64,
}
