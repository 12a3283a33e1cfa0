use anchor_lang::prelude::*;

pub mod constants;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod k_engine;
pub mod math;
pub mod oracle;
pub mod state;

pub use instructions::*;
use k_engine::KQuote;
use math::QueryHint;
use state::{FeedKind, KInfoView};

declare_id!("71kECueXZuecQ7ngyxbThU22XyTM1jfk4SpGk7PSVbGY");

#[program]
pub mod kswap {
    use super::*;

    // ------------------------------------------------------------------
    // Controller
    // ------------------------------------------------------------------

    pub fn initialize_controller(
        ctx: Context<InitializeController>,
        k_table: Pubkey,
        oracle_fee_collector: Pubkey,
    ) -> Result<()> {
        instructions::initialize_controller::handler(ctx, k_table, oracle_fee_collector)
    }

    pub fn activate(ctx: Context<Activate>) -> Result<()> {
        instructions::activate::handler(ctx)
    }

    pub fn set_governance(ctx: Context<UpdateConfig>, new_governance: Pubkey) -> Result<()> {
        instructions::governance::set_governance(ctx, new_governance)
    }

    pub fn set_theta(ctx: Context<SetTheta>, token: Pubkey, theta: u32) -> Result<()> {
        instructions::governance::set_theta(ctx, token, theta)
    }

    pub fn set_timespan(ctx: Context<UpdateConfig>, timespan: u64) -> Result<()> {
        instructions::governance::set_timespan(ctx, timespan)
    }

    pub fn set_k_refresh_interval(ctx: Context<UpdateConfig>, interval: i64) -> Result<()> {
        instructions::governance::set_k_refresh_interval(ctx, interval)
    }

    pub fn set_k_bounds(ctx: Context<UpdateConfig>, min_k: i128, max_k: i128) -> Result<()> {
        instructions::governance::set_k_bounds(ctx, min_k, max_k)
    }

    pub fn set_destruction_amount(ctx: Context<UpdateConfig>, amount: u64) -> Result<()> {
        instructions::governance::set_destruction_amount(ctx, amount)
    }

    pub fn set_k_table(ctx: Context<UpdateConfig>, k_table: Pubkey) -> Result<()> {
        instructions::governance::set_k_table(ctx, k_table)
    }

    pub fn set_oracle_fee_collector(ctx: Context<UpdateConfig>, collector: Pubkey) -> Result<()> {
        instructions::governance::set_oracle_fee_collector(ctx, collector)
    }

    pub fn add_caller(ctx: Context<AddCaller>, caller: Pubkey) -> Result<()> {
        instructions::callers::add_caller(ctx, caller)
    }

    pub fn remove_caller(ctx: Context<RemoveCaller>) -> Result<()> {
        instructions::callers::remove_caller(ctx)
    }

    // ------------------------------------------------------------------
    // K table
    // ------------------------------------------------------------------

    pub fn initialize_k_table(ctx: Context<InitializeKTable>) -> Result<()> {
        instructions::k_table::initialize_k_table(ctx)
    }

    pub fn set_k0(ctx: Context<SetK0>, t_index: u8, sigma_index: u8, value: i128) -> Result<()> {
        instructions::k_table::set_k0(ctx, t_index, sigma_index, value)
    }

    pub fn set_k0_batch(
        ctx: Context<SetK0>,
        t_indexes: Vec<u8>,
        sigma_indexes: Vec<u8>,
        values: Vec<i128>,
    ) -> Result<()> {
        instructions::k_table::set_k0_batch(ctx, t_indexes, sigma_indexes, values)
    }

    pub fn get_k0(ctx: Context<GetK0>, t_index: u8, sigma_index: u8) -> Result<i128> {
        instructions::k_table::get_k0(ctx, t_index, sigma_index)
    }

    // ------------------------------------------------------------------
    // Oracle
    // ------------------------------------------------------------------

    pub fn initialize_price_feed(
        ctx: Context<InitializePriceFeed>,
        kind: FeedKind,
        feeder: Pubkey,
        fee_collector: Pubkey,
        query_fee: u64,
    ) -> Result<()> {
        instructions::price_feed::initialize_price_feed(ctx, kind, feeder, fee_collector, query_fee)
    }

    pub fn feed_price(ctx: Context<FeedPrice>, eth_amount: u128, erc20_amount: u128) -> Result<()> {
        instructions::price_feed::feed_price(ctx, eth_amount, erc20_amount)
    }

    pub fn query_oracle(
        ctx: Context<QueryOracle>,
        hint: QueryHint,
        account: Pubkey,
        max_fee: u64,
    ) -> Result<KQuote> {
        instructions::query_oracle::handler(ctx, hint, account, max_fee)
    }

    pub fn get_k_info(ctx: Context<GetKInfo>, token: Pubkey) -> Result<KInfoView> {
        instructions::query_oracle::get_k_info_handler(ctx, token)
    }

    // ------------------------------------------------------------------
    // Pool
    // ------------------------------------------------------------------

    pub fn initialize_pool(ctx: Context<InitializePool>) -> Result<()> {
        instructions::initialize_pool::handler(ctx)
    }

    pub fn add_liquidity(
        ctx: Context<AddLiquidity>,
        amount0: u64,
        amount1: u64,
        min_liquidity: u64,
        max_fee: u64,
    ) -> Result<()> {
        instructions::add_liquidity::handler(ctx, amount0, amount1, min_liquidity, max_fee)
    }

    pub fn remove_liquidity(
        ctx: Context<RemoveLiquidity>,
        liquidity_amount: u64,
        min_amount0: u64,
        min_amount1: u64,
        max_fee: u64,
    ) -> Result<()> {
        instructions::remove_liquidity::handler(
            ctx,
            liquidity_amount,
            min_amount0,
            min_amount1,
            max_fee,
        )
    }

    pub fn swap_exact_in(
        ctx: Context<Swap>,
        amount_in: u64,
        min_amount_out: u64,
        zero_for_one: bool,
        max_fee: u64,
    ) -> Result<()> {
        instructions::swap::exact_in_handler(ctx, amount_in, min_amount_out, zero_for_one, max_fee)
    }

    pub fn swap_exact_out(
        ctx: Context<Swap>,
        amount_out: u64,
        max_amount_in: u64,
        zero_for_one: bool,
        max_fee: u64,
    ) -> Result<()> {
        instructions::swap::exact_out_handler(ctx, amount_out, max_amount_in, zero_for_one, max_fee)
    }
}
