use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::state::{CallerRecord, Controller, Pool};
use crate::constants::*;
use crate::errors::KswapError;
use crate::events::{CallerAdded, PoolCreated};

#[derive(Accounts)]
pub struct InitializePool<'info> {
    /// Governance key acting as the pool factory
    #[account(mut)]
    pub authority: Signer<'info>,

    #[account(
        seeds = [CONTROLLER_SEED],
        bump = controller.bump
    )]
    pub controller: Box<Account<'info, Controller>>,

    /// Token0 mint, the base asset
    pub token0_mint: Box<Account<'info, Mint>>,

    /// Token1 mint, the oracle-priced token
    pub token1_mint: Box<Account<'info, Mint>>,

    /// Pool state account
    #[account(
        init,
        payer = authority,
        space = 8 + Pool::INIT_SPACE,
        seeds = [POOL_SEED, token0_mint.key().as_ref(), token1_mint.key().as_ref()],
        bump
    )]
    pub pool: Box<Account<'info, Pool>>,

    /// Token0 vault
    #[account(
        init,
        payer = authority,
        seeds = [VAULT_0_SEED, pool.key().as_ref()],
        bump,
        token::mint = token0_mint,
        token::authority = pool
    )]
    pub token0_vault: Box<Account<'info, TokenAccount>>,

    /// Token1 vault
    #[account(
        init,
        payer = authority,
        seeds = [VAULT_1_SEED, pool.key().as_ref()],
        bump,
        token::mint = token1_mint,
        token::authority = pool
    )]
    pub token1_vault: Box<Account<'info, TokenAccount>>,

    /// LP token mint, shares are denominated like token0
    #[account(
        init,
        payer = authority,
        seeds = [LP_MINT_SEED, pool.key().as_ref()],
        bump,
        mint::decimals = token0_mint.decimals,
        mint::authority = lp_mint_authority
    )]
    pub lp_mint: Box<Account<'info, Mint>>,

    /// LP mint authority PDA
    /// CHECK: PDA used as mint authority
    #[account(
        seeds = [LP_MINT_AUTHORITY_SEED, pool.key().as_ref()],
        bump
    )]
    pub lp_mint_authority: UncheckedAccount<'info>,

    /// Allow-list entry so the pool may query the K engine
    #[account(
        init,
        payer = authority,
        space = 8 + CallerRecord::INIT_SPACE,
        seeds = [CALLER_SEED, pool.key().as_ref()],
        bump
    )]
    pub caller_record: Account<'info, CallerRecord>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}

pub fn handler(ctx: Context<InitializePool>) -> Result<()> {
    require_keys_eq!(
        ctx.accounts.authority.key(),
        ctx.accounts.controller.config.governance,
        KswapError::OnlyFactory
    );

    // Validate token mints are different
    require!(
        ctx.accounts.token0_mint.key() != ctx.accounts.token1_mint.key(),
        KswapError::IdenticalTokenMints
    );
    require!(
        ctx.accounts.token0_mint.decimals <= VOLUME_DECIMALS,
        KswapError::UnsupportedDecimals
    );

    let clock = Clock::get()?;
    let pool_key = ctx.accounts.pool.key();
    let pool = &mut ctx.accounts.pool;

    pool.version = PROTOCOL_VERSION;
    pool.bump = ctx.bumps.pool;
    pool.lp_mint_authority_bump = ctx.bumps.lp_mint_authority;

    pool.token0_mint = ctx.accounts.token0_mint.key();
    pool.token1_mint = ctx.accounts.token1_mint.key();
    pool.token0_vault = ctx.accounts.token0_vault.key();
    pool.token1_vault = ctx.accounts.token1_vault.key();
    pool.lp_mint = ctx.accounts.lp_mint.key();
    pool.token0_decimals = ctx.accounts.token0_mint.decimals;

    pool.reserve0 = 0;
    pool.reserve1 = 0;

    pool.total_swaps = 0;
    pool.cumulative_volume0 = 0;
    pool.cumulative_volume1 = 0;
    pool.cumulative_fees0 = 0;

    pool.created_at = clock.unix_timestamp;
    pool.last_swap_timestamp = 0;
    pool.last_update_slot = clock.slot;

    let record = &mut ctx.accounts.caller_record;
    record.caller = pool_key;
    record.allowed = true;
    record.bump = ctx.bumps.caller_record;

    emit!(PoolCreated {
        pool: pool_key,
        token0_mint: pool.token0_mint,
        token1_mint: pool.token1_mint,
        timestamp: clock.unix_timestamp,
    });
    emit!(CallerAdded { caller: pool_key });

    msg!("Pool initialized: {}", pool_key);

    Ok(())
}
