use anchor_lang::prelude::*;
use anchor_spl::token::{self, Burn, Mint, Token, TokenAccount, Transfer};

use crate::constants::*;
use crate::errors::KswapError;
use crate::events::LiquidityRemoved;
use crate::instructions::query_oracle::*;
use crate::math::impact_cost::to_volume;
use crate::math::{to_u64, QueryHint, QueryOp};
use crate::state::Pool;

#[derive(Accounts)]
pub struct RemoveLiquidity<'info> {
    /// K query accounts; `oracle.payer` is the liquidity provider
    pub oracle: OracleQuery<'info>,

    /// Pool state
    #[account(
        mut,
        seeds = [POOL_SEED, pool.token0_mint.as_ref(), pool.token1_mint.as_ref()],
        bump = pool.bump
    )]
    pub pool: Box<Account<'info, Pool>>,

    /// Token0 vault
    #[account(
        mut,
        seeds = [VAULT_0_SEED, pool.key().as_ref()],
        bump,
        constraint = token0_vault.key() == pool.token0_vault @ KswapError::InvalidVault
    )]
    pub token0_vault: Box<Account<'info, TokenAccount>>,

    /// Token1 vault
    #[account(
        mut,
        seeds = [VAULT_1_SEED, pool.key().as_ref()],
        bump,
        constraint = token1_vault.key() == pool.token1_vault @ KswapError::InvalidVault
    )]
    pub token1_vault: Box<Account<'info, TokenAccount>>,

    /// LP mint
    #[account(
        mut,
        seeds = [LP_MINT_SEED, pool.key().as_ref()],
        bump,
        constraint = lp_mint.key() == pool.lp_mint @ KswapError::InvalidVault
    )]
    pub lp_mint: Box<Account<'info, Mint>>,

    /// User's token0 account
    #[account(
        mut,
        constraint = user_token0.mint == pool.token0_mint @ KswapError::InvalidTokenMint
    )]
    pub user_token0: Box<Account<'info, TokenAccount>>,

    /// User's token1 account
    #[account(
        mut,
        constraint = user_token1.mint == pool.token1_mint @ KswapError::InvalidTokenMint
    )]
    pub user_token1: Box<Account<'info, TokenAccount>>,

    /// User's LP token account
    #[account(
        mut,
        constraint = user_lp_token.mint == pool.lp_mint @ KswapError::InvalidTokenMint
    )]
    pub user_lp_token: Box<Account<'info, TokenAccount>>,

    pub token_program: Program<'info, Token>,
}

pub fn handler(
    ctx: Context<RemoveLiquidity>,
    liquidity_amount: u64,
    min_amount0: u64,
    min_amount1: u64,
    max_fee: u64,
) -> Result<()> {
    require!(liquidity_amount > 0, KswapError::AmountTooSmall);
    require!(ctx.accounts.pool.is_initialized(), KswapError::PoolNotInitialized);
    require_keys_eq!(
        ctx.accounts.oracle.price_feed.token,
        ctx.accounts.pool.token1_mint,
        KswapError::InvalidPriceFeed
    );

    let lp_supply = ctx.accounts.lp_mint.supply;
    require!(
        liquidity_amount <= lp_supply,
        KswapError::InsufficientLiquidityBurned
    );

    // Impact cost is sized on the pro-rata token0 share being withdrawn
    let token0_share = ctx.accounts.pool.token0_share(lp_supply, liquidity_amount)?;
    let hint = QueryHint {
        op: QueryOp::Burn,
        volume: to_volume(token0_share, ctx.accounts.pool.token0_decimals)?,
    };

    let pool_key = ctx.accounts.pool.key();
    let user = ctx.accounts.oracle.payer.key();
    let bump = ctx.bumps.oracle.k_info;
    let quote = ctx
        .accounts
        .oracle
        .query(&pool_key, user, &hint, max_fee, bump)?;
    let op = quote.price_view()?;

    let (burn, nav_per_share) = ctx
        .accounts
        .pool
        .quote_burn(lp_supply, liquidity_amount, &op)?;
    let amount0 = to_u64(burn.amount0)?;
    let amount1 = to_u64(burn.amount1)?;
    let fee = to_u64(burn.fee)?;

    require!(amount0 > 0 || amount1 > 0, KswapError::InsufficientLiquidityBurned);

    // Slippage check
    require!(amount0 >= min_amount0, KswapError::SlippageExceeded);
    require!(amount1 >= min_amount1, KswapError::SlippageExceeded);

    // Burn LP tokens from user
    token::burn(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Burn {
                mint: ctx.accounts.lp_mint.to_account_info(),
                from: ctx.accounts.user_lp_token.to_account_info(),
                authority: ctx.accounts.oracle.payer.to_account_info(),
            },
        ),
        liquidity_amount,
    )?;

    let token0_mint = ctx.accounts.pool.token0_mint;
    let token1_mint = ctx.accounts.pool.token1_mint;
    let pool_bump = ctx.accounts.pool.bump;

    let seeds = &[
        POOL_SEED,
        token0_mint.as_ref(),
        token1_mint.as_ref(),
        &[pool_bump],
    ];
    let signer_seeds = &[&seeds[..]];

    // Transfer token0 from vault to user
    if amount0 > 0 {
        token::transfer(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.token0_vault.to_account_info(),
                    to: ctx.accounts.user_token0.to_account_info(),
                    authority: ctx.accounts.pool.to_account_info(),
                },
                signer_seeds,
            ),
            amount0,
        )?;
    }

    // Transfer token1 from vault to user
    if amount1 > 0 {
        token::transfer(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.token1_vault.to_account_info(),
                    to: ctx.accounts.user_token1.to_account_info(),
                    authority: ctx.accounts.pool.to_account_info(),
                },
                signer_seeds,
            ),
            amount1,
        )?;
    }

    // Update pool reserves
    let clock = Clock::get()?;
    let pool = &mut ctx.accounts.pool;
    pool.reserve0 = pool.reserve0.checked_sub(amount0).ok_or(KswapError::MathOverflow)?;
    pool.reserve1 = pool.reserve1.checked_sub(amount1).ok_or(KswapError::MathOverflow)?;
    pool.last_update_slot = clock.slot;

    emit!(LiquidityRemoved {
        pool: pool_key,
        user,
        liquidity_burned: liquidity_amount,
        amount0,
        amount1,
        fee,
        nav_per_share,
        reserve0: pool.reserve0,
        reserve1: pool.reserve1,
        timestamp: clock.unix_timestamp,
    });

    msg!(
        "Removed liquidity: burned {} LP, got {} token0, {} token1",
        liquidity_amount,
        amount0,
        amount1
    );

    Ok(())
}
