use anchor_lang::prelude::*;
use anchor_spl::token::{self, Mint, MintTo, Token, TokenAccount, Transfer};

use crate::constants::*;
use crate::errors::KswapError;
use crate::events::LiquidityAdded;
use crate::instructions::query_oracle::*;
use crate::math::QueryHint;
use crate::state::Pool;

#[derive(Accounts)]
pub struct AddLiquidity<'info> {
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

    /// LP mint authority
    /// CHECK: PDA used as mint authority
    #[account(
        seeds = [LP_MINT_AUTHORITY_SEED, pool.key().as_ref()],
        bump = pool.lp_mint_authority_bump
    )]
    pub lp_mint_authority: UncheckedAccount<'info>,

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
    ctx: Context<AddLiquidity>,
    amount0: u64,
    amount1: u64,
    min_liquidity: u64,
    max_fee: u64,
) -> Result<()> {
    require!(amount0 > 0 || amount1 > 0, KswapError::AmountTooSmall);
    require_keys_eq!(
        ctx.accounts.oracle.price_feed.token,
        ctx.accounts.pool.token1_mint,
        KswapError::InvalidPriceFeed
    );

    let pool_key = ctx.accounts.pool.key();
    let user = ctx.accounts.oracle.payer.key();
    let bump = ctx.bumps.oracle.k_info;
    let quote = ctx
        .accounts
        .oracle
        .query(&pool_key, user, &QueryHint::mint(), max_fee, bump)?;
    let op = quote.price_view()?;

    let lp_supply = ctx.accounts.lp_mint.supply;
    let (liquidity, nav_per_share) = ctx
        .accounts
        .pool
        .shares_for_deposit(lp_supply, amount0, amount1, &op)?;

    require!(liquidity > 0, KswapError::InsufficientLiquidityMinted);
    require!(liquidity >= min_liquidity, KswapError::SlippageExceeded);

    // Transfer token0 from user to vault
    if amount0 > 0 {
        token::transfer(
            CpiContext::new(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.user_token0.to_account_info(),
                    to: ctx.accounts.token0_vault.to_account_info(),
                    authority: ctx.accounts.oracle.payer.to_account_info(),
                },
            ),
            amount0,
        )?;
    }

    // Transfer token1 from user to vault
    if amount1 > 0 {
        token::transfer(
            CpiContext::new(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.user_token1.to_account_info(),
                    to: ctx.accounts.token1_vault.to_account_info(),
                    authority: ctx.accounts.oracle.payer.to_account_info(),
                },
            ),
            amount1,
        )?;
    }

    // Mint LP tokens to user
    let seeds = &[
        LP_MINT_AUTHORITY_SEED,
        pool_key.as_ref(),
        &[ctx.accounts.pool.lp_mint_authority_bump],
    ];
    let signer_seeds = &[&seeds[..]];

    token::mint_to(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            MintTo {
                mint: ctx.accounts.lp_mint.to_account_info(),
                to: ctx.accounts.user_lp_token.to_account_info(),
                authority: ctx.accounts.lp_mint_authority.to_account_info(),
            },
            signer_seeds,
        ),
        liquidity,
    )?;

    // Update pool reserves
    let clock = Clock::get()?;
    let pool = &mut ctx.accounts.pool;
    pool.reserve0 = pool.reserve0.checked_add(amount0).ok_or(KswapError::MathOverflow)?;
    pool.reserve1 = pool.reserve1.checked_add(amount1).ok_or(KswapError::MathOverflow)?;
    pool.last_update_slot = clock.slot;

    emit!(LiquidityAdded {
        pool: pool_key,
        user,
        amount0,
        amount1,
        liquidity_minted: liquidity,
        nav_per_share,
        reserve0: pool.reserve0,
        reserve1: pool.reserve1,
        timestamp: clock.unix_timestamp,
    });

    msg!("Added liquidity: {} token0, {} token1, minted {} LP", amount0, amount1, liquidity);

    Ok(())
}
