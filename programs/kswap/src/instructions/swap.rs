use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::constants::*;
use crate::errors::KswapError;
use crate::events::SwapExecuted;
use crate::instructions::query_oracle::*;
use crate::math::impact_cost::to_volume;
use crate::math::pricing::{
    calc_in_needed_token0, calc_in_needed_token1, calc_out_token0, calc_out_token1,
};
use crate::math::{to_u64, OraclePriceView, QueryHint, QueryOp};
use crate::state::Pool;

#[derive(Accounts)]
pub struct Swap<'info> {
    /// K query accounts; `oracle.payer` is the trader
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

    pub token_program: Program<'info, Token>,
}

/// The side of a trade whose size is known before pricing
enum KnownLeg {
    Token0(u128),
    Token1(u128),
}

impl<'info> Swap<'info> {
    /// Query K and fold in the impact cost of the trade's token0 leg.
    ///
    /// When only the token1 side is known its token0 value at the raw oracle price
    /// sizes the impact cost.
    fn price(
        &mut self,
        leg: KnownLeg,
        op: QueryOp,
        max_fee: u64,
        k_info_bump: u8,
    ) -> Result<OraclePriceView> {
        require!(self.pool.is_initialized(), KswapError::PoolNotInitialized);
        require_keys_eq!(
            self.oracle.price_feed.token,
            self.pool.token1_mint,
            KswapError::InvalidPriceFeed
        );

        let pool_key = self.pool.key();
        let user = self.oracle.payer.key();
        let decimals = self.pool.token0_decimals;

        let volume = match leg {
            KnownLeg::Token0(amount0) => to_volume(amount0, decimals)?,
            KnownLeg::Token1(_) => 0,
        };
        let mut quote = self.oracle.query(
            &pool_key,
            user,
            &QueryHint { op, volume },
            max_fee,
            k_info_bump,
        )?;

        if let KnownLeg::Token1(amount1) = leg {
            let volume = to_volume(quote.token0_equivalent(amount1)?, decimals)?;
            quote = quote.with_hint(&QueryHint { op, volume })?;
        }

        quote.price_view()
    }

    /// Move tokens and record the trade
    fn settle(
        &mut self,
        zero_for_one: bool,
        amount_in: u64,
        amount_out: u64,
        fee_amount: u64,
        k: u128,
    ) -> Result<()> {
        let (reserve_in, reserve_out) = if zero_for_one {
            (self.pool.reserve0, self.pool.reserve1)
        } else {
            (self.pool.reserve1, self.pool.reserve0)
        };
        require!(amount_out <= reserve_out, KswapError::InsufficientLiquidity);

        // Determine accounts based on direction
        let (user_in, user_out, vault_in, vault_out) = if zero_for_one {
            (
                self.user_token0.to_account_info(),
                self.user_token1.to_account_info(),
                self.token0_vault.to_account_info(),
                self.token1_vault.to_account_info(),
            )
        } else {
            (
                self.user_token1.to_account_info(),
                self.user_token0.to_account_info(),
                self.token1_vault.to_account_info(),
                self.token0_vault.to_account_info(),
            )
        };

        // Transfer input tokens from user to vault
        token::transfer(
            CpiContext::new(
                self.token_program.to_account_info(),
                Transfer {
                    from: user_in,
                    to: vault_in,
                    authority: self.oracle.payer.to_account_info(),
                },
            ),
            amount_in,
        )?;

        // Transfer output tokens from vault to user
        let token0_mint = self.pool.token0_mint;
        let token1_mint = self.pool.token1_mint;
        let bump = self.pool.bump;

        let seeds = &[
            POOL_SEED,
            token0_mint.as_ref(),
            token1_mint.as_ref(),
            &[bump],
        ];
        let signer_seeds = &[&seeds[..]];

        token::transfer(
            CpiContext::new_with_signer(
                self.token_program.to_account_info(),
                Transfer {
                    from: vault_out,
                    to: user_out,
                    authority: self.pool.to_account_info(),
                },
                signer_seeds,
            ),
            amount_out,
        )?;

        let new_reserve_in = reserve_in.checked_add(amount_in).ok_or(KswapError::MathOverflow)?;
        let new_reserve_out = reserve_out.checked_sub(amount_out).ok_or(KswapError::MathOverflow)?;

        let clock = Clock::get()?;
        let user = self.oracle.payer.key();
        let pool = &mut self.pool;

        let (volume0, volume1) = if zero_for_one {
            pool.update_reserves(new_reserve_in, new_reserve_out);
            (amount_in, amount_out)
        } else {
            pool.update_reserves(new_reserve_out, new_reserve_in);
            (amount_out, amount_in)
        };
        pool.record_swap(volume0, volume1, fee_amount, clock.unix_timestamp, clock.slot);

        let (token_in, token_out) = if zero_for_one {
            (pool.token0_mint, pool.token1_mint)
        } else {
            (pool.token1_mint, pool.token0_mint)
        };

        emit!(SwapExecuted {
            pool: pool.key(),
            user,
            token_in,
            token_out,
            amount_in,
            amount_out,
            fee_amount,
            k,
            reserve0: pool.reserve0,
            reserve1: pool.reserve1,
            timestamp: clock.unix_timestamp,
        });

        msg!("Swapped {} for {}, fee: {}", amount_in, amount_out, fee_amount);

        Ok(())
    }
}

/// Sell exactly `amount_in`. `zero_for_one` trades token0 for token1.
pub fn exact_in_handler(
    ctx: Context<Swap>,
    amount_in: u64,
    min_amount_out: u64,
    zero_for_one: bool,
    max_fee: u64,
) -> Result<()> {
    require!(amount_in >= MIN_SWAP_AMOUNT, KswapError::AmountTooSmall);

    let bump = ctx.bumps.oracle.k_info;
    let (leg, op) = if zero_for_one {
        (KnownLeg::Token0(amount_in as u128), QueryOp::SwapBuyIn)
    } else {
        (KnownLeg::Token1(amount_in as u128), QueryOp::SwapSellOut)
    };
    let view = ctx.accounts.price(leg, op, max_fee, bump)?;

    let (amount_out, fee) = if zero_for_one {
        calc_out_token1(amount_in as u128, &view)?
    } else {
        calc_out_token0(amount_in as u128, &view)?
    };
    let amount_out = to_u64(amount_out)?;
    let fee = to_u64(fee)?;

    require!(amount_out > 0, KswapError::AmountTooSmall);
    require!(amount_out >= min_amount_out, KswapError::SlippageExceeded);

    ctx.accounts.settle(zero_for_one, amount_in, amount_out, fee, view.k)
}

/// Buy exactly `amount_out`. `zero_for_one` trades token0 for token1.
pub fn exact_out_handler(
    ctx: Context<Swap>,
    amount_out: u64,
    max_amount_in: u64,
    zero_for_one: bool,
    max_fee: u64,
) -> Result<()> {
    require!(amount_out > 0, KswapError::AmountTooSmall);

    let bump = ctx.bumps.oracle.k_info;
    let (leg, op) = if zero_for_one {
        (KnownLeg::Token1(amount_out as u128), QueryOp::SwapBuyIn)
    } else {
        (KnownLeg::Token0(amount_out as u128), QueryOp::SwapSellOut)
    };
    let view = ctx.accounts.price(leg, op, max_fee, bump)?;

    let (amount_in, fee) = if zero_for_one {
        calc_in_needed_token0(amount_out as u128, &view)?
    } else {
        calc_in_needed_token1(amount_out as u128, &view)?
    };
    let amount_in = to_u64(amount_in)?;
    let fee = to_u64(fee)?;

    require!(amount_in >= MIN_SWAP_AMOUNT, KswapError::AmountTooSmall);
    require!(amount_in <= max_amount_in, KswapError::SlippageExceeded);

    ctx.accounts.settle(zero_for_one, amount_in, amount_out, fee, view.k)
}
