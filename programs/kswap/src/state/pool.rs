use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::KswapError;
use crate::math::pricing::{
    calc_liquidity, calc_out_token_and_eth_for_burn, check_asset_ratio,
    get_nav_per_share_for_burn, get_nav_per_share_for_mint,
};
use crate::math::u256::{mul_div, Rounding};
use crate::math::{to_u64, BurnQuote, OraclePriceView};

/// Oracle-priced liquidity pool
/// PDA Seeds: ["pool", token0_mint, token1_mint]
#[account]
#[derive(InitSpace)]
pub struct Pool {
    /// Version for future upgrades
    pub version: u8,

    /// Bump seed for PDA
    pub bump: u8,

    /// LP mint authority bump
    pub lp_mint_authority_bump: u8,

    /// Token0 mint, the base asset the oracle quotes against
    pub token0_mint: Pubkey,

    /// Token1 mint, the priced token
    pub token1_mint: Pubkey,

    /// Token0 vault (PDA-owned)
    pub token0_vault: Pubkey,

    /// Token1 vault (PDA-owned)
    pub token1_vault: Pubkey,

    /// LP token mint (PDA)
    pub lp_mint: Pubkey,

    /// Decimals of token0, used to scale impact cost volumes
    pub token0_decimals: u8,

    /// Reserve of token0
    pub reserve0: u64,

    /// Reserve of token1
    pub reserve1: u64,

    /// Total number of swaps
    pub total_swaps: u64,

    /// Cumulative volume in token0
    pub cumulative_volume0: u64,

    /// Cumulative volume in token1
    pub cumulative_volume1: u64,

    /// Cumulative fees, valued in token0
    pub cumulative_fees0: u64,

    /// Pool creation timestamp
    pub created_at: i64,

    /// Last swap timestamp
    pub last_swap_timestamp: i64,

    /// Last update slot
    pub last_update_slot: u64,

    /// Shares of the first deposit that were never minted
    pub locked_liquidity: u64,

    /// Reserved for future upgrades (120 bytes)
    pub _reserved: [u8; 120],
}

impl Pool {
    /// Check if pool holds liquidity
    pub fn is_initialized(&self) -> bool {
        self.reserve0 > 0 || self.reserve1 > 0
    }

    /// Shares backing the reserves: circulating LP tokens plus the locked shares
    pub fn share_supply(&self, lp_supply: u64) -> u128 {
        lp_supply as u128 + self.locked_liquidity as u128
    }

    /// Shares to mint for a deposit, and the NAV per share it was priced at.
    ///
    /// The first deposit must match the oracle ratio and locks `MINIMUM_LIQUIDITY` of its
    /// shares in the pool.
    pub fn shares_for_deposit(
        &mut self,
        lp_supply: u64,
        amount0: u64,
        amount1: u64,
        op: &OraclePriceView,
    ) -> Result<(u64, u128)> {
        let (amount0, amount1) = (amount0 as u128, amount1 as u128);
        let supply = self.share_supply(lp_supply);

        if supply == 0 {
            require!(!self.is_initialized(), KswapError::OrphanedReserves);
            check_asset_ratio(amount0, amount1, op)?;
            let liquidity = calc_liquidity(amount0, amount1, NAVPS_BASE, op)?
                .checked_sub(MINIMUM_LIQUIDITY as u128)
                .ok_or(KswapError::InsufficientLiquidityMinted)?;
            self.locked_liquidity = MINIMUM_LIQUIDITY;
            return Ok((to_u64(liquidity)?, NAVPS_BASE));
        }

        let nav_per_share = get_nav_per_share_for_mint(
            self.reserve0 as u128,
            self.reserve1 as u128,
            supply,
            op,
        )?;
        let liquidity = calc_liquidity(amount0, amount1, nav_per_share, op)?;
        Ok((to_u64(liquidity)?, nav_per_share))
    }

    /// Pro-rata token0 share of `liquidity`, used to size the burn impact cost
    pub fn token0_share(&self, lp_supply: u64, liquidity: u64) -> Result<u128> {
        mul_div(
            &[liquidity as u128, self.reserve0 as u128],
            &[self.share_supply(lp_supply)],
            Rounding::Down,
        )
    }

    /// Amounts paid for burning `liquidity` LP tokens, and the NAV per share used
    pub fn quote_burn(
        &self,
        lp_supply: u64,
        liquidity: u64,
        op: &OraclePriceView,
    ) -> Result<(BurnQuote, u128)> {
        require!(
            liquidity > 0 && liquidity <= lp_supply,
            KswapError::InsufficientLiquidityBurned
        );
        let (reserve0, reserve1) = (self.reserve0 as u128, self.reserve1 as u128);
        let nav_per_share =
            get_nav_per_share_for_burn(reserve0, reserve1, self.share_supply(lp_supply), op)?;
        let quote = calc_out_token_and_eth_for_burn(
            liquidity as u128,
            nav_per_share,
            reserve0,
            reserve1,
            op,
        )?;
        Ok((quote, nav_per_share))
    }

    /// Update reserves
    pub fn update_reserves(&mut self, new_reserve0: u64, new_reserve1: u64) {
        self.reserve0 = new_reserve0;
        self.reserve1 = new_reserve1;
    }

    /// Record swap statistics
    pub fn record_swap(
        &mut self,
        volume0: u64,
        volume1: u64,
        fee0: u64,
        timestamp: i64,
        slot: u64,
    ) {
        self.total_swaps = self.total_swaps.saturating_add(1);
        self.cumulative_volume0 = self.cumulative_volume0.saturating_add(volume0);
        self.cumulative_volume1 = self.cumulative_volume1.saturating_add(volume1);
        self.cumulative_fees0 = self.cumulative_fees0.saturating_add(fee0);
        self.last_swap_timestamp = timestamp;
        self.last_update_slot = slot;
    }
}
