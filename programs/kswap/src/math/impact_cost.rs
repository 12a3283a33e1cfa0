use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::KswapError;
use crate::math::fixed_point::FixedPoint128;

/// Which side of the market a query trades on, used to pick the impact cost curve
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueryOp {
    /// Liquidity added; no impact cost
    Mint,
    /// Liquidity removed; the pool sells token0
    Burn,
    /// The pool receives token0
    SwapBuyIn,
    /// The pool pays out token0
    SwapSellOut,
}

/// Adjustment hint attached to a K query
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueryHint {
    pub op: QueryOp,
    /// Trade volume in token0, scaled to `VOLUME_DECIMALS`
    pub volume: u128,
}

impl QueryHint {
    pub fn mint() -> Self {
        Self { op: QueryOp::Mint, volume: 0 }
    }
}

/// Linear impact cost `alpha + beta * volume` above the threshold, zero below it.
fn linear_cost(volume: u128, alpha: i128, beta: i128) -> Result<FixedPoint128> {
    if volume < IMPACT_COST_THRESHOLD {
        return Ok(FixedPoint128::ZERO);
    }
    let volume_in_eth = FixedPoint128::from_ratio(volume, VOLUME_UNIT)?;
    FixedPoint128::from_raw(beta)
        .checked_mul(volume_in_eth)?
        .checked_add(FixedPoint128::from_raw(alpha))
}

/// Impact cost of a trade that pushes token0 into the pool
pub fn impact_cost_buy(volume: u128) -> Result<FixedPoint128> {
    linear_cost(volume, C_BUYIN_ALPHA, C_BUYIN_BETA)
}

/// Impact cost of a trade that takes token0 out of the pool
pub fn impact_cost_sell(volume: u128) -> Result<FixedPoint128> {
    linear_cost(volume, C_SELLOUT_ALPHA, C_SELLOUT_BETA)
}

/// Impact cost for a query hint. Negative costs never lower K.
pub fn impact_cost_for(hint: &QueryHint) -> Result<FixedPoint128> {
    let cost = match hint.op {
        QueryOp::Mint => FixedPoint128::ZERO,
        QueryOp::SwapBuyIn => impact_cost_buy(hint.volume)?,
        QueryOp::Burn | QueryOp::SwapSellOut => impact_cost_sell(hint.volume)?,
    };
    Ok(cost.max(FixedPoint128::ZERO))
}

/// Rescale a token0 amount to the volume unit of the impact cost model
pub fn to_volume(amount: u128, token0_decimals: u8) -> Result<u128> {
    require!(
        token0_decimals <= VOLUME_DECIMALS,
        KswapError::UnsupportedDecimals
    );
    let factor = 10u128
        .checked_pow((VOLUME_DECIMALS - token0_decimals) as u32)
        .ok_or(KswapError::MathOverflow)?;
    let volume = amount.checked_mul(factor).ok_or(KswapError::MathOverflow)?;
    Ok(volume)
}
