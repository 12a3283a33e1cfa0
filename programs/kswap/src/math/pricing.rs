//! Pool pricing: share valuation and swap amounts from an oracle price, K and theta.
//!
//! Token0 is the base asset (`eth_amount` side of the oracle quote), token1 the quoted
//! token (`erc20_amount` side). Every result is rounded in the pool's favour: amounts
//! paid out round down, amounts required round up.

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::KswapError;
use crate::math::fixed_point::FixedPoint128;
use crate::math::u256::{mul_div, product, to_u128, Rounding, U256};

/// Oracle price plus the K and theta that apply to one pricing call
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct OraclePriceView {
    pub eth_amount: u128,
    pub erc20_amount: u128,
    pub slot: u64,
    /// K plus impact cost, in `K_BASE` units
    pub k: u128,
    /// Fee rate, in `THETA_BASE` units
    pub theta: u128,
}

impl OraclePriceView {
    /// Fold a 64.64 K and impact cost into `K_BASE` units, rounding up.
    pub fn new(
        eth_amount: u128,
        erc20_amount: u128,
        slot: u64,
        k: FixedPoint128,
        impact_cost: FixedPoint128,
        theta: u32,
    ) -> Result<Self> {
        let k = k
            .checked_add(impact_cost)?
            .mul_u128(K_BASE, Rounding::Up)?;
        let view = Self {
            eth_amount,
            erc20_amount,
            slot,
            k,
            theta: theta as u128,
        };
        view.validate()?;
        Ok(view)
    }

    pub fn validate(&self) -> Result<()> {
        require!(
            self.eth_amount > 0 && self.erc20_amount > 0,
            KswapError::DivisionByZero
        );
        require!(self.k < K_BASE, KswapError::KOutOfBounds);
        require!(self.theta < THETA_BASE, KswapError::InvalidTheta);
        Ok(())
    }

    fn k_plus(&self) -> u128 {
        K_BASE + self.k
    }

    fn k_minus(&self) -> u128 {
        K_BASE - self.k
    }

    fn theta_complement(&self) -> u128 {
        THETA_BASE - self.theta
    }
}

/// Amounts paid out when burning liquidity
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct BurnQuote {
    pub amount0: u128,
    pub amount1: u128,
    /// Fee retained by the pool, in token0
    pub fee: u128,
}

/// Net asset value per share used for minting.
///
/// Token1 is valued at `P * (1 - K)`, which inflates the pool value and therefore
/// the price a minter pays per share:
///
/// navps = (b1 * eth * K_BASE + b0 * erc20 * (K_BASE - k)) * NAVPS_BASE
///         / (erc20 * (K_BASE - k) * supply)
pub fn get_nav_per_share_for_mint(
    balance0: u128,
    balance1: u128,
    total_supply: u128,
    op: &OraclePriceView,
) -> Result<u128> {
    op.validate()?;
    if total_supply == 0 {
        return Ok(NAVPS_BASE);
    }

    let token1_part = product(&[balance1, op.eth_amount, K_BASE])?;
    let token0_part = product(&[balance0, op.erc20_amount, op.k_minus()])?;
    let numerator = token1_part
        .checked_add(token0_part)
        .ok_or(KswapError::MathOverflow)?;

    let denominator = product(&[op.erc20_amount, op.k_minus(), total_supply])?;
    ratio_of(numerator, NAVPS_BASE, denominator, Rounding::Up)
}

/// Net asset value per share used for burning.
///
/// Token1 is valued at `P * (1 + K)`, the opposite adjustment to minting.
pub fn get_nav_per_share_for_burn(
    balance0: u128,
    balance1: u128,
    total_supply: u128,
    op: &OraclePriceView,
) -> Result<u128> {
    op.validate()?;
    if total_supply == 0 {
        return Ok(NAVPS_BASE);
    }

    let token1_part = product(&[balance1, op.eth_amount, K_BASE])?;
    let token0_part = product(&[balance0, op.erc20_amount, op.k_plus()])?;
    let numerator = token1_part
        .checked_add(token0_part)
        .ok_or(KswapError::MathOverflow)?;

    let denominator = product(&[op.erc20_amount, op.k_plus(), total_supply])?;
    ratio_of(numerator, NAVPS_BASE, denominator, Rounding::Down)
}

fn ratio_of(numerator: U256, scale: u128, denominator: U256, rounding: Rounding) -> Result<u128> {
    require!(!denominator.is_zero(), KswapError::DivisionByZero);
    let scaled = numerator
        .checked_mul(U256::from(scale))
        .ok_or(KswapError::MathOverflow)?;
    let (q, r) = scaled.div_mod(denominator);
    let q = if rounding == Rounding::Up && !r.is_zero() {
        q.checked_add(U256::one()).ok_or(KswapError::MathOverflow)?
    } else {
        q
    };
    to_u128(q)
}

/// Liquidity minted for a deposit.
///
/// The token1 leg is converted to token0 at `P * (1 + K)`, the price least
/// favourable to the depositor.
pub fn calc_liquidity(
    amount0: u128,
    amount1: u128,
    navps: u128,
    op: &OraclePriceView,
) -> Result<u128> {
    op.validate()?;
    require!(navps > 0, KswapError::DivisionByZero);

    let token1_value = mul_div(
        &[amount1, op.eth_amount, K_BASE],
        &[op.erc20_amount, op.k_plus()],
        Rounding::Down,
    )?;
    let value = amount0
        .checked_add(token1_value)
        .ok_or(KswapError::MathOverflow)?;

    mul_div(&[value, NAVPS_BASE], &[navps], Rounding::Down)
}

/// Exact token1 in, token0 out.
///
/// out = in * eth * K_BASE * (THETA_BASE - theta) / (erc20 * (K_BASE + k) * THETA_BASE)
/// fee = in * eth * K_BASE * theta / (erc20 * (K_BASE + k) * THETA_BASE)
pub fn calc_out_token0(amount_in: u128, op: &OraclePriceView) -> Result<(u128, u128)> {
    op.validate()?;

    let amount_out = mul_div(
        &[amount_in, op.eth_amount, K_BASE, op.theta_complement()],
        &[op.erc20_amount, op.k_plus(), THETA_BASE],
        Rounding::Down,
    )?;

    let fee = if op.theta == 0 {
        0
    } else {
        mul_div(
            &[amount_in, op.eth_amount, K_BASE, op.theta],
            &[op.erc20_amount, op.k_plus(), THETA_BASE],
            Rounding::Down,
        )?
    };

    Ok((amount_out, fee))
}

/// Exact token0 in, token1 out.
///
/// out = in * (THETA_BASE - theta) * erc20 * (K_BASE - k) / (eth * K_BASE * THETA_BASE)
/// fee = in * theta / THETA_BASE, in token0
pub fn calc_out_token1(amount_in: u128, op: &OraclePriceView) -> Result<(u128, u128)> {
    op.validate()?;

    let amount_out = mul_div(
        &[amount_in, op.erc20_amount, op.k_minus(), op.theta_complement()],
        &[op.eth_amount, K_BASE, THETA_BASE],
        Rounding::Down,
    )?;

    let fee = mul_div(&[amount_in, op.theta], &[THETA_BASE], Rounding::Down)?;

    Ok((amount_out, fee))
}

/// Token1 required to receive exactly `amount_out` token0.
///
/// Inverse of [`calc_out_token0`]; the fee is expressed in token0.
pub fn calc_in_needed_token1(amount_out: u128, op: &OraclePriceView) -> Result<(u128, u128)> {
    op.validate()?;

    let amount_in = mul_div(
        &[amount_out, op.erc20_amount, op.k_plus(), THETA_BASE],
        &[op.eth_amount, K_BASE, op.theta_complement()],
        Rounding::Up,
    )?;

    let fee = mul_div(
        &[amount_out, op.theta],
        &[op.theta_complement()],
        Rounding::Down,
    )?;

    Ok((amount_in, fee))
}

/// Token0 required to receive exactly `amount_out` token1.
///
/// Inverse of [`calc_out_token1`]; the fee is expressed in token0.
pub fn calc_in_needed_token0(amount_out: u128, op: &OraclePriceView) -> Result<(u128, u128)> {
    op.validate()?;

    let amount_in = mul_div(
        &[amount_out, op.eth_amount, K_BASE, THETA_BASE],
        &[op.erc20_amount, op.k_minus(), op.theta_complement()],
        Rounding::Up,
    )?;

    let fee = mul_div(&[amount_in, op.theta], &[THETA_BASE], Rounding::Down)?;

    Ok((amount_in, fee))
}

/// Split the value of burned liquidity into token0 and token1.
///
/// The fee is taken from the burned value first. The rest is paid in token0 in
/// proportion to the pool's token0 share, and the remainder in token1 at
/// `P * (1 - K)`.
pub fn calc_out_token_and_eth_for_burn(
    liquidity: u128,
    navps: u128,
    balance0: u128,
    balance1: u128,
    op: &OraclePriceView,
) -> Result<BurnQuote> {
    op.validate()?;

    let value = mul_div(&[liquidity, navps], &[NAVPS_BASE], Rounding::Down)?;
    let fee = mul_div(&[value, op.theta], &[THETA_BASE], Rounding::Up)?;
    let net = value.checked_sub(fee).ok_or(KswapError::MathOverflow)?;

    let token1_value = mul_div(
        &[balance1, op.eth_amount, K_BASE],
        &[op.erc20_amount, op.k_plus()],
        Rounding::Down,
    )?;
    let pool_value = balance0
        .checked_add(token1_value)
        .ok_or(KswapError::MathOverflow)?;
    require!(pool_value > 0, KswapError::InsufficientLiquidity);

    let amount0 = mul_div(&[net, balance0], &[pool_value], Rounding::Down)?;
    let remainder = net.checked_sub(amount0).ok_or(KswapError::MathOverflow)?;
    let amount1 = mul_div(
        &[remainder, op.erc20_amount, op.k_minus()],
        &[op.eth_amount, K_BASE],
        Rounding::Down,
    )?;

    require!(
        amount0 <= balance0 && amount1 <= balance1,
        KswapError::InsufficientLiquidity
    );

    Ok(BurnQuote {
        amount0,
        amount1,
        fee,
    })
}

/// Reject a first deposit whose token ratio strays from the oracle ratio.
///
/// |amount1 * eth - amount0 * erc20| <= tolerance * amount0 * erc20
pub fn check_asset_ratio(amount0: u128, amount1: u128, op: &OraclePriceView) -> Result<()> {
    op.validate()?;
    require!(amount0 > 0 && amount1 > 0, KswapError::AmountTooSmall);

    let supplied = product(&[amount1, op.eth_amount, BPS_DENOMINATOR])?;
    let expected = product(&[amount0, op.erc20_amount, BPS_DENOMINATOR])?;
    let deviation = if supplied > expected {
        supplied - expected
    } else {
        expected - supplied
    };
    let allowed = product(&[amount0, op.erc20_amount, ASSET_RATIO_TOLERANCE_BPS])?;

    require!(deviation <= allowed, KswapError::InvalidAssetRatio);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ETH_1E19: u128 = 10_000_000_000_000_000_000;
    const ERC20: u128 = 3_862_600_000;

    fn view(k: u128, theta: u128) -> OraclePriceView {
        OraclePriceView {
            eth_amount: ETH_1E19,
            erc20_amount: ERC20,
            slot: 100,
            k,
            theta,
        }
    }

    fn rel_err(actual: f64, expected: f64) -> f64 {
        (actual - expected).abs() / expected.abs()
    }

    #[test]
    fn test_fee_matches_closed_form() {
        let op = view(0, 200_000);
        let amount_in = 100_000_000u128;
        let (_, fee) = calc_out_token0(amount_in, &op).unwrap();

        let expected = amount_in as f64 * 1e19 * 1e8 * 200_000.0 / (3_862_600_000.0 * 1e8 * 1e8);
        assert!(rel_err(fee as f64, expected) < 1e-10);
        assert_eq!(fee, 517_785_947_289_390);
    }

    #[test]
    fn test_fee_never_grows_with_k() {
        let amount_in = 100_000_000u128;
        let mut last: Option<(u128, u128, u128)> = None;
        for k in [0u128, 1, 250_000, 1_000_000, 5_000_000, 50_000_000] {
            let op = view(k, 200_000);
            let fees = (
                calc_out_token0(amount_in, &op).unwrap().1,
                calc_out_token1(amount_in, &op).unwrap().1,
                calc_in_needed_token1(amount_in, &op).unwrap().1,
            );
            if let Some(prev) = last {
                assert!(fees.0 < prev.0);
                assert_eq!(fees.1, prev.1);
                assert_eq!(fees.2, prev.2);
            }
            last = Some(fees);
        }
    }

    #[test]
    fn test_zero_theta_has_no_fee() {
        let op = view(250_000, 0);
        assert_eq!(calc_out_token0(1_000_000, &op).unwrap().1, 0);
        assert_eq!(calc_out_token1(1_000_000, &op).unwrap().1, 0);
    }

    #[test]
    fn test_exact_out_covers_exact_in() {
        let op = view(250_000, 200_000);

        let amount_out = 1_000_000_000_000_000u128;
        let (needed, _) = calc_in_needed_token1(amount_out, &op).unwrap();
        let (received, _) = calc_out_token0(needed, &op).unwrap();
        assert!(received >= amount_out);

        let amount_out = 5_000_000u128;
        let (needed, _) = calc_in_needed_token0(amount_out, &op).unwrap();
        let (received, _) = calc_out_token1(needed, &op).unwrap();
        assert!(received >= amount_out);
    }

    #[test]
    fn test_k_moves_price_against_trader() {
        // large enough that the token1 output does not truncate to zero
        let amount_in = 1_000_000_000_000_000_000u128;
        let flat = view(0, 0);
        let wide = view(1_000_000, 0);

        let out0_wide = calc_out_token0(amount_in, &wide).unwrap().0;
        let out0_flat = calc_out_token0(amount_in, &flat).unwrap().0;
        assert!(out0_wide < out0_flat);

        let out1_wide = calc_out_token1(amount_in, &wide).unwrap().0;
        let out1_flat = calc_out_token1(amount_in, &flat).unwrap().0;
        assert!(out1_wide > 0);
        assert!(out1_wide < out1_flat);
    }

    #[test]
    fn test_navps_for_empty_pool() {
        let op = view(250_000, 200_000);
        assert_eq!(get_nav_per_share_for_mint(0, 0, 0, &op).unwrap(), NAVPS_BASE);
        assert_eq!(get_nav_per_share_for_burn(0, 0, 0, &op).unwrap(), NAVPS_BASE);
    }

    #[test]
    fn test_navps_mint_above_burn() {
        let op = OraclePriceView {
            eth_amount: 1_000_000_000,
            erc20_amount: ERC20,
            slot: 1,
            k: 250_000,
            theta: 200_000,
        };
        let (b0, b1, supply) = (100_000_000_000u128, 386_260_000_000u128, 200_000_000_000u128);
        let mint = get_nav_per_share_for_mint(b0, b1, supply, &op).unwrap();
        let burn = get_nav_per_share_for_burn(b0, b1, supply, &op).unwrap();
        assert!(mint > burn);

        let flat = OraclePriceView { k: 0, ..op };
        let fair = get_nav_per_share_for_mint(b0, b1, supply, &flat).unwrap();
        assert!(mint > fair);
        assert!(burn < fair);
        assert_eq!(fair, NAVPS_BASE);
    }

    #[test]
    fn test_mint_then_burn_is_not_profitable() {
        let op = OraclePriceView {
            eth_amount: 1_000_000_000,
            erc20_amount: ERC20,
            slot: 1,
            k: 250_000,
            theta: 200_000,
        };
        let (b0, b1, supply) = (100_000_000_000u128, 386_260_000_000u128, 200_000_000_000u128);
        let deposit = 10_000_000_000u128;

        let navps = get_nav_per_share_for_mint(b0, b1, supply, &op).unwrap();
        let liquidity = calc_liquidity(deposit, 0, navps, &op).unwrap();

        let (b0, supply) = (b0 + deposit, supply + liquidity);
        let navps = get_nav_per_share_for_burn(b0, b1, supply, &op).unwrap();
        let quote = calc_out_token_and_eth_for_burn(liquidity, navps, b0, b1, &op).unwrap();

        let returned = quote.amount0 + quote.amount1 * op.eth_amount / op.erc20_amount;
        assert!(returned < deposit);
        assert!(quote.fee > 0);
    }

    #[test]
    fn test_burn_respects_balances() {
        let op = OraclePriceView {
            eth_amount: 1_000_000_000,
            erc20_amount: ERC20,
            slot: 1,
            k: 0,
            theta: 0,
        };
        let quote = calc_out_token_and_eth_for_burn(1_000, NAVPS_BASE, 0, 0, &op);
        let err: Error = KswapError::InsufficientLiquidity.into();
        assert_eq!(quote.unwrap_err(), err);
    }

    #[test]
    fn test_asset_ratio_guard() {
        let op = OraclePriceView {
            eth_amount: 1_000_000_000,
            erc20_amount: ERC20,
            slot: 1,
            k: 0,
            theta: 0,
        };
        assert!(check_asset_ratio(1_000_000_000, ERC20, &op).is_ok());
        assert!(check_asset_ratio(1_000_000_000, ERC20 * 1005 / 1000, &op).is_ok());

        let err: Error = KswapError::InvalidAssetRatio.into();
        assert_eq!(
            check_asset_ratio(1_000_000_000, ERC20 * 2, &op).unwrap_err(),
            err
        );
        assert_eq!(
            check_asset_ratio(1_000_000_000, ERC20 / 2, &op).unwrap_err(),
            err
        );
    }

    #[test]
    fn test_view_rejects_bad_inputs() {
        let k_err: Error = KswapError::KOutOfBounds.into();
        assert_eq!(calc_out_token1(1, &view(K_BASE, 0)).unwrap_err(), k_err);

        let theta_err: Error = KswapError::InvalidTheta.into();
        assert_eq!(calc_out_token1(1, &view(0, THETA_BASE)).unwrap_err(), theta_err);

        let zero: Error = KswapError::DivisionByZero.into();
        let op = OraclePriceView { erc20_amount: 0, ..view(0, 0) };
        assert_eq!(calc_out_token0(1, &op).unwrap_err(), zero);
    }

    #[test]
    fn test_view_rounds_k_up() {
        let k = FixedPoint128::from_raw(1);
        let op = OraclePriceView::new(1, 1, 0, k, FixedPoint128::ZERO, 0).unwrap();
        assert_eq!(op.k, 1);

        let k = FixedPoint128::from_decimal_str("0.0025").unwrap();
        let impact = FixedPoint128::from_decimal_str("0.0005").unwrap();
        let op = OraclePriceView::new(1, 1, 0, k, impact, 0).unwrap();
        assert_eq!(op.k, 300_000);
    }
}
