use anchor_lang::prelude::*;

use crate::errors::KswapError;

// Kept apart from the anchor prelude, whose `Result` alias breaks the macro expansion.
mod wide {
    uint::construct_uint! {
        /// 256-bit unsigned integer for intermediate products.
        pub struct U256(4);
    }
}

pub use wide::U256;

/// Direction of the final division
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rounding {
    Down,
    Up,
}

/// Checked product of all factors
pub fn product(factors: &[u128]) -> Result<U256> {
    let mut acc = U256::one();
    for factor in factors {
        acc = acc
            .checked_mul(U256::from(*factor))
            .ok_or(KswapError::MathOverflow)?;
    }
    Ok(acc)
}

/// Narrow back to u128, failing instead of truncating
pub fn to_u128(value: U256) -> Result<u128> {
    require!(value <= U256::from(u128::MAX), KswapError::MathOverflow);
    Ok(value.low_u128())
}

/// Compute `prod(numer) / prod(denom)` with a single rounding step.
///
/// Every pricing formula is a ratio of products, so dividing once at the end keeps
/// the result exact up to the final rounding.
pub fn mul_div(numer: &[u128], denom: &[u128], rounding: Rounding) -> Result<u128> {
    let n = product(numer)?;
    let d = product(denom)?;
    require!(!d.is_zero(), KswapError::DivisionByZero);

    let (quotient, remainder) = n.div_mod(d);
    let quotient = if rounding == Rounding::Up && !remainder.is_zero() {
        quotient
            .checked_add(U256::one())
            .ok_or(KswapError::MathOverflow)?
    } else {
        quotient
    };

    to_u128(quotient)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_div_rounding() {
        assert_eq!(mul_div(&[10], &[3], Rounding::Down).unwrap(), 3);
        assert_eq!(mul_div(&[10], &[3], Rounding::Up).unwrap(), 4);
        assert_eq!(mul_div(&[9], &[3], Rounding::Up).unwrap(), 3);
    }

    #[test]
    fn test_mul_div_wide_intermediate() {
        // 1e8 * 1e19 * 1e8 * 2e5 overflows u128 but not the intermediate
        let fee = mul_div(
            &[100_000_000, 10_000_000_000_000_000_000, 100_000_000, 200_000],
            &[3_862_600_000, 100_000_000, 100_000_000],
            Rounding::Down,
        )
        .unwrap();
        assert_eq!(fee, 517_785_947_289_390);
    }

    #[test]
    fn test_mul_div_errors() {
        let zero: Error = KswapError::DivisionByZero.into();
        assert_eq!(mul_div(&[1], &[0], Rounding::Down).unwrap_err(), zero);

        let overflow: Error = KswapError::MathOverflow.into();
        assert_eq!(
            mul_div(&[u128::MAX, 2], &[1], Rounding::Down).unwrap_err(),
            overflow
        );
    }
}
