//! Signed 64.64 fixed-point numbers.
//!
//! Every operation is checked and rounds toward zero. Overflow is an error, never a
//! wrapped or saturated value.

use anchor_lang::prelude::*;

use crate::errors::KswapError;
use crate::math::u256::{Rounding, U256};

const FRACTION_BITS: usize = 64;

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, AnchorSerialize, AnchorDeserialize,
)]
pub struct FixedPoint128(i128);

impl FixedPoint128 {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(1 << 64);
    pub const MAX: Self = Self(i128::MAX);
    pub const MIN: Self = Self(i128::MIN);

    pub const fn from_raw(raw: i128) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> i128 {
        self.0
    }

    pub const fn from_int(value: i64) -> Self {
        Self((value as i128) << FRACTION_BITS)
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// `numerator / denominator` as 64.64
    pub fn from_ratio(numerator: u128, denominator: u128) -> Result<Self> {
        Self::from_wide_ratio(U256::from(numerator), U256::from(denominator))
    }

    /// `numerator / denominator` as 64.64, for operands that are themselves products
    pub fn from_wide_ratio(numerator: U256, mut denominator: U256) -> Result<Self> {
        require!(!denominator.is_zero(), KswapError::DivisionByZero);
        let (int_part, mut rem) = numerator.div_mod(denominator);
        require!(
            int_part <= U256::from(i128::MAX as u128 >> FRACTION_BITS),
            KswapError::MathOverflow
        );

        // rem < denominator, so only a denominator above 192 bits can overflow the shift
        let excess = denominator.bits().saturating_sub(256 - FRACTION_BITS);
        if excess > 0 {
            rem = rem >> excess;
            denominator = denominator >> excess;
        }
        let fraction = (rem << FRACTION_BITS) / denominator;

        Self::from_magnitude(false, (int_part << FRACTION_BITS) + fraction)
    }

    fn from_magnitude(negative: bool, magnitude: U256) -> Result<Self> {
        require!(
            magnitude <= U256::from(i128::MAX as u128),
            KswapError::MathOverflow
        );
        let value = magnitude.low_u128() as i128;
        Ok(Self(if negative { -value } else { value }))
    }

    pub fn checked_add(self, other: Self) -> Result<Self> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or_else(|| KswapError::MathOverflow.into())
    }

    pub fn checked_sub(self, other: Self) -> Result<Self> {
        self.0
            .checked_sub(other.0)
            .map(Self)
            .ok_or_else(|| KswapError::MathOverflow.into())
    }

    pub fn checked_mul(self, other: Self) -> Result<Self> {
        let negative = (self.0 < 0) != (other.0 < 0);
        let product = U256::from(self.0.unsigned_abs()) * U256::from(other.0.unsigned_abs());
        let magnitude = product >> FRACTION_BITS;
        Self::from_magnitude(negative, magnitude)
    }

    pub fn checked_div(self, other: Self) -> Result<Self> {
        require!(other.0 != 0, KswapError::DivisionByZero);
        let negative = (self.0 < 0) != (other.0 < 0);
        let magnitude = (U256::from(self.0.unsigned_abs()) << FRACTION_BITS)
            / U256::from(other.0.unsigned_abs());
        Self::from_magnitude(negative, magnitude)
    }

    pub fn abs(self) -> Result<Self> {
        self.0
            .checked_abs()
            .map(Self)
            .ok_or_else(|| KswapError::MathOverflow.into())
    }

    /// Square root of a non-negative value
    pub fn sqrt(self) -> Result<Self> {
        require!(self.0 >= 0, KswapError::MathOverflow);
        let root = (U256::from(self.0 as u128) << FRACTION_BITS).integer_sqrt();
        Self::from_magnitude(false, root)
    }

    /// Multiply an integer amount by a non-negative coefficient
    pub fn mul_u128(self, amount: u128, rounding: Rounding) -> Result<u128> {
        require!(self.0 >= 0, KswapError::MathOverflow);
        let product = U256::from(self.0 as u128) * U256::from(amount);
        let mut result = product >> FRACTION_BITS;
        let remainder = product - (result << FRACTION_BITS);
        if rounding == Rounding::Up && !remainder.is_zero() {
            result = result + U256::one();
        }
        crate::math::u256::to_u128(result)
    }

    /// Integer part of a non-negative value
    pub fn to_u128_floor(self) -> Result<u128> {
        require!(self.0 >= 0, KswapError::MathOverflow);
        Ok((self.0 as u128) >> FRACTION_BITS)
    }

    /// Parse a decimal literal such as `"0.05"`, `"-1.171e-04"` or `"3"`.
    ///
    /// The encoding is `value * 2^64` truncated toward zero, the same bit pattern the
    /// table constants are published with. Returns `None` on malformed input or overflow.
    pub fn from_decimal_str(input: &str) -> Option<Self> {
        let input = input.trim();
        let (negative, body) = match input.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, input.strip_prefix('+').unwrap_or(input)),
        };

        let (mantissa, exponent) = match body.find(|c: char| c == 'e' || c == 'E') {
            Some(pos) => (&body[..pos], body[pos + 1..].parse::<i32>().ok()?),
            None => (body, 0),
        };

        let (int_part, frac_part) = match mantissa.find('.') {
            Some(pos) => (&mantissa[..pos], &mantissa[pos + 1..]),
            None => (mantissa, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }

        let digits: String = format!("{}{}", int_part, frac_part);
        if digits.len() > 50 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let mut value = U256::zero();
        for b in digits.bytes() {
            value = value
                .checked_mul(U256::from(10u8))?
                .checked_add(U256::from(b - b'0'))?;
        }

        let scale = exponent - frac_part.len() as i32;
        if !(-60..=60).contains(&scale) {
            return None;
        }
        let ten_pow = U256::from(10u8).checked_pow(U256::from(scale.unsigned_abs()))?;

        let shifted = value.checked_mul(U256::one() << FRACTION_BITS)?;
        let magnitude = if scale >= 0 {
            shifted.checked_mul(ten_pow)?
        } else {
            shifted / ten_pow
        };

        Self::from_magnitude(negative, magnitude).ok()
    }

    /// Lossy conversion for tooling and tests
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / 18_446_744_073_709_551_616.0
    }
}
