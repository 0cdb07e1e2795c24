//! Checked 256-bit fixed-point helpers

pub use primitive_types::U256;

use crate::{MathError, WAD};

#[inline]
pub fn wad() -> U256 {
    U256::from(WAD)
}

/// Narrow a U256 back to u128
#[inline]
pub fn to_u128(v: U256) -> Result<u128, MathError> {
    if v > U256::from(u128::MAX) {
        return Err(MathError::Overflow);
    }
    Ok(v.low_u128())
}

#[inline]
pub fn add(a: U256, b: U256) -> Result<U256, MathError> {
    a.checked_add(b).ok_or(MathError::Overflow)
}

#[inline]
pub fn sub(a: U256, b: U256) -> Result<U256, MathError> {
    a.checked_sub(b).ok_or(MathError::Overflow)
}

#[inline]
pub fn mul(a: U256, b: U256) -> Result<U256, MathError> {
    a.checked_mul(b).ok_or(MathError::Overflow)
}

#[inline]
pub fn div(a: U256, b: U256) -> Result<U256, MathError> {
    if b.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    Ok(a / b)
}

/// a * b / d, rounding down
#[inline]
pub fn mul_div(a: U256, b: U256, d: U256) -> Result<U256, MathError> {
    div(mul(a, b)?, d)
}

/// a * b / d, rounding up
#[inline]
pub fn mul_div_up(a: U256, b: U256, d: U256) -> Result<U256, MathError> {
    if d.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    let p = mul(a, b)?;
    let q = p / d;
    if (p % d).is_zero() {
        Ok(q)
    } else {
        add(q, U256::one())
    }
}

/// `base^n` for a wad `base`, by squaring
///
/// Each multiplication truncates, so the result drifts down by at most
/// ~2·log2(n) wei relative to the exact power.
pub fn pow_wad(base: u128, mut n: u32) -> Result<u128, MathError> {
    let one = wad();
    let mut acc = one;
    let mut b = U256::from(base);
    while n > 0 {
        if n & 1 == 1 {
            acc = mul(acc, b)? / one;
        }
        n >>= 1;
        if n > 0 {
            b = mul(b, b)? / one;
        }
    }
    to_u128(acc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pow_wad_identities() {
        assert_eq!(pow_wad(WAD, 1000).unwrap(), WAD);
        assert_eq!(pow_wad(123 * WAD, 0).unwrap(), WAD);
        assert_eq!(pow_wad(2 * WAD, 10).unwrap(), 1024 * WAD);
        assert_eq!(pow_wad(WAD / 2, 2).unwrap(), WAD / 4);
    }

    #[test]
    fn test_pow_wad_overflow() {
        assert_eq!(pow_wad(10 * WAD, 40), Err(MathError::Overflow));
    }

    #[test]
    fn test_mul_div_rounding() {
        let seven = U256::from(7u8);
        let two = U256::from(2u8);
        assert_eq!(mul_div(seven, U256::one(), two).unwrap(), U256::from(3u8));
        assert_eq!(mul_div_up(seven, U256::one(), two).unwrap(), U256::from(4u8));
        assert_eq!(mul_div_up(U256::from(8u8), U256::one(), two).unwrap(), U256::from(4u8));
        assert_eq!(div(seven, U256::zero()), Err(MathError::DivisionByZero));
    }

    #[test]
    fn test_to_u128_bounds() {
        assert_eq!(to_u128(U256::from(u128::MAX)).unwrap(), u128::MAX);
        assert_eq!(
            to_u128(U256::from(u128::MAX) + U256::one()),
            Err(MathError::Overflow)
        );
    }
}
