//! Band price grid
//!
//! - `p_oracle_up(n)` / `p_oracle_down(n)`: oracle-price edges of band `n`
//! - `p_current_up(n)` / `p_current_down(n)`: the band's AMM price range at
//!   the current oracle price, `p_o^3 / p_edge^2`
//!
//! Higher `n` means lower oracle prices but, at a fixed oracle price, higher
//! current prices. Buying collateral (pump) therefore walks toward larger `n`.

use crate::fixed::{mul_div, to_u128, wad, U256};
use crate::{check_a, pow_wad, MathError, MAX_BAND, WAD};

/// `(A-1)/A` as a wad
#[inline]
pub fn band_ratio(a: u128) -> Result<u128, MathError> {
    check_a(a)?;
    Ok((a - 1) * WAD / a)
}

/// Upper oracle price of band `n`: `base_price * ((A-1)/A)^n`
pub fn p_oracle_up(base_price: u128, a: u128, n: i32) -> Result<u128, MathError> {
    if n.unsigned_abs() > MAX_BAND as u32 {
        return Err(MathError::BandOutOfRange);
    }
    if base_price == 0 {
        return Err(MathError::DivisionByZero);
    }
    let factor = U256::from(pow_wad(band_ratio(a)?, n.unsigned_abs())?);
    let base = U256::from(base_price);
    let p = if n >= 0 {
        mul_div(base, factor, wad())?
    } else {
        mul_div(base, wad(), factor)?
    };
    to_u128(p)
}

/// Lower oracle price of band `n`
#[inline]
pub fn p_oracle_down(base_price: u128, a: u128, n: i32) -> Result<u128, MathError> {
    let next = n.checked_add(1).ok_or(MathError::BandOutOfRange)?;
    p_oracle_up(base_price, a, next)
}

/// AMM price at a band edge for oracle price `p_o`: `p_o^3 / p_edge^2`
pub fn p_current_band(p_o: u128, p_edge: u128) -> Result<u128, MathError> {
    let p_o = U256::from(p_o);
    let p_edge = U256::from(p_edge);
    let p = mul_div(p_o, p_o, p_edge)?;
    let p = mul_div(p, p_o, p_edge)?;
    to_u128(p)
}

/// Highest AMM price of band `n` (band holds only borrowed)
pub fn p_current_up(p_o: u128, base_price: u128, a: u128, n: i32) -> Result<u128, MathError> {
    p_current_band(p_o, p_oracle_down(base_price, a, n)?)
}

/// Lowest AMM price of band `n` (band holds only collateral)
pub fn p_current_down(p_o: u128, base_price: u128, a: u128, n: i32) -> Result<u128, MathError> {
    p_current_band(p_o, p_oracle_up(base_price, a, n)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const BASE: u128 = 3000 * WAD;

    #[test]
    fn test_band_zero_is_base_price() {
        assert_eq!(p_oracle_up(BASE, 100, 0).unwrap(), BASE);
        assert_eq!(p_oracle_down(BASE, 100, 0).unwrap(), BASE * 99 / 100);
        assert_eq!(p_oracle_up(BASE, 100, -1).unwrap(), BASE * 100 / 99);
    }

    #[test]
    fn test_current_price_matches_oracle_at_band_top() {
        // p_o sitting on the upper edge: current range starts at p_o
        let p_up = p_oracle_up(BASE, 100, 7).unwrap();
        assert_eq!(p_current_down(p_up, BASE, 100, 7).unwrap(), p_up);
        assert!(p_current_up(p_up, BASE, 100, 7).unwrap() > p_up);
    }

    #[test]
    fn test_invalid_inputs() {
        assert_eq!(p_oracle_up(BASE, 1, 0), Err(MathError::InvalidA));
        assert_eq!(p_oracle_up(BASE, 100, MAX_BAND + 1), Err(MathError::BandOutOfRange));
        assert_eq!(p_oracle_up(0, 100, 3), Err(MathError::DivisionByZero));
        assert_eq!(p_current_band(BASE, 0), Err(MathError::DivisionByZero));
    }

    proptest! {
        #[test]
        fn prop_band_width_is_one_over_a(a in 10u128..=1000, n in -50i32..50) {
            let up = p_oracle_up(BASE, a, n).unwrap();
            let down = p_oracle_down(BASE, a, n).unwrap();
            prop_assert!(down < up);
            // down / up == (A-1) / A up to truncation
            let lhs = down * a;
            let rhs = up * (a - 1);
            prop_assert!(lhs.abs_diff(rhs) <= up / 1_000_000_000_000);
        }

        #[test]
        fn prop_current_prices_rise_with_n(a in 10u128..=1000, n in 0i32..50) {
            let lo = p_current_down(BASE, BASE, a, n).unwrap();
            let hi = p_current_up(BASE, BASE, a, n).unwrap();
            prop_assert!(lo < hi);
            prop_assert!(hi <= p_current_down(BASE, BASE, a, n + 1).unwrap());
        }
    }
}
