//! Single-band invariant and swap step
//!
//! Within band `n` with upper oracle edge `p_up`:
//! - `f = A * y0 * p_o^2 / p_up`
//! - `g = (A-1) * y0 * p_up / p_o`
//! - `inv = (f + x) * (g + y) = p_o * A^2 * y0^2`
//!
//! `y0` is recovered from the reserves by solving
//! `p_o*A*y0^2 - y0*(p_up/p_o*(A-1)*x + p_o^2/p_up*A*y) - x*y = 0`.

use crate::fixed::{add, div, mul, mul_div, mul_div_up, sub, to_u128, wad, U256};
use crate::{check_a, MathError, WAD};

/// Outcome of pushing input into one band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Band fully converted. `used` is the input absorbed including fee.
    /// A band with nothing to give reports `used == 0 && out == 0`.
    Filled { used: u128, out: u128 },
    /// The remaining input fits inside this band and is consumed entirely.
    Partial { out: u128 },
}

/// Solve for `y0`, the collateral the band would hold with no borrowed
/// reserve at `p_o == p_up`
pub fn get_y0(x: u128, y: u128, p_o: u128, p_up: u128, a: u128) -> Result<u128, MathError> {
    check_a(a)?;
    let a_ = U256::from(a);
    let x_ = U256::from(x);
    let y_ = U256::from(y);
    let p_o = U256::from(p_o);
    let p_up = U256::from(p_up);

    let mut b = U256::zero();
    if x != 0 {
        b = mul_div(mul(p_up, U256::from(a - 1))?, x_, p_o)?;
    }
    if y != 0 {
        let p_sq = mul_div(p_o, p_o, p_up)?;
        b = add(b, mul_div(mul(a_, p_sq)?, y_, wad())?)?;
    }

    let y0 = if x != 0 && y != 0 {
        let four_a_p_y = mul_div(mul(U256::from(4u8), mul(a_, p_o)?)?, y_, wad())?;
        let d = add(mul(b, b)?, mul(four_a_p_y, x_)?)?;
        let root = d.integer_sqrt();
        mul_div(add(b, root)?, wad(), mul(U256::from(2u8), mul(a_, p_o)?)?)?
    } else {
        mul_div(b, wad(), mul(a_, p_o)?)?
    };
    to_u128(y0)
}

/// Reserves of one band together with its invariant terms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandCurve {
    pub x: U256,
    pub y: U256,
    pub f: U256,
    pub g: U256,
    pub inv: U256,
}

impl BandCurve {
    pub fn new(x: u128, y: u128, p_o: u128, p_up: u128, a: u128) -> Result<Self, MathError> {
        let y0 = U256::from(get_y0(x, y, p_o, p_up, a)?);
        let p_o_ = U256::from(p_o);
        let p_up_ = U256::from(p_up);

        let f = mul_div(mul_div(mul(U256::from(a), y0)?, p_o_, p_up_)?, p_o_, wad())?;
        let g = mul_div(mul(U256::from(a - 1), y0)?, p_up_, p_o_)?;
        let x = U256::from(x);
        let y = U256::from(y);
        let inv = mul(add(f, x)?, add(g, y)?)?;

        Ok(Self { x, y, f, g, inv })
    }

    /// Borrowed in, collateral out
    pub fn pump(&self, in_left: u128, fee: u128) -> Result<Step, MathError> {
        if self.y.is_zero() || self.g.is_zero() {
            return Ok(Step::Filled { used: 0, out: 0 });
        }
        // Borrowed the band can absorb before its collateral runs out
        let x_dest = sub(sub(div(self.inv, self.g)?, self.f)?, self.x)?;
        let dx = with_fee(x_dest, fee)?;
        if dx >= U256::from(in_left) {
            let x_net = without_fee(in_left, fee)?;
            let rest = add(div(self.inv, add(add(self.f, self.x)?, x_net)?)?, U256::one())?;
            let new_y = sub(rest, self.g)?.min(self.y);
            return Ok(Step::Partial { out: to_u128(sub(self.y, new_y)?)? });
        }
        Ok(Step::Filled {
            used: to_u128(dx)?,
            out: to_u128(self.y)?,
        })
    }

    /// Collateral in, borrowed out
    pub fn dump(&self, in_left: u128, fee: u128) -> Result<Step, MathError> {
        if self.x.is_zero() || self.f.is_zero() {
            return Ok(Step::Filled { used: 0, out: 0 });
        }
        let y_dest = sub(sub(div(self.inv, self.f)?, self.g)?, self.y)?;
        let dy = with_fee(y_dest, fee)?;
        if dy >= U256::from(in_left) {
            let y_net = without_fee(in_left, fee)?;
            let rest = add(div(self.inv, add(add(self.g, self.y)?, y_net)?)?, U256::one())?;
            let new_x = sub(rest, self.f)?.min(self.x);
            return Ok(Step::Partial { out: to_u128(sub(self.x, new_x)?)? });
        }
        Ok(Step::Filled {
            used: to_u128(dy)?,
            out: to_u128(self.x)?,
        })
    }
}

/// Gross input needed for `net` to reach the band after fee
fn with_fee(net: U256, fee: u128) -> Result<U256, MathError> {
    if fee >= WAD {
        return Err(MathError::DivisionByZero);
    }
    mul_div_up(net, wad(), U256::from(WAD - fee))
}

/// Net input that reaches the band after fee
fn without_fee(gross: u128, fee: u128) -> Result<U256, MathError> {
    if fee >= WAD {
        return Err(MathError::DivisionByZero);
    }
    mul_div(U256::from(gross), U256::from(WAD - fee), wad())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{p_current_down, p_oracle_up};
    use proptest::prelude::*;

    const BASE: u128 = 3000 * WAD;
    const A: u128 = 100;

    fn ln_ratio(a: f64, b: f64) -> f64 {
        (a / b).ln().abs()
    }

    #[test]
    fn test_y0_of_collateral_band_at_top() {
        // p_o == p_up and no borrowed: y0 is the collateral itself
        let y = 5 * WAD;
        assert_eq!(get_y0(0, y, BASE, BASE, A).unwrap(), y);
        assert_eq!(get_y0(0, 0, BASE, BASE, A).unwrap(), 0);
    }

    #[test]
    fn test_pump_zero_input_gives_nothing() {
        let p_up = p_oracle_up(BASE, A, 3).unwrap();
        let curve = BandCurve::new(0, 7 * WAD, BASE, p_up, A).unwrap();
        assert_eq!(curve.pump(0, 6 * WAD / 1000).unwrap(), Step::Partial { out: 0 });
    }

    #[test]
    fn test_empty_band_is_skipped() {
        let curve = BandCurve::new(0, 0, BASE, BASE, A).unwrap();
        assert_eq!(curve.pump(1_000, 0).unwrap(), Step::Filled { used: 0, out: 0 });
        assert_eq!(curve.dump(1_000, 0).unwrap(), Step::Filled { used: 0, out: 0 });
    }

    #[test]
    fn test_small_pump_pays_band_bottom_price() {
        let n = 4;
        let p_up = p_oracle_up(BASE, A, n).unwrap();
        let curve = BandCurve::new(0, 10 * WAD, BASE, p_up, A).unwrap();
        let dx = 100_000_000_000_000u128;
        let out = match curve.pump(dx, 0).unwrap() {
            Step::Partial { out } => out,
            other => panic!("unexpected {:?}", other),
        };
        let price = p_current_down(BASE, BASE, A, n).unwrap() as f64 / WAD as f64;
        let expected = dx as f64 / price;
        assert!(ln_ratio(out as f64, expected) < 1e-6, "{} vs {}", out, expected);
    }

    #[test]
    fn test_pump_fills_band() {
        let p_up = p_oracle_up(BASE, A, 1).unwrap();
        let y = 2 * WAD;
        let curve = BandCurve::new(0, y, BASE, p_up, A).unwrap();
        match curve.pump(u128::MAX / 2, 0).unwrap() {
            Step::Filled { used, out } => {
                assert_eq!(out, y);
                // Roughly y * price, price between the band's current edges
                let lo = p_current_down(BASE, BASE, A, 1).unwrap();
                assert!(used > y / WAD * lo);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_dump_converts_borrowed_band() {
        // A band holding only borrowed sells it for collateral
        let p_up = p_oracle_up(BASE, A, -2).unwrap();
        let x = 1_000 * WAD;
        let curve = BandCurve::new(x, 0, BASE, p_up, A).unwrap();
        match curve.dump(WAD / 1000, 0).unwrap() {
            Step::Partial { out } => {
                assert!(out > 0);
                assert!(out < x);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_fee_at_or_above_one_rejected() {
        let curve = BandCurve::new(0, WAD, BASE, BASE, A).unwrap();
        assert_eq!(curve.pump(1, WAD), Err(MathError::DivisionByZero));
    }

    proptest! {
        #[test]
        fn prop_pump_never_pays_out_more_than_band(
            y in 1_000_000u128..1_000_000 * WAD,
            dx in 0u128..10_000_000 * WAD,
            n in 0i32..30,
        ) {
            let p_up = p_oracle_up(BASE, A, n).unwrap();
            let curve = BandCurve::new(0, y, BASE, p_up, A).unwrap();
            let out = match curve.pump(dx, 6 * WAD / 1000).unwrap() {
                Step::Partial { out } => out,
                Step::Filled { out, .. } => out,
            };
            prop_assert!(out <= y);
        }

        #[test]
        fn prop_partial_pump_keeps_invariant(
            y in 1_000_000_000u128..1_000_000 * WAD,
            dx in 1u128..1_000 * WAD,
            n in 0i32..30,
        ) {
            let p_up = p_oracle_up(BASE, A, n).unwrap();
            let curve = BandCurve::new(0, y, BASE, p_up, A).unwrap();
            if let Step::Partial { out } = curve.pump(dx, 0).unwrap() {
                let new_x = curve.x + U256::from(dx);
                let new_y = curve.y - U256::from(out);
                let after = (curve.f + new_x) * (curve.g + new_y);
                prop_assert!(after >= curve.inv);
            }
        }
    }
}
