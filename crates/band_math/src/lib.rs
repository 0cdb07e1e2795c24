//! Band math - fixed-point pricing for a banded-liquidity AMM
//!
//! Liquidity lives in discrete price bands. Band `n` covers oracle prices
//! `[p_up(n) * (A-1)/A, p_up(n)]` where `p_up(n) = base_price * ((A-1)/A)^n`.
//! Inside one band the reserves follow
//!
//! ```text
//! (f + x) * (g + y) = p_o * A^2 * y0^2
//! ```
//!
//! with `x` the borrowed reserve, `y` the collateral reserve and `p_o` the
//! oracle price. Everything is 18-decimal fixed point ("wad").
//!
//! **No state**: callers own band reserves and feed them in one band at a time.

#![no_std]
#![forbid(unsafe_code)]

#[cfg(feature = "std")]
extern crate std;

pub mod band;
pub mod curve;
pub mod fixed;

pub use band::{p_current_band, p_current_down, p_current_up, p_oracle_down, p_oracle_up};
pub use curve::{get_y0, BandCurve, Step};
pub use fixed::{pow_wad, U256};

/// Fixed-point scale (1e18)
pub const WAD: u128 = 1_000_000_000_000_000_000;

/// Widest range a single deposit may span
pub const MAX_TICKS: i32 = 50;

/// Most bands one swap walk may visit
pub const MAX_SKIP_TICKS: i32 = 1024;

/// Largest absolute band index accepted by the pricing functions
pub const MAX_BAND: i32 = 1 << 20;

/// Smallest amplification parameter that yields a non-degenerate band
pub const MIN_A: u128 = 2;

/// Largest amplification parameter
pub const MAX_A: u128 = 10_000;

/// Error types for band math
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    /// Intermediate or result does not fit
    Overflow,
    /// Zero denominator (zero price or empty band)
    DivisionByZero,
    /// Amplification outside [MIN_A, MAX_A]
    InvalidA,
    /// Band index beyond MAX_BAND
    BandOutOfRange,
}

impl core::fmt::Display for MathError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MathError::Overflow => f.write_str("arithmetic overflow"),
            MathError::DivisionByZero => f.write_str("division by zero"),
            MathError::InvalidA => write!(f, "amplification must be in [{}, {}]", MIN_A, MAX_A),
            MathError::BandOutOfRange => write!(f, "band index outside [-{}, {}]", MAX_BAND, MAX_BAND),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for MathError {}

/// Validate an amplification parameter
#[inline]
pub fn check_a(a: u128) -> Result<(), MathError> {
    if (MIN_A..=MAX_A).contains(&a) {
        Ok(())
    } else {
        Err(MathError::InvalidA)
    }
}
