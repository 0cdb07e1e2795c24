//! LLAMMA model - banded-liquidity AMM with bonded deposit ranges
//!
//! Collateral is deposited across a range of price bands `[n1, n2]`. As the
//! AMM price moves through a band the band's collateral is converted into
//! the borrowed asset and back. Pricing inside a band comes from `band_math`;
//! this crate owns the state: band reserves, shares, users and the two token
//! ledgers.

#![forbid(unsafe_code)]

pub mod address;
pub mod amm;
pub mod config;
pub mod error;
pub mod fixture;
pub mod proxy;
pub mod token;

// Re-export commonly used types
pub use address::Address;
pub use amm::{Llamma, UserTicks, BORROWED, COLLATERAL};
pub use config::AmmConfig;
pub use error::{AmmError, Result};
pub use fixture::{approx, Fixture};
pub use proxy::{AmmProxy, TestToken};
pub use token::Token;

pub use band_math::{MAX_SKIP_TICKS, MAX_TICKS, WAD};
