//! Test fixture: a funded account set and a fresh AMM

use crate::{Address, AmmConfig, Llamma, Result};

/// Accounts handed out by a fixture; `accounts[0]` is the admin
pub const FIXTURE_ACCOUNTS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Fixture {
    pub accounts: Vec<Address>,
    pub amm: Llamma,
}

impl Fixture {
    pub fn new(config: &AmmConfig) -> Result<Self> {
        let accounts: Vec<Address> = (0..FIXTURE_ACCOUNTS).map(Address::from_index).collect();
        let amm = Llamma::new(config, accounts[0])?;
        Ok(Self { accounts, amm })
    }

    pub fn admin(&self) -> Address {
        self.accounts[0]
    }
}

/// Relative closeness on a log scale: `|ln(x1 / x2)| <= precision`
///
/// Any precision of 1 or more accepts. A zero on either side only matches
/// the other zero.
pub fn approx(x1: f64, x2: f64, precision: f64) -> bool {
    if precision >= 1.0 {
        return true;
    }
    if x1 == 0.0 || x2 == 0.0 {
        return x1 == x2;
    }
    (x1 / x2).ln().abs() <= precision
}
