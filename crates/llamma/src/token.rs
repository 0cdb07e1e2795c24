//! ERC20-like token ledger with a test-only mint

use std::collections::BTreeMap;

use band_math::MathError;

use crate::{Address, AmmError, Result};

#[derive(Debug, Clone)]
pub struct Token {
    symbol: String,
    decimals: u8,
    balances: BTreeMap<Address, u128>,
    total_supply: u128,
}

impl Token {
    pub fn new(symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            symbol: symbol.into(),
            decimals,
            balances: BTreeMap::new(),
            total_supply: 0,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    pub fn balance_of(&self, who: Address) -> u128 {
        self.balances.get(&who).copied().unwrap_or(0)
    }

    /// Create `amount` out of thin air for `to`
    pub fn mint_for_testing(&mut self, to: Address, amount: u128) -> Result<()> {
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(MathError::Overflow)?;
        let balance = self.balance_of(to) + amount;
        self.total_supply = supply;
        self.balances.insert(to, balance);
        Ok(())
    }

    pub fn transfer(&mut self, from: Address, to: Address, amount: u128) -> Result<()> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(AmmError::InsufficientBalance {
                symbol: self.symbol.clone(),
                account: from,
                needed: amount,
                available,
            });
        }
        if amount == 0 || from == to {
            return Ok(());
        }
        self.balances.insert(from, available - amount);
        *self.balances.entry(to).or_insert(0) += amount;
        Ok(())
    }
}
