//! Call surface a property test needs from an AMM under test
//!
//! Tests written against these traits do not care whether the AMM is the
//! in-memory model or something reached over a wire.

use crate::{Address, Llamma, Result, Token};

pub trait TestToken {
    fn mint_for_testing(&mut self, to: Address, amount: u128) -> Result<()>;
    fn balance_of(&self, who: Address) -> u128;
}

pub trait AmmProxy {
    type Collateral: TestToken;

    /// Collateral token the AMM pulls deposits from
    fn collateral(&mut self) -> &mut Self::Collateral;

    fn deposit_range(
        &mut self,
        caller: Address,
        user: Address,
        amount: u128,
        n1: i32,
        n2: i32,
        move_coins: bool,
    ) -> Result<()>;

    fn get_dxdy(&self, i: usize, j: usize, dx: u128) -> Result<(u128, u128)>;

    /// Amplification parameter
    fn a(&self) -> u128;
}

impl TestToken for Token {
    fn mint_for_testing(&mut self, to: Address, amount: u128) -> Result<()> {
        Token::mint_for_testing(self, to, amount)
    }

    fn balance_of(&self, who: Address) -> u128 {
        Token::balance_of(self, who)
    }
}

impl AmmProxy for Llamma {
    type Collateral = Token;

    fn collateral(&mut self) -> &mut Token {
        self.collateral_token_mut()
    }

    fn deposit_range(
        &mut self,
        caller: Address,
        user: Address,
        amount: u128,
        n1: i32,
        n2: i32,
        move_coins: bool,
    ) -> Result<()> {
        Llamma::deposit_range(self, caller, user, amount, n1, n2, move_coins)
    }

    fn get_dxdy(&self, i: usize, j: usize, dx: u128) -> Result<(u128, u128)> {
        Llamma::get_dxdy(self, i, j, dx)
    }

    fn a(&self) -> u128 {
        Llamma::a(self)
    }
}
