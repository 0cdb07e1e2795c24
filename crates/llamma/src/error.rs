use band_math::MathError;
use thiserror::Error;

use crate::Address;

pub type Result<T> = std::result::Result<T, AmmError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmmError {
    #[error("caller {0} is not the admin")]
    Unauthorized(Address),

    #[error("invalid coin index {0}")]
    InvalidCoin(usize),

    #[error("invalid coin pair ({i}, {j})")]
    InvalidCoins { i: usize, j: usize },

    #[error("range of {width} bands exceeds the {max} band limit")]
    BandTooWide { width: i64, max: i32 },

    #[error("deposit into band {n1} at or below active band {active}")]
    DepositBelowActiveBand { n1: i32, active: i32 },

    #[error("band {n1} is {max} or more bands above active band {active}, out of quote reach")]
    DepositOutOfReach { n1: i32, active: i32, max: i32 },

    #[error("amount {amount} too low to spread over {bands} bands")]
    AmountTooLow { amount: u128, bands: u32 },

    #[error("user {0} already has liquidity")]
    AlreadyDeposited(Address),

    #[error("user {0} has no liquidity")]
    NoLiquidity(Address),

    #[error("deposit into band {0} would mint zero shares")]
    ZeroShares(i32),

    #[error("slippage: got {out}, wanted at least {min}")]
    Slippage { out: u128, min: u128 },

    #[error("{account} holds {available} {symbol}, needs {needed}")]
    InsufficientBalance {
        symbol: String,
        account: Address,
        needed: u128,
        available: u128,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("math error: {0}")]
    Math(#[from] MathError),
}
