//! Banded AMM state and operations
//!
//! Bands above the active band (larger `n`) hold only collateral, bands
//! below it hold only the borrowed asset, and the active band may hold both.
//! Deposits therefore go strictly above the active band.
//!
//! Reserves are kept as wads; token amounts are scaled by each token's
//! precision on the way in. Quotes round the consumed input up and the
//! output down, so the AMM's token balances always cover its bands.

use std::collections::BTreeMap;

use band_math::fixed::{mul_div, to_u128, U256};
use band_math::{BandCurve, MathError, Step, MAX_SKIP_TICKS, MAX_TICKS, WAD};
use log::{debug, info};

use crate::{Address, AmmConfig, AmmError, Result, Token};

/// Coin index of the borrowed asset
pub const BORROWED: usize = 0;

/// Coin index of the collateral asset
pub const COLLATERAL: usize = 1;

/// A user's position: one share balance per band in `[n1, n2]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserTicks {
    pub n1: i32,
    pub n2: i32,
    pub shares: Vec<u128>,
}

impl UserTicks {
    pub fn bands(&self) -> impl Iterator<Item = (i32, u128)> + '_ {
        (self.n1..=self.n2).zip(self.shares.iter().copied())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Band {
    x: u128,
    y: u128,
    total_shares: u128,
}

/// Result of walking the bands for one trade
#[derive(Debug, Clone, Default)]
struct SwapPlan {
    /// Input absorbed, wad, fee included
    in_amount: u128,
    /// Output released, wad
    out_amount: u128,
    /// Band the walk ended in
    n2: i32,
    /// New (x, y) of every band the trade touches
    touched: Vec<(i32, u128, u128)>,
}

#[derive(Debug, Clone)]
pub struct Llamma {
    a: u128,
    base_price: u128,
    price_oracle: u128,
    fee: u128,
    admin: Address,
    address: Address,
    precisions: [u128; 2],
    tokens: [Token; 2],
    active_band: i32,
    min_band: i32,
    max_band: i32,
    bands: BTreeMap<i32, Band>,
    users: BTreeMap<Address, UserTicks>,
}

impl Llamma {
    pub fn new(config: &AmmConfig, admin: Address) -> Result<Self> {
        config.validate()?;
        let borrowed = Token::new(config.borrowed_symbol.clone(), config.borrowed_decimals);
        let collateral = Token::new(config.collateral_symbol.clone(), config.collateral_decimals);
        let precisions = [
            10u128.pow(18 - config.borrowed_decimals as u32),
            10u128.pow(18 - config.collateral_decimals as u32),
        ];

        info!(
            "new AMM A={} base_price={} p_o={} fee={} coins={}/{}",
            config.a,
            config.base_price,
            config.price_oracle(),
            config.fee,
            borrowed.symbol(),
            collateral.symbol()
        );

        Ok(Self {
            a: config.a,
            base_price: config.base_price,
            price_oracle: config.price_oracle(),
            fee: config.fee,
            admin,
            address: Address::contract(0),
            precisions,
            tokens: [borrowed, collateral],
            active_band: 0,
            min_band: 0,
            max_band: 0,
            bands: BTreeMap::new(),
            users: BTreeMap::new(),
        })
    }

    // ------------------------------------------------------------------
    // Parameters and state
    // ------------------------------------------------------------------

    /// Amplification parameter
    pub fn a(&self) -> u128 {
        self.a
    }

    pub fn fee(&self) -> u128 {
        self.fee
    }

    pub fn price_oracle(&self) -> u128 {
        self.price_oracle
    }

    pub fn base_price(&self) -> u128 {
        self.base_price
    }

    pub fn admin(&self) -> Address {
        self.admin
    }

    /// Account that holds the AMM's tokens
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn active_band(&self) -> i32 {
        self.active_band
    }

    pub fn min_band(&self) -> i32 {
        self.min_band
    }

    pub fn max_band(&self) -> i32 {
        self.max_band
    }

    pub fn coins(&self, i: usize) -> Result<&Token> {
        self.tokens.get(i).ok_or(AmmError::InvalidCoin(i))
    }

    pub fn token_mut(&mut self, i: usize) -> Result<&mut Token> {
        self.tokens.get_mut(i).ok_or(AmmError::InvalidCoin(i))
    }

    pub fn borrowed_token(&self) -> &Token {
        &self.tokens[BORROWED]
    }

    pub fn borrowed_token_mut(&mut self) -> &mut Token {
        &mut self.tokens[BORROWED]
    }

    pub fn collateral_token(&self) -> &Token {
        &self.tokens[COLLATERAL]
    }

    pub fn collateral_token_mut(&mut self) -> &mut Token {
        &mut self.tokens[COLLATERAL]
    }

    /// Borrowed reserve of band `n`, token units
    pub fn bands_x(&self, n: i32) -> u128 {
        self.band(n).x / self.precisions[BORROWED]
    }

    /// Collateral reserve of band `n`, token units
    pub fn bands_y(&self, n: i32) -> u128 {
        self.band(n).y / self.precisions[COLLATERAL]
    }

    pub fn total_shares(&self, n: i32) -> u128 {
        self.band(n).total_shares
    }

    fn band(&self, n: i32) -> Band {
        self.bands.get(&n).copied().unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Prices
    // ------------------------------------------------------------------

    pub fn p_oracle_up(&self, n: i32) -> Result<u128> {
        Ok(band_math::p_oracle_up(self.base_price, self.a, n)?)
    }

    pub fn p_oracle_down(&self, n: i32) -> Result<u128> {
        Ok(band_math::p_oracle_down(self.base_price, self.a, n)?)
    }

    pub fn p_current_up(&self, n: i32) -> Result<u128> {
        Ok(band_math::p_current_up(self.price_oracle, self.base_price, self.a, n)?)
    }

    pub fn p_current_down(&self, n: i32) -> Result<u128> {
        Ok(band_math::p_current_down(self.price_oracle, self.base_price, self.a, n)?)
    }

    /// Marginal price of the active band, borrowed per collateral (wad)
    pub fn get_p(&self) -> Result<u128> {
        let n = self.active_band;
        let band = self.band(n);
        if band.x == 0 && band.y == 0 {
            return self.p_current_down(n);
        }
        let curve = BandCurve::new(band.x, band.y, self.price_oracle, self.p_oracle_up(n)?, self.a)?;
        let num = curve.f.checked_add(curve.x).ok_or(MathError::Overflow)?;
        let den = curve.g.checked_add(curve.y).ok_or(MathError::Overflow)?;
        Ok(to_u128(mul_div(num, U256::from(WAD), den)?)?)
    }

    // ------------------------------------------------------------------
    // Admin
    // ------------------------------------------------------------------

    fn only_admin(&self, caller: Address) -> Result<()> {
        if caller != self.admin {
            return Err(AmmError::Unauthorized(caller));
        }
        Ok(())
    }

    pub fn set_price_oracle(&mut self, caller: Address, p: u128) -> Result<()> {
        self.only_admin(caller)?;
        if p == 0 {
            return Err(AmmError::InvalidConfig("price oracle must be positive".into()));
        }
        info!("price oracle {} -> {}", self.price_oracle, p);
        self.price_oracle = p;
        Ok(())
    }

    pub fn set_fee(&mut self, caller: Address, fee: u128) -> Result<()> {
        self.only_admin(caller)?;
        if fee >= WAD {
            return Err(AmmError::InvalidConfig(format!("fee {} must be below {}", fee, WAD)));
        }
        info!("fee {} -> {}", self.fee, fee);
        self.fee = fee;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Liquidity
    // ------------------------------------------------------------------

    /// Spread `amount` of collateral for `user` evenly over bands `[n1, n2]`
    ///
    /// The first band takes the rounding remainder so the whole amount is
    /// placed. With `move_coins` the collateral is pulled from `user`.
    pub fn deposit_range(
        &mut self,
        caller: Address,
        user: Address,
        amount: u128,
        n1: i32,
        n2: i32,
        move_coins: bool,
    ) -> Result<()> {
        self.only_admin(caller)?;
        let (n1, n2) = if n1 > n2 { (n2, n1) } else { (n1, n2) };

        let width = n2 as i64 - n1 as i64 + 1;
        if width > MAX_TICKS as i64 {
            return Err(AmmError::BandTooWide { width, max: MAX_TICKS });
        }
        if n1 <= self.active_band {
            return Err(AmmError::DepositBelowActiveBand { n1, active: self.active_band });
        }
        // A quote walks at most MAX_SKIP_TICKS bands starting at the active one
        if n1 as i64 - self.active_band as i64 >= MAX_SKIP_TICKS as i64 {
            return Err(AmmError::DepositOutOfReach {
                n1,
                active: self.active_band,
                max: MAX_SKIP_TICKS,
            });
        }
        // Both ends must be priceable
        self.p_oracle_up(n1)?;
        self.p_oracle_down(n2)?;
        if self.users.contains_key(&user) {
            return Err(AmmError::AlreadyDeposited(user));
        }
        let count = width as u32;
        if amount < count as u128 {
            return Err(AmmError::AmountTooLow { amount, bands: count });
        }

        let total = amount
            .checked_mul(self.precisions[COLLATERAL])
            .ok_or(MathError::Overflow)?;
        let per_band = total / count as u128;
        let remainder = total - per_band * count as u128;

        let mut updated = Vec::with_capacity(count as usize);
        let mut shares = Vec::with_capacity(count as usize);
        for (k, n) in (n1..=n2).enumerate() {
            let y = if k == 0 { per_band + remainder } else { per_band };
            let band = self.band(n);
            let ds = if band.total_shares == 0 {
                y
            } else if band.y == 0 {
                return Err(AmmError::ZeroShares(n));
            } else {
                to_u128(mul_div(
                    U256::from(band.total_shares),
                    U256::from(y),
                    U256::from(band.y),
                )?)?
            };
            if ds == 0 {
                return Err(AmmError::ZeroShares(n));
            }
            updated.push((
                n,
                Band {
                    x: band.x,
                    y: band.y.checked_add(y).ok_or(MathError::Overflow)?,
                    total_shares: band.total_shares.checked_add(ds).ok_or(MathError::Overflow)?,
                },
            ));
            shares.push(ds);
        }

        if move_coins {
            let amm = self.address;
            self.tokens[COLLATERAL].transfer(user, amm, amount)?;
        }

        for (n, band) in updated {
            self.bands.insert(n, band);
        }
        self.users.insert(user, UserTicks { n1, n2, shares });
        self.min_band = self.min_band.min(n1);
        self.max_band = self.max_band.max(n2);

        info!("deposit user={} amount={} bands=[{}, {}]", user, amount, n1, n2);
        Ok(())
    }

    /// Redeem every share `user` holds; returns (borrowed, collateral) in token units
    pub fn withdraw(&mut self, caller: Address, user: Address, move_coins: bool) -> Result<(u128, u128)> {
        self.only_admin(caller)?;
        let ticks = self.users.get(&user).ok_or(AmmError::NoLiquidity(user))?;
        let (updated, x, y) = self.redeem(ticks)?;
        let x = x / self.precisions[BORROWED];
        let y = y / self.precisions[COLLATERAL];

        if move_coins {
            self.ensure_balance(BORROWED, self.address, x)?;
            self.ensure_balance(COLLATERAL, self.address, y)?;
            let amm = self.address;
            self.tokens[BORROWED].transfer(amm, user, x)?;
            self.tokens[COLLATERAL].transfer(amm, user, y)?;
        }

        for (n, band) in updated {
            if band.total_shares == 0 {
                self.bands.remove(&n);
            } else {
                self.bands.insert(n, band);
            }
        }
        self.users.remove(&user);

        info!("withdraw user={} x={} y={}", user, x, y);
        Ok((x, y))
    }

    /// Band states after removing `ticks`, and the wad amounts released
    fn redeem(&self, ticks: &UserTicks) -> Result<(Vec<(i32, Band)>, u128, u128)> {
        let mut updated = Vec::with_capacity(ticks.shares.len());
        let mut x_total = 0u128;
        let mut y_total = 0u128;
        for (n, ds) in ticks.bands() {
            let band = self.band(n);
            let s = U256::from(band.total_shares);
            let dx = to_u128(mul_div(U256::from(band.x), U256::from(ds), s)?)?;
            let dy = to_u128(mul_div(U256::from(band.y), U256::from(ds), s)?)?;
            x_total = x_total.checked_add(dx).ok_or(MathError::Overflow)?;
            y_total = y_total.checked_add(dy).ok_or(MathError::Overflow)?;
            updated.push((
                n,
                Band {
                    x: band.x - dx,
                    y: band.y - dy,
                    total_shares: band.total_shares - ds,
                },
            ));
        }
        Ok((updated, x_total, y_total))
    }

    pub fn has_liquidity(&self, user: Address) -> bool {
        self.users.contains_key(&user)
    }

    pub fn user_shares(&self, user: Address) -> Option<&UserTicks> {
        self.users.get(&user)
    }

    pub fn read_user_tick_numbers(&self, user: Address) -> Result<(i32, i32)> {
        let ticks = self.users.get(&user).ok_or(AmmError::NoLiquidity(user))?;
        Ok((ticks.n1, ticks.n2))
    }

    /// What `user` would get back right now, (borrowed, collateral) in token units
    pub fn get_sum_xy(&self, user: Address) -> Result<(u128, u128)> {
        let ticks = self.users.get(&user).ok_or(AmmError::NoLiquidity(user))?;
        let (_, x, y) = self.redeem(ticks)?;
        Ok((x / self.precisions[BORROWED], y / self.precisions[COLLATERAL]))
    }

    // ------------------------------------------------------------------
    // Trading
    // ------------------------------------------------------------------

    /// `true` for pump (borrowed in), `false` for dump (collateral in)
    fn check_coins(i: usize, j: usize) -> Result<bool> {
        match (i, j) {
            (BORROWED, COLLATERAL) => Ok(true),
            (COLLATERAL, BORROWED) => Ok(false),
            _ => Err(AmmError::InvalidCoins { i, j }),
        }
    }

    fn calc_swap_out(&self, pump: bool, in_amount: u128) -> Result<SwapPlan> {
        let mut plan = SwapPlan {
            n2: self.active_band,
            ..Default::default()
        };
        let mut in_left = in_amount;
        let mut n = self.active_band;

        for _ in 0..MAX_SKIP_TICKS {
            let band = self.band(n);
            let curve = BandCurve::new(band.x, band.y, self.price_oracle, self.p_oracle_up(n)?, self.a)?;
            let step = if pump {
                curve.pump(in_left, self.fee)?
            } else {
                curve.dump(in_left, self.fee)?
            };
            plan.n2 = n;

            match step {
                Step::Partial { out } => {
                    let (x, y) = if pump {
                        (checked_add(band.x, in_left)?, band.y - out)
                    } else {
                        (band.x - out, checked_add(band.y, in_left)?)
                    };
                    plan.touched.push((n, x, y));
                    plan.in_amount = checked_add(plan.in_amount, in_left)?;
                    plan.out_amount = checked_add(plan.out_amount, out)?;
                    break;
                }
                Step::Filled { used, out } => {
                    if used > 0 || out > 0 {
                        let (x, y) = if pump {
                            (checked_add(band.x, used)?, 0)
                        } else {
                            (0, checked_add(band.y, used)?)
                        };
                        plan.touched.push((n, x, y));
                        plan.in_amount = checked_add(plan.in_amount, used)?;
                        plan.out_amount = checked_add(plan.out_amount, out)?;
                        in_left -= used;
                    }
                }
            }

            if pump {
                if n >= self.max_band {
                    break;
                }
                n += 1;
            } else {
                if n <= self.min_band {
                    break;
                }
                n -= 1;
            }
        }

        debug!(
            "swap walk pump={} in={} used={} out={} bands {}..{}",
            pump, in_amount, plan.in_amount, plan.out_amount, self.active_band, plan.n2
        );
        Ok(plan)
    }

    /// Quote a trade of `in_amount` of coin `i` for coin `j`
    ///
    /// Returns `(dx, dy)`: input actually consumed (may be less than asked
    /// when liquidity runs out) and output, both in token units.
    pub fn get_dxdy(&self, i: usize, j: usize, in_amount: u128) -> Result<(u128, u128)> {
        let pump = Self::check_coins(i, j)?;
        let in_wad = in_amount
            .checked_mul(self.precisions[i])
            .ok_or(MathError::Overflow)?;
        let plan = self.calc_swap_out(pump, in_wad)?;
        Ok((
            div_up(plan.in_amount, self.precisions[i]),
            plan.out_amount / self.precisions[j],
        ))
    }

    /// Execute a trade for `caller`; fails with `Slippage` below `min_amount`
    pub fn exchange(
        &mut self,
        caller: Address,
        i: usize,
        j: usize,
        in_amount: u128,
        min_amount: u128,
    ) -> Result<(u128, u128)> {
        let pump = Self::check_coins(i, j)?;
        if in_amount == 0 {
            return Ok((0, 0));
        }
        let in_wad = in_amount
            .checked_mul(self.precisions[i])
            .ok_or(MathError::Overflow)?;
        let plan = self.calc_swap_out(pump, in_wad)?;
        let dx = div_up(plan.in_amount, self.precisions[i]);
        let dy = plan.out_amount / self.precisions[j];
        if dy < min_amount {
            return Err(AmmError::Slippage { out: dy, min: min_amount });
        }
        if dx == 0 {
            return Ok((0, 0));
        }

        self.ensure_balance(i, caller, dx)?;
        self.ensure_balance(j, self.address, dy)?;
        let amm = self.address;
        self.tokens[i].transfer(caller, amm, dx)?;
        self.tokens[j].transfer(amm, caller, dy)?;

        for (n, x, y) in plan.touched {
            let band = self.bands.entry(n).or_default();
            band.x = x;
            band.y = y;
        }
        self.active_band = plan.n2;

        info!(
            "exchange caller={} {} {} -> {} {} active_band={}",
            caller,
            dx,
            self.tokens[i].symbol(),
            dy,
            self.tokens[j].symbol(),
            self.active_band
        );
        Ok((dx, dy))
    }

    fn ensure_balance(&self, i: usize, who: Address, needed: u128) -> Result<()> {
        let token = &self.tokens[i];
        let available = token.balance_of(who);
        if available < needed {
            return Err(AmmError::InsufficientBalance {
                symbol: token.symbol().to_string(),
                account: who,
                needed,
                available,
            });
        }
        Ok(())
    }
}

#[inline]
fn checked_add(a: u128, b: u128) -> Result<u128> {
    Ok(a.checked_add(b).ok_or(MathError::Overflow)?)
}

#[inline]
fn div_up(a: u128, b: u128) -> u128 {
    a / b + u128::from(a % b != 0)
}
