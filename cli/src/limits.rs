//! Seeded quote-limit check
//!
//! Each round builds a fresh AMM, lets five accounts deposit random
//! amounts over random ranges above the active band, then quotes a tiny
//! borrowed-in trade. The collateral out must stay within
//! `4e-2 + 2 * min(n1) / A` (log scale) of the oracle price.

use anyhow::{Context, Result};
use colored::Colorize;
use llamma::{approx, Fixture, BORROWED, COLLATERAL, WAD};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::Scenario;

const DEPOSITORS: usize = 5;
const MAX_N1: i32 = 20;
const MAX_WIDTH: i32 = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct Round {
    pub amounts: [u128; DEPOSITORS],
    pub ns: [i32; DEPOSITORS],
    pub dns: [i32; DEPOSITORS],
}

impl Round {
    /// Amounts span 0.01 to 1e6 collateral tokens
    fn draw(rng: &mut StdRng, collateral_decimals: u8) -> Self {
        let unit = 10u128.pow(collateral_decimals as u32);
        let lo = (unit / 100).max(MAX_WIDTH as u128 + 1);
        let hi = unit * 1_000_000;
        let mut round = Round {
            amounts: [0; DEPOSITORS],
            ns: [0; DEPOSITORS],
            dns: [0; DEPOSITORS],
        };
        for k in 0..DEPOSITORS {
            round.amounts[k] = rng.gen_range(lo..=hi);
            round.ns[k] = rng.gen_range(1..=MAX_N1);
            round.dns[k] = rng.gen_range(0..=MAX_WIDTH);
        }
        round
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outcome {
    pub dx: u128,
    pub dy: u128,
    pub expected: f64,
    pub precision: f64,
}

impl Outcome {
    /// Log-scale distance from the expectation
    pub fn deviation(&self) -> f64 {
        if self.dy == 0 || self.expected == 0.0 {
            return f64::INFINITY;
        }
        (self.dy as f64 / self.expected).ln().abs()
    }

    pub fn passed(&self) -> bool {
        approx(self.dy as f64, self.expected, self.precision)
    }
}

/// Mint each depositor its amount and deposit all of it
///
/// A depositor left holding collateral afterwards fails the round.
fn deposit_round(fx: &mut Fixture, round: &Round) -> Result<()> {
    let admin = fx.admin();
    let users = fx.accounts[1..=DEPOSITORS].to_vec();

    for (k, user) in users.into_iter().enumerate() {
        let (n1, n2) = (round.ns[k], round.ns[k] + round.dns[k]);
        fx.amm
            .collateral_token_mut()
            .mint_for_testing(user, round.amounts[k])?;
        fx.amm
            .deposit_range(admin, user, round.amounts[k], n1, n2, true)
            .with_context(|| format!("deposit of {} into [{}, {}]", round.amounts[k], n1, n2))?;
        let left = fx.amm.collateral_token().balance_of(user);
        if left != 0 {
            anyhow::bail!("depositor {} still holds {} collateral after depositing", k, left);
        }
    }
    Ok(())
}

/// Apply one round's deposits to a fresh AMM and quote `amount` borrowed in
pub fn run_round(scenario: &Scenario, round: &Round, amount: u128) -> Result<Outcome> {
    let mut fx = Fixture::new(&scenario.amm)?;
    deposit_round(&mut fx, round)?;

    let (zx, zy) = fx.amm.get_dxdy(BORROWED, COLLATERAL, 0)?;
    if zx != 0 || zy != 0 {
        anyhow::bail!("zero quote gave ({}, {})", zx, zy);
    }

    let (dx, dy) = fx.amm.get_dxdy(BORROWED, COLLATERAL, amount)?;
    let decimals_shift = scenario.amm.collateral_decimals as i32 - scenario.amm.borrowed_decimals as i32;
    let price = fx.amm.price_oracle() as f64 / WAD as f64;
    let expected = dx as f64 * 10f64.powi(decimals_shift) / price;

    let min_n = round.ns.iter().copied().min().unwrap_or(0);
    let precision = 4e-2 + 2.0 * min_n as f64 / fx.amm.a() as f64;

    Ok(Outcome {
        dx,
        dy,
        expected,
        precision,
    })
}

pub fn check_limits(scenario: &Scenario, seed: u64, rounds: u32, amount: u128) -> Result<()> {
    println!("{}", "=== Check Quote Limits ===".bright_green().bold());
    println!("{} {}", "Seed:".bright_cyan(), seed);
    println!("{} {}", "Rounds:".bright_cyan(), rounds);
    println!("{} {}", "Quote amount:".bright_cyan(), amount);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut worst: Option<(u32, f64, f64)> = None;

    for r in 0..rounds {
        let round = Round::draw(&mut rng, scenario.amm.collateral_decimals);
        let outcome = run_round(scenario, &round, amount).with_context(|| format!("round {}", r))?;
        debug!("round {}: {:?} -> {:?}", r, round, outcome);

        if outcome.dx != amount {
            anyhow::bail!(
                "round {}: quote consumed {} of {} ({:?})",
                r,
                outcome.dx,
                amount,
                round
            );
        }
        if !outcome.passed() {
            println!("{} round {}", "FAIL".red().bold(), r);
            anyhow::bail!(
                "round {}: dy={} expected~{:.0} precision={:.4} ({:?})",
                r,
                outcome.dy,
                outcome.expected,
                outcome.precision,
                round
            );
        }

        let margin = outcome.deviation() / outcome.precision;
        if worst.map_or(true, |(_, m, _)| margin > m) {
            worst = Some((r, margin, outcome.deviation()));
        }
    }

    println!("{} {}/{} rounds passed", "OK".green().bold(), rounds, rounds);
    if let Some((r, margin, dev)) = worst {
        println!(
            "{} round {} used {:.1}% of its tolerance (deviation {:.5})",
            "Closest:".bright_cyan(),
            r,
            margin * 100.0,
            dev
        );
    }
    Ok(())
}
