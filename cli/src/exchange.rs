//! Scenario replay: deposits, then trades, then quotes

use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use llamma::{Address, Fixture, Llamma};

use crate::bands::{fmt_units, fmt_wad};
use crate::config::Scenario;

fn account(fx: &Fixture, idx: usize) -> Result<Address> {
    fx.accounts
        .get(idx)
        .copied()
        .ok_or_else(|| anyhow!("account index {} out of range (0..{})", idx, fx.accounts.len()))
}

fn symbol(amm: &Llamma, i: usize) -> Result<(String, u8)> {
    let token = amm.coins(i)?;
    Ok((token.symbol().to_string(), token.decimals()))
}

/// Apply the scenario to a fresh fixture and return it
pub fn apply_scenario(scenario: &Scenario) -> Result<Fixture> {
    let mut fx = Fixture::new(&scenario.amm)?;
    let admin = fx.admin();
    let (c_sym, c_dec) = symbol(&fx.amm, llamma::COLLATERAL)?;

    for (k, d) in scenario.deposits.iter().enumerate() {
        let user = account(&fx, d.user)?;
        if d.mint {
            fx.amm.collateral_token_mut().mint_for_testing(user, d.amount)?;
        }
        fx.amm
            .deposit_range(admin, user, d.amount, d.n1, d.n2, true)
            .with_context(|| format!("deposit #{} for account {}", k, d.user))?;
        println!(
            "{} account {} put {} {} into bands [{}, {}]",
            "Deposit:".bright_cyan(),
            d.user,
            fmt_units(d.amount, c_dec),
            c_sym,
            d.n1.min(d.n2),
            d.n1.max(d.n2)
        );
    }

    for (k, t) in scenario.trades.iter().enumerate() {
        let user = account(&fx, t.user)?;
        if t.mint {
            fx.amm.token_mut(t.i)?.mint_for_testing(user, t.amount)?;
        }
        let (dx, dy) = fx
            .amm
            .exchange(user, t.i, t.j, t.amount, t.min_amount)
            .with_context(|| format!("trade #{} for account {}", k, t.user))?;
        let (in_sym, in_dec) = symbol(&fx.amm, t.i)?;
        let (out_sym, out_dec) = symbol(&fx.amm, t.j)?;
        println!(
            "{} account {} paid {} {} for {} {}",
            "Trade:".bright_cyan(),
            t.user,
            fmt_units(dx, in_dec),
            in_sym,
            fmt_units(dy, out_dec),
            out_sym
        );
    }

    Ok(fx)
}

pub fn run_scenario(scenario: &Scenario) -> Result<()> {
    println!("{}", "=== Run Scenario ===".bright_green().bold());
    let fx = apply_scenario(scenario)?;
    let amm = &fx.amm;
    let (b_sym, b_dec) = symbol(amm, llamma::BORROWED)?;
    let (c_sym, c_dec) = symbol(amm, llamma::COLLATERAL)?;

    println!("\n{}", "=== State ===".bright_green().bold());
    println!("{} {}", "Active band:".bright_cyan(), amm.active_band());
    println!("{} {}", "Price:".bright_cyan(), fmt_wad(amm.get_p()?));
    println!("{:>6}  {:>24}  {:>24}", "n", b_sym, c_sym);
    for n in amm.min_band()..=amm.max_band() {
        let (x, y) = (amm.bands_x(n), amm.bands_y(n));
        if x == 0 && y == 0 {
            continue;
        }
        println!(
            "{:>6}  {:>24}  {:>24}",
            n,
            fmt_units(x, b_dec),
            fmt_units(y, c_dec)
        );
    }

    if !scenario.quotes.is_empty() {
        println!("\n{}", "=== Quotes ===".bright_green().bold());
    }
    for q in &scenario.quotes {
        let (dx, dy) = amm.get_dxdy(q.i, q.j, q.amount)?;
        let (in_sym, in_dec) = symbol(amm, q.i)?;
        let (out_sym, out_dec) = symbol(amm, q.j)?;
        println!(
            "{} {} {} -> {} {}",
            "get_dxdy:".bright_cyan(),
            fmt_units(dx, in_dec),
            in_sym,
            fmt_units(dy, out_dec),
            out_sym
        );
    }

    let mut printed = false;
    for (idx, user) in fx.accounts.iter().enumerate() {
        if !amm.has_liquidity(*user) {
            continue;
        }
        if !printed {
            println!("\n{}", "=== Positions ===".bright_green().bold());
            printed = true;
        }
        let (n1, n2) = amm.read_user_tick_numbers(*user)?;
        let (x, y) = amm.get_sum_xy(*user)?;
        println!(
            "{} account {} bands [{}, {}]: {} {} + {} {}",
            "Position:".bright_cyan(),
            idx,
            n1,
            n2,
            fmt_units(x, b_dec),
            b_sym,
            fmt_units(y, c_dec),
            c_sym
        );
    }
    Ok(())
}
