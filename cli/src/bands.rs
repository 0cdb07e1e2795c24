//! Band price table

use anyhow::Result;
use colored::Colorize;
use llamma::{Address, Llamma, WAD};

use crate::config::Scenario;

const MAX_ROWS: i64 = 500;

/// Wad as a decimal with six fractional digits (truncated)
pub fn fmt_wad(v: u128) -> String {
    format!("{}.{:06}", v / WAD, (v % WAD) / 1_000_000_000_000)
}

/// Token amount with its decimals applied
pub fn fmt_units(v: u128, decimals: u8) -> String {
    if decimals == 0 {
        return v.to_string();
    }
    let scale = 10u128.pow(decimals as u32);
    format!("{}.{:0width$}", v / scale, v % scale, width = decimals as usize)
}

pub fn show_bands(scenario: &Scenario, from: i32, to: i32) -> Result<()> {
    if from > to {
        anyhow::bail!("--from {} is above --to {}", from, to);
    }
    if to as i64 - from as i64 >= MAX_ROWS {
        anyhow::bail!("at most {} bands per table", MAX_ROWS);
    }

    let amm = Llamma::new(&scenario.amm, Address::from_index(0))?;

    println!("{}", "=== Bands ===".bright_green().bold());
    println!(
        "{} A={} p_o={}",
        "AMM:".bright_cyan(),
        amm.a(),
        fmt_wad(amm.price_oracle())
    );
    println!(
        "{:>6}  {:>16}  {:>16}  {:>16}  {:>16}",
        "n", "oracle down", "oracle up", "current down", "current up"
    );
    for n in from..=to {
        let row = format!(
            "{:>6}  {:>16}  {:>16}  {:>16}  {:>16}",
            n,
            fmt_wad(amm.p_oracle_down(n)?),
            fmt_wad(amm.p_oracle_up(n)?),
            fmt_wad(amm.p_current_down(n)?),
            fmt_wad(amm.p_current_up(n)?),
        );
        if n == amm.active_band() {
            println!("{}", row.bold());
        } else {
            println!("{}", row);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_wad() {
        assert_eq!(fmt_wad(3000 * WAD), "3000.000000");
        assert_eq!(fmt_wad(WAD / 2 + 7), "0.500000");
        assert_eq!(fmt_wad(1_234_567_000_000_000_000), "1.234567");
    }

    #[test]
    fn test_fmt_units() {
        assert_eq!(fmt_units(100, 6), "0.000100");
        assert_eq!(fmt_units(2_500_000, 6), "2.500000");
        assert_eq!(fmt_units(42, 0), "42");
    }

    #[test]
    fn test_show_bands_rejects_bad_range() {
        let scenario = Scenario::default();
        assert!(show_bands(&scenario, 5, 1).is_err());
        assert!(show_bands(&scenario, 0, 10_000).is_err());
        assert!(show_bands(&scenario, -3, 3).is_ok());
    }
}
