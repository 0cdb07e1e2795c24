//! LLAMMA CLI - inspect and exercise the banded AMM model
//!
//! Every command builds a fresh in-memory AMM from a scenario TOML file
//! (or the built-in defaults) and works on it locally.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

mod bands;
mod config;
mod exchange;
mod limits;

#[derive(Parser)]
#[command(name = "llamma")]
#[command(about = "LLAMMA CLI - inspect bands, replay scenarios, check quote limits", long_about = None)]
#[command(version)]
struct Cli {
    /// Scenario TOML file (AMM parameters, deposits, trades, quotes)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show oracle and current price edges for a range of bands
    Bands {
        /// First band
        #[arg(long, default_value_t = -2, allow_negative_numbers = true)]
        from: i32,

        /// Last band
        #[arg(long, default_value_t = 10, allow_negative_numbers = true)]
        to: i32,
    },

    /// Replay the deposits, trades and quotes of the scenario
    Run,

    /// Randomised check that a tiny quote prices near the nearest deposited band
    CheckLimits {
        /// RNG seed
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Number of fresh AMMs to try
        #[arg(long, default_value_t = 100)]
        rounds: u32,

        /// Borrowed amount to quote, in token units
        #[arg(long, default_value_t = 100)]
        amount: u128,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let scenario = config::load_scenario(cli.config.as_deref())?;

    if cli.verbose {
        let amm = &scenario.amm;
        match &cli.config {
            Some(path) => println!("{} {}", "Config:".bright_cyan(), path.display()),
            None => println!("{} built-in defaults", "Config:".bright_cyan()),
        }
        println!("{} {}", "A:".bright_cyan(), amm.a);
        println!("{} {}", "Base price:".bright_cyan(), bands::fmt_wad(amm.base_price));
        println!("{} {}", "Oracle price:".bright_cyan(), bands::fmt_wad(amm.price_oracle()));
        println!("{} {}", "Fee:".bright_cyan(), bands::fmt_wad(amm.fee));
        println!(
            "{} {} ({} decimals) / {} ({} decimals)",
            "Coins:".bright_cyan(),
            amm.borrowed_symbol,
            amm.borrowed_decimals,
            amm.collateral_symbol,
            amm.collateral_decimals
        );
    }

    match cli.command {
        Commands::Bands { from, to } => {
            bands::show_bands(&scenario, from, to)?;
        }
        Commands::Run => {
            exchange::run_scenario(&scenario)?;
        }
        Commands::CheckLimits { seed, rounds, amount } => {
            limits::check_limits(&scenario, seed, rounds, amount)?;
        }
    }

    Ok(())
}
