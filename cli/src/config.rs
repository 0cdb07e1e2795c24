//! Scenario file loading

use anyhow::{Context, Result};
use llamma::config::amount;
use llamma::AmmConfig;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// One `[[deposits]]` entry: `user` indexes the fixture accounts
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DepositSpec {
    pub user: usize,
    #[serde(deserialize_with = "amount::deserialize")]
    pub amount: u128,
    pub n1: i32,
    pub n2: i32,
    /// Mint the collateral to the user before depositing
    #[serde(default = "default_true")]
    pub mint: bool,
}

/// One `[[trades]]` entry
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TradeSpec {
    pub user: usize,
    pub i: usize,
    pub j: usize,
    #[serde(deserialize_with = "amount::deserialize")]
    pub amount: u128,
    #[serde(default, deserialize_with = "amount::deserialize")]
    pub min_amount: u128,
    #[serde(default = "default_true")]
    pub mint: bool,
}

/// One `[[quotes]]` entry, evaluated after all trades
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuoteSpec {
    pub i: usize,
    pub j: usize,
    #[serde(deserialize_with = "amount::deserialize")]
    pub amount: u128,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub amm: AmmConfig,
    #[serde(default)]
    pub deposits: Vec<DepositSpec>,
    #[serde(default)]
    pub trades: Vec<TradeSpec>,
    #[serde(default)]
    pub quotes: Vec<QuoteSpec>,
}

impl Scenario {
    pub fn parse(text: &str) -> Result<Self> {
        let scenario: Scenario = toml::from_str(text).context("Failed to parse scenario TOML")?;
        scenario.amm.validate()?;
        Ok(scenario)
    }
}

/// Load a scenario; with no path the default AMM and no actions
pub fn load_scenario(path: Option<&Path>) -> Result<Scenario> {
    let Some(path) = path else {
        return Ok(Scenario::default());
    };
    if !path.exists() {
        anyhow::bail!("Config file not found: {}", path.display());
    }
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    Scenario::parse(&text).with_context(|| format!("Invalid config: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
        [amm]
        a = 100
        base_price = "3000000000000000000000"
        fee = "6000000000000000"

        [[deposits]]
        user = 1
        amount = "1000000000000000000"
        n1 = 1
        n2 = 5

        [[trades]]
        user = 7
        i = 0
        j = 1
        amount = 100

        [[quotes]]
        i = 1
        j = 0
        amount = "1_000_000_000_000"
    "#;

    #[test]
    fn test_parse_scenario() {
        let scenario = Scenario::parse(SAMPLE).unwrap();
        assert_eq!(scenario.amm.a, 100);
        assert_eq!(scenario.deposits.len(), 1);
        assert_eq!(scenario.deposits[0].amount, 1_000_000_000_000_000_000);
        assert!(scenario.deposits[0].mint);
        assert_eq!(scenario.trades[0].amount, 100);
        assert_eq!(scenario.trades[0].min_amount, 0);
        assert_eq!(scenario.quotes[0].amount, 1_000_000_000_000);
    }

    #[test]
    fn test_invalid_amm_rejected() {
        let err = Scenario::parse("[amm]\na = 1\n").unwrap_err();
        assert!(err.to_string().contains("invalid config"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let scenario = load_scenario(Some(file.path())).unwrap();
        assert_eq!(scenario.deposits[0].n2, 5);
    }

    #[test]
    fn test_missing_file() {
        let err = load_scenario(Some(Path::new("/nonexistent/llamma.toml"))).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_no_path_uses_defaults() {
        let scenario = load_scenario(None).unwrap();
        assert_eq!(scenario.amm, AmmConfig::default());
        assert!(scenario.deposits.is_empty());
    }
}
