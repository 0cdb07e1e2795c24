//! AMM construction parameters

use serde::Deserialize;

use crate::{AmmError, Result, WAD};

fn default_a() -> u128 {
    100
}

fn default_base_price() -> u128 {
    3000 * WAD
}

fn default_fee() -> u128 {
    6 * WAD / 1000
}

fn default_borrowed_symbol() -> String {
    "USD".to_string()
}

fn default_borrowed_decimals() -> u8 {
    6
}

fn default_collateral_symbol() -> String {
    "WETH".to_string()
}

fn default_collateral_decimals() -> u8 {
    18
}

/// Parameters of one AMM instance
///
/// Prices and the fee are wads. `price_oracle` falls back to `base_price`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AmmConfig {
    #[serde(default = "default_a")]
    pub a: u128,
    #[serde(default = "default_base_price", deserialize_with = "amount::deserialize")]
    pub base_price: u128,
    #[serde(default, deserialize_with = "amount::deserialize_opt")]
    pub price_oracle: Option<u128>,
    #[serde(default = "default_fee", deserialize_with = "amount::deserialize")]
    pub fee: u128,
    #[serde(default = "default_borrowed_symbol")]
    pub borrowed_symbol: String,
    #[serde(default = "default_borrowed_decimals")]
    pub borrowed_decimals: u8,
    #[serde(default = "default_collateral_symbol")]
    pub collateral_symbol: String,
    #[serde(default = "default_collateral_decimals")]
    pub collateral_decimals: u8,
}

impl Default for AmmConfig {
    fn default() -> Self {
        Self {
            a: default_a(),
            base_price: default_base_price(),
            price_oracle: None,
            fee: default_fee(),
            borrowed_symbol: default_borrowed_symbol(),
            borrowed_decimals: default_borrowed_decimals(),
            collateral_symbol: default_collateral_symbol(),
            collateral_decimals: default_collateral_decimals(),
        }
    }
}

impl AmmConfig {
    pub fn price_oracle(&self) -> u128 {
        self.price_oracle.unwrap_or(self.base_price)
    }

    pub fn validate(&self) -> Result<()> {
        band_math::check_a(self.a)
            .map_err(|e| AmmError::InvalidConfig(format!("a = {}: {}", self.a, e)))?;
        if self.base_price == 0 {
            return Err(AmmError::InvalidConfig("base_price must be positive".into()));
        }
        if self.price_oracle() == 0 {
            return Err(AmmError::InvalidConfig("price_oracle must be positive".into()));
        }
        if self.fee >= WAD {
            return Err(AmmError::InvalidConfig(format!(
                "fee {} must be below {}",
                self.fee, WAD
            )));
        }
        for (symbol, decimals) in [
            (&self.borrowed_symbol, self.borrowed_decimals),
            (&self.collateral_symbol, self.collateral_decimals),
        ] {
            if decimals > 18 {
                return Err(AmmError::InvalidConfig(format!(
                    "{} has {} decimals, at most 18 supported",
                    symbol, decimals
                )));
            }
        }
        Ok(())
    }
}

/// Serde helpers for u128 amounts written as integers or decimal strings
///
/// TOML integers stop at i64, so wad-scale values usually arrive as strings.
pub mod amount {
    use std::fmt;

    use serde::de::{self, Deserializer, Visitor};

    struct AmountVisitor;

    impl<'de> Visitor<'de> for AmountVisitor {
        type Value = u128;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a non-negative integer or a decimal string")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<u128, E> {
            Ok(v as u128)
        }

        fn visit_u128<E: de::Error>(self, v: u128) -> Result<u128, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<u128, E> {
            u128::try_from(v).map_err(|_| E::custom(format!("negative amount {}", v)))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<u128, E> {
            v.trim()
                .replace('_', "")
                .parse::<u128>()
                .map_err(|e| E::custom(format!("invalid amount {:?}: {}", v, e)))
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u128, D::Error> {
        d.deserialize_any(AmountVisitor)
    }

    pub fn deserialize_opt<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u128>, D::Error> {
        deserialize(d).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = AmmConfig::default();
        config.validate().unwrap();
        assert_eq!(config.price_oracle(), 3000 * WAD);
    }

    #[test]
    fn test_parse_toml_with_string_amounts() {
        let config: AmmConfig = toml::from_str(
            r#"
            a = 50
            base_price = "2_000_000_000_000_000_000_000"
            price_oracle = "1900000000000000000000"
            fee = 0
            borrowed_decimals = 18
            "#,
        )
        .unwrap();
        assert_eq!(config.a, 50);
        assert_eq!(config.base_price, 2000 * WAD);
        assert_eq!(config.price_oracle(), 1900 * WAD);
        assert_eq!(config.fee, 0);
        assert_eq!(config.borrowed_decimals, 18);
        assert_eq!(config.collateral_decimals, 18);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let parsed: std::result::Result<AmmConfig, _> = toml::from_str("amplification = 3");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_validation_errors() {
        let bad_a = AmmConfig { a: 1, ..Default::default() };
        assert!(matches!(bad_a.validate(), Err(AmmError::InvalidConfig(_))));

        let bad_fee = AmmConfig { fee: WAD, ..Default::default() };
        assert!(matches!(bad_fee.validate(), Err(AmmError::InvalidConfig(_))));

        let bad_decimals = AmmConfig { collateral_decimals: 19, ..Default::default() };
        assert!(matches!(bad_decimals.validate(), Err(AmmError::InvalidConfig(_))));

        let zero_oracle = AmmConfig { price_oracle: Some(0), ..Default::default() };
        assert!(matches!(zero_oracle.validate(), Err(AmmError::InvalidConfig(_))));
    }
}
