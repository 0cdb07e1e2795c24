//! 20-byte account identifiers

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub const ZERO: Address = Address([0u8; 20]);

    /// Deterministic externally owned account number `i`
    pub fn from_index(i: u64) -> Self {
        let mut bytes = [0u8; 20];
        bytes[0] = 0x66;
        bytes[12..].copy_from_slice(&i.wrapping_add(1).to_be_bytes());
        Address(bytes)
    }

    /// Deterministic contract address number `nonce`
    pub fn contract(nonce: u64) -> Self {
        let mut bytes = [0u8; 20];
        bytes[0] = 0xc0;
        bytes[12..].copy_from_slice(&nonce.to_be_bytes());
        Address(bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("0x")?;
        for b in self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accounts_are_distinct() {
        assert_ne!(Address::from_index(0), Address::from_index(1));
        assert_ne!(Address::from_index(0), Address::ZERO);
        assert_ne!(Address::from_index(0), Address::contract(0));
    }

    #[test]
    fn test_display_is_hex() {
        let s = Address::from_index(0).to_string();
        assert_eq!(s.len(), 42);
        assert!(s.starts_with("0x66"));
        assert!(s.ends_with("01"));
    }
}
