use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ChainError;

/// On-chain account address, kept as lowercase `0x`-prefixed hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountAddress(String);

impl AccountAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for AccountAddress {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let hex = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if hex.is_empty() || hex.len() > 64 {
            return Err(ChainError::Decode(format!(
                "invalid account address length: {trimmed}"
            )));
        }
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ChainError::Decode(format!(
                "invalid account address: {trimmed}"
            )));
        }

        Ok(Self(format!("0x{}", hex.to_ascii_lowercase())))
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for AccountAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for AccountAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::AccountAddress;

    #[test]
    fn normalises_prefix_and_case() {
        let addr: AccountAddress = "0xABCdef01".parse().unwrap();
        assert_eq!(addr.as_str(), "0xabcdef01");

        let bare: AccountAddress = "abcdef01".parse().unwrap();
        assert_eq!(addr, bare);
    }

    #[test]
    fn rejects_non_hex_and_empty() {
        assert!("0x".parse::<AccountAddress>().is_err());
        assert!("0xnothex".parse::<AccountAddress>().is_err());
        assert!(format!("0x{}", "a".repeat(65))
            .parse::<AccountAddress>()
            .is_err());
    }
}
