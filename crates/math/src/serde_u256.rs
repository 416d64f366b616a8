//! Serde helpers that encode `U256` amounts as decimal strings, the form
//! wallets and JSON-RPC payloads expect for values above 2^53.
//!
//! Use with `#[serde(with = "vswap_math::serde_u256")]`, or
//! `vswap_math::serde_u256::option` for optional fields.

use ethnum::U256;
use serde::{de, Deserialize, Deserializer, Serializer};

pub fn serialize<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(value)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse(&s).map_err(de::Error::custom)
}

/// Parse a decimal or `0x`-prefixed hexadecimal amount
pub fn parse(s: &str) -> Result<U256, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => U256::from_str_radix(hex, 16),
        None => U256::from_str_radix(s, 10),
    };
    parsed.map_err(|e| format!("invalid 256-bit amount {:?}: {}", s, e))
}

pub mod option {
    use super::*;

    pub fn serialize<S>(value: &Option<U256>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(v) => serializer.collect_str(v),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<U256>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = Option::<String>::deserialize(deserializer)?;
        s.map(|s| parse(&s).map_err(de::Error::custom)).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal_and_hex() {
        assert_eq!(parse("1000").unwrap(), U256::from(1000u32));
        assert_eq!(parse("0x3e8").unwrap(), U256::from(1000u32));
        assert!(parse("12abc").is_err());
    }
}
