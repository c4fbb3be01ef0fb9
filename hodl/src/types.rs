//! Wire format types shared by the API and the chain layer.
//!
//! - [`ChecksummedAddress`] - an EVM address that always renders in EIP-55 form
//! - [`TokenAmount`] - a `uint256` quantity carried as a decimal string

use std::fmt;
use std::str::FromStr;

use alloy_primitives::{Address, U256};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::HodlError;

/// An EVM address rendered with its EIP-55 mixed-case checksum.
///
/// Parsing accepts any casing, matching what wallets and block explorers hand
/// out; output is always checksummed so clients can compare keys verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChecksummedAddress(pub Address);

impl fmt::Display for ChecksummedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_checksum(None))
    }
}

impl From<Address> for ChecksummedAddress {
    fn from(address: Address) -> Self {
        Self(address)
    }
}

impl From<ChecksummedAddress> for Address {
    fn from(value: ChecksummedAddress) -> Self {
        value.0
    }
}

impl FromStr for ChecksummedAddress {
    type Err = HodlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let hex = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        if hex.len() != 40 {
            return Err(HodlError::InvalidAddress(s.to_owned()));
        }
        // Casing is not validated: lowercased input is as common as checksummed.
        let address = Address::from_str(&hex.to_ascii_lowercase())
            .map_err(|_| HodlError::InvalidAddress(s.to_owned()))?;
        Ok(Self(address))
    }
}

impl Serialize for ChecksummedAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ChecksummedAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(de::Error::custom)
    }
}

/// A `uint256` token quantity.
///
/// Serialized as a decimal string. Deserialization additionally accepts
/// `0x`-prefixed hex strings and JSON integers up to `u64::MAX`, since wallet
/// front-ends send amounts in whichever form their number library produces.
/// Larger integers have to arrive as strings here, as a generic deserializer
/// only hands them over as lossy floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TokenAmount(pub U256);

impl TokenAmount {
    /// The zero amount.
    pub const ZERO: Self = Self(U256::ZERO);
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<U256> for TokenAmount {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl From<TokenAmount> for U256 {
    fn from(value: TokenAmount) -> Self {
        value.0
    }
}

impl From<u64> for TokenAmount {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl FromStr for TokenAmount {
    type Err = HodlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || HodlError::InvalidArgument(format!("invalid uint256 amount: {s}"));
        let trimmed = s.trim();
        let (digits, radix) = match trimmed.strip_prefix("0x") {
            Some(hex) => (hex, 16),
            None => (trimmed, 10),
        };
        if digits.is_empty() {
            return Err(invalid());
        }
        U256::from_str_radix(digits, radix)
            .map(Self)
            .map_err(|_| invalid())
    }
}

impl Serialize for TokenAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for TokenAmount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TokenAmountVisitor;

        impl Visitor<'_> for TokenAmountVisitor {
            type Value = TokenAmount;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a non-negative integer or an integer string")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(TokenAmount::from(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                u64::try_from(v)
                    .map(TokenAmount::from)
                    .map_err(|_| E::custom("amount must not be negative"))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                TokenAmount::from_str(v).map_err(E::custom)
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                Err(E::custom(format!(
                    "number {v} is fractional or exceeds u64, pass the amount as an integer string"
                )))
            }
        }

        deserializer.deserialize_any(TokenAmountVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_checksummed_address_parses_lowercase() {
        let parsed: ChecksummedAddress = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48".parse().unwrap();
        assert_eq!(
            parsed.to_string(),
            "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"
        );
    }

    #[test]
    fn test_checksummed_address_rejects_garbage() {
        assert!("0x1234".parse::<ChecksummedAddress>().is_err());
        assert!("not-an-address".parse::<ChecksummedAddress>().is_err());
        assert!(
            "0xZZb86991c6218b36c1d19d4a2e9eb0ce3606eb48"
                .parse::<ChecksummedAddress>()
                .is_err()
        );
    }

    #[test]
    fn test_checksummed_address_serializes_checksummed() {
        let addr = ChecksummedAddress(address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"));
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48\"");
    }

    #[test]
    fn test_token_amount_serializes_as_decimal_string() {
        let amount = TokenAmount(U256::MAX);
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(
            json,
            "\"115792089237316195423570985008687907853269984665640564039457584007913129639935\""
        );
    }

    #[test]
    fn test_token_amount_accepts_numbers_and_strings() {
        let from_num: TokenAmount = serde_json::from_str("500").unwrap();
        let from_str: TokenAmount = serde_json::from_str("\"500\"").unwrap();
        let from_hex: TokenAmount = serde_json::from_str("\"0x1f4\"").unwrap();
        assert_eq!(from_num, TokenAmount::from(500));
        assert_eq!(from_str, from_num);
        assert_eq!(from_hex, from_num);
    }

    #[test]
    fn test_token_amount_rejects_negative_and_fractional() {
        assert!(serde_json::from_str::<TokenAmount>("-1").is_err());
        assert!(serde_json::from_str::<TokenAmount>("1.5").is_err());
        assert!(serde_json::from_str::<TokenAmount>("\"1.5\"").is_err());
    }

    #[test]
    fn test_token_amount_rejects_empty_digits() {
        for raw in ["", "   ", "0x", " 0x "] {
            let err = raw.parse::<TokenAmount>().unwrap_err();
            assert!(matches!(err, HodlError::InvalidArgument(_)), "{raw:?}");
        }
        assert!(serde_json::from_str::<TokenAmount>("\"\"").is_err());
        assert_eq!("0x0".parse::<TokenAmount>().unwrap(), TokenAmount::ZERO);
        assert_eq!("0".parse::<TokenAmount>().unwrap(), TokenAmount::ZERO);
    }

    #[test]
    fn test_token_amount_large_values_need_strings() {
        let err = serde_json::from_str::<TokenAmount>("1000000000000000000000").unwrap_err();
        assert!(err.to_string().contains("integer string"), "{err}");
        let parsed: TokenAmount = serde_json::from_str("\"1000000000000000000000\"").unwrap();
        assert_eq!(parsed.0, U256::from(10).pow(U256::from(21)));
    }
}
