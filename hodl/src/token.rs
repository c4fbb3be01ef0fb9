//! ERC-20 token metadata.
//!
//! Token contracts in the wild are frequently non-conformant: `symbol()` may
//! revert, `name()` may return an empty string, `decimals()` may be missing.
//! Every field of [`TokenInfo`] therefore has a documented fallback, and
//! metadata is rebuilt from live calls on every request.

use serde::{Deserialize, Serialize};

use crate::types::{ChecksummedAddress, TokenAmount};

/// Symbol reported when `symbol()` fails or returns an empty string.
pub const FALLBACK_SYMBOL: &str = "UNKNOWN";

/// Name reported when `name()` fails or returns an empty string.
pub const FALLBACK_NAME: &str = "Unknown Token";

/// Decimals reported when `decimals()` fails or returns an out-of-range value.
pub const FALLBACK_DECIMALS: u8 = 18;

/// Metadata for one ERC-20 token, optionally with a holder balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    /// Token contract address.
    pub address: ChecksummedAddress,
    /// Token symbol (e.g., `"USDC"`).
    pub symbol: String,
    /// Number of decimals.
    pub decimals: u8,
    /// Token name (e.g., `"USD Coin"`).
    pub name: String,
    /// Holder balance, present only when a holder was supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<TokenAmount>,
}

impl TokenInfo {
    /// Builds the metadata reported for a token whose calls all failed.
    #[must_use]
    pub fn fallback(address: ChecksummedAddress) -> Self {
        Self {
            address,
            symbol: FALLBACK_SYMBOL.to_owned(),
            decimals: FALLBACK_DECIMALS,
            name: FALLBACK_NAME.to_owned(),
            balance: None,
        }
    }
}
