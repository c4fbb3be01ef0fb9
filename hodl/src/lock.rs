//! Lock records as returned to API clients.
//!
//! A lock is an NFT minted by the lock contract. It carries one unlock time,
//! a claimed flag and one or more `(token, amount)` entries. Claimed locks and
//! zero-amount entries are filtered out before a [`LockRecord`] is built for a
//! holder listing; the single-lock view ([`LockDetail`]) reports everything.

use serde::{Deserialize, Serialize};

use crate::timestamp::UnixTimestamp;
use crate::token::TokenInfo;
use crate::types::{ChecksummedAddress, TokenAmount};

/// NFT token id of a lock. Carried as a decimal string like every `uint256`.
pub type LockId = TokenAmount;

/// One `(token, amount)` entry of a lock, hydrated with token metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockEntry {
    /// Locked token contract address.
    pub address: ChecksummedAddress,
    /// Locked amount in the token's smallest unit.
    pub amount: TokenAmount,
    /// Token symbol.
    pub symbol: String,
    /// Token decimals.
    pub decimals: u8,
    /// Token name.
    pub name: String,
}

impl LockEntry {
    /// Builds an entry from a raw amount and resolved token metadata.
    #[must_use]
    pub fn new(amount: TokenAmount, token: &TokenInfo) -> Self {
        Self {
            address: token.address,
            amount,
            symbol: token.symbol.clone(),
            decimals: token.decimals,
            name: token.name.clone(),
        }
    }
}

/// A fully hydrated lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockRecord {
    /// Lock NFT id.
    pub token_id: LockId,
    /// Time at which the lock becomes claimable.
    pub unlock_time: UnixTimestamp,
    /// Whether the lock has already been claimed.
    pub claimed: bool,
    /// Locked tokens, in contract order.
    pub tokens: Vec<LockEntry>,
}

/// All surfaced locks of one holder.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HolderLocks {
    /// Unclaimed locks with at least one non-zero entry, ascending by unlock time.
    pub locks: Vec<LockRecord>,
    /// Number of distinct tokens across `locks`.
    pub token_count: usize,
}

/// A single lock together with its current NFT owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockDetail {
    /// The lock itself, including claimed state and zero-amount entries.
    #[serde(flatten)]
    pub lock: LockRecord,
    /// Current owner of the lock NFT.
    pub owner: ChecksummedAddress,
}

/// An index-based lock of the legacy per-token lock book (`getUserLocks`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserLock {
    /// Position of the lock in the user's per-token lock list.
    pub index: u64,
    /// Locked amount.
    pub amount: TokenAmount,
    /// Time at which the lock becomes claimable.
    pub unlock_time: UnixTimestamp,
    /// Locked token.
    pub token: ChecksummedAddress,
}

/// Claimable totals of the legacy per-token lock book (`getAvailableTokens`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableTokens {
    /// Sum of all claimable amounts.
    pub total: TokenAmount,
    /// Indexes of the claimable locks.
    pub claimable_indexes: Vec<u64>,
}
