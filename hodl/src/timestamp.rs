//! Unix timestamp utilities for lock unlock times.
//!
//! Lock contracts store unlock times as `uint256` seconds since the epoch.
//! Real values always fit in a `u64`; anything larger is clamped when
//! converted from a raw word.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// A Unix timestamp representing seconds since the Unix epoch (1970-01-01T00:00:00Z).
///
/// # Serialization
///
/// Serialized as a plain JSON number. Unlock times are far below 2^53, so the
/// value survives a round trip through `JavaScript`'s `Number`.
///
/// ```json
/// 2000000000
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Ord, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnixTimestamp(u64);

impl Display for UnixTimestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for UnixTimestamp {
    fn from(secs: u64) -> Self {
        Self(secs)
    }
}

impl From<U256> for UnixTimestamp {
    /// Converts an on-chain `uint256` timestamp, saturating at `u64::MAX`.
    fn from(value: U256) -> Self {
        Self(value.saturating_to::<u64>())
    }
}

impl UnixTimestamp {
    /// Creates a new [`UnixTimestamp`] from a raw seconds value.
    #[must_use]
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    /// Returns the timestamp as raw seconds since the Unix epoch.
    #[must_use]
    pub const fn as_secs(&self) -> u64 {
        self.0
    }
}
