//! Chain descriptors.
//!
//! Provides the public description of a configured chain and the lock
//! contract generation deployed on it.

use serde::{Deserialize, Serialize};

/// An EIP-155 chain ID (e.g., 8453 for Base, 11155111 for Sepolia).
pub type ChainId = u64;

/// Which generation of the lock contract a chain runs.
///
/// Both generations mint one NFT per lock and expose `getOwnerLocks`; they
/// differ in how many tokens a single lock can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContractVersion {
    /// One lock holds any number of tokens (`lockMultipleTokens`,
    /// `getMultiTokenLockDetails`, `claimMultipleTokens`).
    #[default]
    MultiToken,
    /// One lock holds exactly one token (`lockTokens`, `getLockDetails`,
    /// `claimTokens`).
    SingleToken,
}

/// Public summary of a configured chain, as listed by `/api/chains`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainInfo {
    /// Configuration key (e.g., `"base_mainnet"`).
    pub key: String,
    /// Public route slug used in URLs (e.g., `"base"`).
    pub route: String,
    /// EIP-155 chain ID.
    pub chain_id: ChainId,
    /// Human-readable chain name.
    pub chain_name: String,
}
