//! Known EVM networks and their block explorers.

use hodl::ChainId;

/// Ethereum Mainnet chain ID.
pub const ETHEREUM_MAINNET: ChainId = 1;

/// Ethereum Sepolia (testnet) chain ID.
pub const ETHEREUM_SEPOLIA: ChainId = 11_155_111;

/// Base Mainnet chain ID.
pub const BASE_MAINNET: ChainId = 8453;

/// Base Sepolia (testnet) chain ID.
pub const BASE_SEPOLIA: ChainId = 84532;

/// Polygon Mainnet chain ID.
pub const POLYGON_MAINNET: ChainId = 137;

/// Polygon Amoy (testnet) chain ID.
pub const POLYGON_AMOY: ChainId = 80002;

/// OP Mainnet chain ID.
pub const OPTIMISM_MAINNET: ChainId = 10;

/// Arbitrum One chain ID.
pub const ARBITRUM_ONE: ChainId = 42161;

/// Explorer reported for chains missing from [`KNOWN_NETWORKS`].
pub const DEFAULT_EXPLORER_URL: &str = "https://etherscan.io";

/// A network with a well-known block explorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownNetwork {
    /// EIP-155 chain ID.
    pub chain_id: ChainId,
    /// Block explorer base URL, without trailing slash.
    pub explorer_url: &'static str,
}

/// Networks with a built-in explorer mapping.
pub const KNOWN_NETWORKS: &[KnownNetwork] = &[
    KnownNetwork {
        chain_id: ETHEREUM_MAINNET,
        explorer_url: "https://etherscan.io",
    },
    KnownNetwork {
        chain_id: ETHEREUM_SEPOLIA,
        explorer_url: "https://sepolia.etherscan.io",
    },
    KnownNetwork {
        chain_id: BASE_MAINNET,
        explorer_url: "https://basescan.org",
    },
    KnownNetwork {
        chain_id: BASE_SEPOLIA,
        explorer_url: "https://sepolia.basescan.org",
    },
    KnownNetwork {
        chain_id: POLYGON_MAINNET,
        explorer_url: "https://polygonscan.com",
    },
    KnownNetwork {
        chain_id: POLYGON_AMOY,
        explorer_url: "https://amoy.polygonscan.com",
    },
    KnownNetwork {
        chain_id: OPTIMISM_MAINNET,
        explorer_url: "https://optimistic.etherscan.io",
    },
    KnownNetwork {
        chain_id: ARBITRUM_ONE,
        explorer_url: "https://arbiscan.io",
    },
];

/// Looks up a known network by chain ID.
#[must_use]
pub fn known_network(chain_id: ChainId) -> Option<&'static KnownNetwork> {
    KNOWN_NETWORKS.iter().find(|n| n.chain_id == chain_id)
}

/// Block explorer for `chain_id`, or [`DEFAULT_EXPLORER_URL`].
#[must_use]
pub fn explorer_url(chain_id: ChainId) -> &'static str {
    known_network(chain_id).map_or(DEFAULT_EXPLORER_URL, |n| n.explorer_url)
}

/// Display name used when a chain is configured without one.
#[must_use]
pub fn default_chain_name(chain_id: ChainId) -> String {
    format!("Chain {chain_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_explorers() {
        assert_eq!(explorer_url(BASE_MAINNET), "https://basescan.org");
        assert_eq!(explorer_url(ETHEREUM_SEPOLIA), "https://sepolia.etherscan.io");
        assert_eq!(explorer_url(ARBITRUM_ONE), "https://arbiscan.io");
    }

    #[test]
    fn test_unknown_chain_defaults() {
        assert_eq!(explorer_url(31337), DEFAULT_EXPLORER_URL);
        assert_eq!(default_chain_name(31337), "Chain 31337");
    }

    #[test]
    fn test_default_name_ignores_known_networks() {
        assert!(known_network(BASE_MAINNET).is_some());
        assert_eq!(default_chain_name(BASE_MAINNET), "Chain 8453");
    }

    #[test]
    fn test_chain_ids_are_unique() {
        for (i, a) in KNOWN_NETWORKS.iter().enumerate() {
            for b in &KNOWN_NETWORKS[i + 1..] {
                assert_ne!(a.chain_id, b.chain_id);
            }
        }
    }
}
