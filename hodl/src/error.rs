//! Error taxonomy shared by the chain layer and the HTTP server.
//!
//! Sub-call failures inside a batch never become a [`HodlError`]; they are
//! degraded to fallback values where they happen. Only failures of mandatory
//! primary calls and bad caller input reach this type.

/// Errors surfaced to API clients.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HodlError {
    /// The requested chain route is not configured.
    #[error("Chain not found")]
    ChainNotFound {
        /// The route that failed to resolve.
        route: String,
    },

    /// The chain is configured but has no lock contract deployment.
    #[error("Contract not deployed on {chain}")]
    ContractNotDeployed {
        /// Configuration key of the chain.
        chain: String,
    },

    /// A caller-supplied address could not be parsed.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// A caller-supplied argument was malformed or inconsistent.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A mandatory on-chain read failed.
    #[error("RPC call failed: {0}")]
    RpcCallFailed(String),
}

impl HodlError {
    /// Creates an [`HodlError::InvalidArgument`] from any displayable message.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Returns `true` for errors caused by an unknown chain route.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::ChainNotFound { .. })
    }
}
