//! Error types for EVM chain access.

use std::time::Duration;

use alloy_transport::TransportError;
use hodl::HodlError;

/// Errors raised while talking to an EVM node or decoding its answers.
#[derive(Debug, thiserror::Error)]
pub enum EvmError {
    /// RPC transport error.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The node did not answer within the configured timeout.
    #[error("RPC call timed out after {0:?}")]
    Timeout(Duration),
    /// No usable HTTP endpoint was configured for a chain.
    #[error("No usable RPC endpoint for chain {0}")]
    NoRpcEndpoint(String),
    /// Return data did not match the expected ABI shape.
    #[error("Failed to decode {method} return data: {source}")]
    Decode {
        /// Contract method whose return data was rejected.
        method: &'static str,
        /// Underlying ABI error.
        source: alloy_sol_types::Error,
    },
    /// The multicall aggregate itself failed (as opposed to one of its sub-calls).
    #[error("Multicall aggregate failed: {0}")]
    AggregateFailed(String),
    /// Two configured chains share the same public route.
    #[error("Duplicate chain route: {0}")]
    DuplicateRoute(String),
    /// Domain error passed through unchanged.
    #[error(transparent)]
    Hodl(#[from] HodlError),
}

impl From<EvmError> for HodlError {
    fn from(value: EvmError) -> Self {
        match value {
            EvmError::Hodl(e) => e,
            EvmError::Transport(_)
            | EvmError::Timeout(_)
            | EvmError::NoRpcEndpoint(_)
            | EvmError::Decode { .. }
            | EvmError::AggregateFailed(_)
            | EvmError::DuplicateRoute(_) => Self::RpcCallFailed(value.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_pass_through() {
        let err: HodlError = EvmError::Hodl(HodlError::ContractNotDeployed {
            chain: "base".into(),
        })
        .into();
        assert_eq!(err.to_string(), "Contract not deployed on base");
    }

    #[test]
    fn test_rpc_errors_become_rpc_call_failed() {
        let err: HodlError = EvmError::Timeout(Duration::from_secs(15)).into();
        assert!(matches!(err, HodlError::RpcCallFailed(msg) if msg.contains("timed out")));
    }
}
