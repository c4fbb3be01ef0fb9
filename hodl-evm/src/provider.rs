//! Read-only access to an EVM node.
//!
//! Everything above this module talks to a chain through [`EvmReadProvider`],
//! a single `eth_call` seam. Production code uses [`RpcReadProvider`], an
//! alloy [`RootProvider`] over a throttled, fallback-capable HTTP transport
//! with a per-call timeout.

use std::future::Future;
use std::num::NonZeroUsize;
use std::time::Duration;

use alloy_network::TransactionBuilder;
use alloy_primitives::{Address, Bytes};
use alloy_provider::{Provider, RootProvider};
use alloy_rpc_client::RpcClient;
use alloy_rpc_types_eth::TransactionRequest;
use alloy_sol_types::SolCall;
use alloy_transport::layers::{FallbackLayer, ThrottleLayer};
use alloy_transport_http::Http;
use tower::ServiceBuilder;
#[cfg(feature = "telemetry")]
use tracing::instrument;
use url::Url;

use crate::abi::encode_call;
use crate::error::EvmError;

/// Default bound on a single RPC round trip.
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(15);

/// Executes read-only contract calls against a chain.
pub trait EvmReadProvider: Send + Sync {
    /// Performs an `eth_call` of `input` against `to` at the latest block and
    /// returns the raw return data.
    fn call(&self, to: Address, input: Bytes)
    -> impl Future<Output = Result<Bytes, EvmError>> + Send;
}

/// JSON-RPC backed [`EvmReadProvider`].
#[derive(Debug, Clone)]
pub struct RpcReadProvider {
    inner: RootProvider,
    timeout: Duration,
}

impl RpcReadProvider {
    /// Creates an RPC client from HTTP endpoint URLs with optional per-endpoint rate limits.
    ///
    /// Each entry in `endpoints` is a `(url, optional_rate_limit)` pair.
    /// Non-HTTP(S) URLs are skipped. Several endpoints are combined behind a
    /// [`FallbackLayer`].
    ///
    /// # Errors
    ///
    /// Returns [`EvmError::NoRpcEndpoint`] if no HTTP endpoint remains after filtering.
    #[allow(unused_variables)] // chain is needed for tracing only
    pub fn rpc_client(chain: &str, endpoints: &[(Url, Option<u32>)]) -> Result<RpcClient, EvmError> {
        let transports = endpoints
            .iter()
            .filter_map(|(url, rate_limit)| {
                let scheme = url.scheme();
                if scheme != "http" && scheme != "https" {
                    return None;
                }
                #[cfg(feature = "telemetry")]
                tracing::info!(chain, rpc_url = %url, rate_limit = ?rate_limit, "Using HTTP transport");
                let limit = rate_limit.unwrap_or(u32::MAX);
                let service = ServiceBuilder::new()
                    .layer(ThrottleLayer::new(limit))
                    .service(Http::new(url.clone()));
                Some(service)
            })
            .collect::<Vec<_>>();
        let count = NonZeroUsize::new(transports.len())
            .ok_or_else(|| EvmError::NoRpcEndpoint(chain.to_owned()))?;
        let fallback = ServiceBuilder::new()
            .layer(FallbackLayer::default().with_active_transport_count(count))
            .service(transports);
        Ok(RpcClient::new(fallback, false))
    }

    /// Wraps a pre-built RPC client.
    #[must_use]
    pub fn new(client: RpcClient, timeout: Duration) -> Self {
        Self {
            inner: RootProvider::new(client),
            timeout,
        }
    }

    /// Builds a provider for `endpoints` in one step.
    ///
    /// # Errors
    ///
    /// See [`rpc_client`](Self::rpc_client).
    pub fn connect(
        chain: &str,
        endpoints: &[(Url, Option<u32>)],
        timeout: Duration,
    ) -> Result<Self, EvmError> {
        Ok(Self::new(Self::rpc_client(chain, endpoints)?, timeout))
    }

    /// Per-call timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl EvmReadProvider for RpcReadProvider {
    #[cfg_attr(feature = "telemetry", instrument(name = "eth_call", skip_all, fields(to = %to), err))]
    async fn call(&self, to: Address, input: Bytes) -> Result<Bytes, EvmError> {
        let tx = TransactionRequest::default().with_to(to).with_input(input);
        match tokio::time::timeout(self.timeout, self.inner.call(tx)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(EvmError::Timeout(self.timeout)),
        }
    }
}

/// Calls `call` on `to` and decodes its return value.
///
/// # Errors
///
/// Propagates transport failures and reports undecodable return data as
/// [`EvmError::Decode`].
pub async fn call_contract<P, C>(provider: &P, to: Address, call: &C) -> Result<C::Return, EvmError>
where
    P: EvmReadProvider,
    C: SolCall + Sync,
{
    let raw = provider.call(to, encode_call(call)).await?;
    C::abi_decode_returns(&raw).map_err(|source| EvmError::Decode {
        method: C::SIGNATURE,
        source,
    })
}
