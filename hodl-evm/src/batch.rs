//! Call batching over Multicall3.
//!
//! [`CallBatcher`] turns a list of independent read calls into as few RPC
//! round trips as possible. With an aggregator configured and more than one
//! call, everything goes out as one `aggregate3` with `allowFailure = true` on
//! every sub-call; otherwise each call is a plain `eth_call`. Either way the
//! result list is positionally aligned with the input and one failing call
//! never fails the batch.

use alloy_primitives::{Address, Bytes};
use alloy_sol_types::SolCall;
#[cfg(feature = "telemetry")]
use tracing::instrument;

use crate::abi::encode_call;
use crate::chain::ChainContext;
use crate::contract::IMulticall3;
use crate::error::EvmError;
use crate::provider::EvmReadProvider;

/// One read call: target contract and ABI-encoded call data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallDescriptor {
    /// Contract to call.
    pub target: Address,
    /// Selector followed by encoded arguments.
    pub data: Bytes,
}

impl CallDescriptor {
    /// Creates a descriptor from pre-encoded call data.
    #[must_use]
    pub const fn new(target: Address, data: Bytes) -> Self {
        Self { target, data }
    }

    /// Creates a descriptor by encoding a typed call.
    #[must_use]
    pub fn of<C: SolCall>(target: Address, call: &C) -> Self {
        Self::new(target, encode_call(call))
    }
}

/// Outcome of one call in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CallResult {
    /// Whether the call succeeded.
    pub success: bool,
    /// Raw return data; empty for failed sequential calls.
    pub return_data: Bytes,
}

impl CallResult {
    /// A failed call with no return data.
    #[must_use]
    pub fn failed() -> Self {
        Self::default()
    }

    /// A successful call.
    #[must_use]
    pub const fn succeeded(return_data: Bytes) -> Self {
        Self {
            success: true,
            return_data,
        }
    }

    /// Return data of a successful call.
    #[must_use]
    pub fn data(&self) -> Option<&[u8]> {
        self.success.then_some(&self.return_data[..])
    }

    /// Decodes the return data of a successful call as the return type of `C`.
    #[must_use]
    pub fn decode<C: SolCall>(&self) -> Option<C::Return> {
        self.data().and_then(|data| C::abi_decode_returns(data).ok())
    }
}

/// Executes batches of read calls against one chain.
#[derive(Debug)]
pub struct CallBatcher<'a, P> {
    provider: &'a P,
    aggregator: Option<Address>,
}

impl<'a, P: EvmReadProvider> CallBatcher<'a, P> {
    /// Creates a batcher over `provider`, aggregating through `aggregator` if set.
    #[must_use]
    pub const fn new(provider: &'a P, aggregator: Option<Address>) -> Self {
        Self {
            provider,
            aggregator,
        }
    }

    /// Creates a batcher for a configured chain.
    #[must_use]
    pub const fn for_chain(chain: &'a ChainContext<P>) -> Self {
        Self::new(chain.provider(), chain.multicall())
    }

    /// Executes `calls`, returning exactly one result per call in input order.
    ///
    /// If the aggregate round trip itself fails, the same calls are retried
    /// one by one so that a broken or missing aggregator degrades latency
    /// rather than correctness.
    #[cfg_attr(feature = "telemetry", instrument(name = "call_batch", skip_all, fields(calls = calls.len())))]
    pub async fn execute(&self, calls: &[CallDescriptor]) -> Vec<CallResult> {
        if calls.is_empty() {
            return Vec::new();
        }
        match self.aggregator {
            Some(aggregator) if calls.len() > 1 => {
                match self.aggregate(aggregator, calls).await {
                    Ok(results) => results,
                    Err(error) => {
                        tracing::warn!(%aggregator, calls = calls.len(), %error, "Multicall failed, falling back to sequential calls");
                        self.sequential(calls).await
                    }
                }
            }
            _ => self.sequential(calls).await,
        }
    }

    /// Sends `calls` as one `aggregate3` with every sub-call allowed to fail.
    ///
    /// # Errors
    ///
    /// Returns [`EvmError::AggregateFailed`] if the round trip fails, the
    /// response does not decode, or the result count differs from the call count.
    pub async fn aggregate(
        &self,
        aggregator: Address,
        calls: &[CallDescriptor],
    ) -> Result<Vec<CallResult>, EvmError> {
        let batch = IMulticall3::aggregate3Call {
            calls: calls
                .iter()
                .map(|call| IMulticall3::Call3 {
                    target: call.target,
                    allowFailure: true,
                    callData: call.data.clone(),
                })
                .collect(),
        };
        let raw = self
            .provider
            .call(aggregator, encode_call(&batch))
            .await
            .map_err(|e| EvmError::AggregateFailed(e.to_string()))?;
        let results = IMulticall3::aggregate3Call::abi_decode_returns(&raw)
            .map_err(|e| EvmError::AggregateFailed(e.to_string()))?;
        if results.len() != calls.len() {
            return Err(EvmError::AggregateFailed(format!(
                "expected {} results, got {}",
                calls.len(),
                results.len()
            )));
        }
        Ok(results
            .into_iter()
            .map(|r| CallResult {
                success: r.success,
                return_data: r.returnData,
            })
            .collect())
    }

    /// Issues each call as its own `eth_call`, in order.
    pub async fn sequential(&self, calls: &[CallDescriptor]) -> Vec<CallResult> {
        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            let result = match self.provider.call(call.target, call.data.clone()).await {
                Ok(data) => CallResult::succeeded(data),
                Err(error) => {
                    tracing::debug!(target_address = %call.target, %error, "Call failed");
                    CallResult::failed()
                }
            };
            results.push(result);
        }
        results
    }
}
