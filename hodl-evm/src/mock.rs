//! In-memory chain used by unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use alloy_primitives::{Address, Bytes, address};
use alloy_sol_types::{SolCall, SolValue};
use alloy_transport::TransportErrorKind;

use crate::abi::encode_call;
use crate::chain::ChainContext;
use crate::contract::{IMulticall3, MULTICALL3_ADDRESS};
use crate::error::EvmError;
use crate::provider::EvmReadProvider;

/// Answers `eth_call`s from a fixed table keyed by `(target, calldata)`.
///
/// Calls to [`MULTICALL3_ADDRESS`] are unpacked and each sub-call is answered
/// from the same table, so batched and sequential paths see identical data.
/// Unknown calls revert.
#[derive(Debug, Default)]
pub struct MockChain {
    responses: Mutex<HashMap<(Address, Bytes), Bytes>>,
    calls: AtomicUsize,
    aggregate_calls: AtomicUsize,
    fail_transport: AtomicBool,
    fail_aggregate: AtomicBool,
}

impl MockChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the raw return data of `call` on `target`.
    pub fn respond<C: SolCall>(&self, target: Address, call: &C, ret: impl Into<Bytes>) {
        self.responses
            .lock()
            .unwrap()
            .insert((target, encode_call(call)), ret.into());
    }

    /// Registers an ABI-encoded single return value.
    pub fn respond_value<C: SolCall, V: SolValue>(&self, target: Address, call: &C, value: V) {
        self.respond(target, call, value.abi_encode());
    }

    /// Makes every RPC round trip fail with a transport error.
    pub fn fail_transport(&self) {
        self.fail_transport.store(true, Ordering::SeqCst);
    }

    /// Makes only the multicall round trip fail.
    pub fn fail_aggregate(&self) {
        self.fail_aggregate.store(true, Ordering::SeqCst);
    }

    /// Number of RPC round trips served so far.
    pub fn rpc_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of multicall round trips served so far.
    pub fn aggregate_count(&self) -> usize {
        self.aggregate_calls.load(Ordering::SeqCst)
    }

    fn lookup(&self, target: Address, input: &Bytes) -> Option<Bytes> {
        self.responses
            .lock()
            .unwrap()
            .get(&(target, input.clone()))
            .cloned()
    }

    fn serve(&self, to: Address, input: Bytes) -> Result<Bytes, EvmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_transport.load(Ordering::SeqCst) {
            return Err(TransportErrorKind::custom_str("connection refused").into());
        }
        if to != MULTICALL3_ADDRESS {
            return self
                .lookup(to, &input)
                .ok_or_else(|| TransportErrorKind::custom_str("execution reverted").into());
        }
        self.aggregate_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_aggregate.load(Ordering::SeqCst) {
            return Err(TransportErrorKind::custom_str("multicall unavailable").into());
        }
        let batch = IMulticall3::aggregate3Call::abi_decode(&input)
            .map_err(|e| TransportErrorKind::custom_str(&e.to_string()))?;
        let results = batch
            .calls
            .into_iter()
            .map(|call| match self.lookup(call.target, &call.callData) {
                Some(data) => IMulticall3::Result {
                    success: true,
                    returnData: data,
                },
                None => IMulticall3::Result {
                    success: false,
                    returnData: Bytes::new(),
                },
            })
            .collect::<Vec<_>>();
        Ok(results.abi_encode().into())
    }
}

impl EvmReadProvider for MockChain {
    async fn call(&self, to: Address, input: Bytes) -> Result<Bytes, EvmError> {
        self.serve(to, input)
    }
}

/// Lock contract address used throughout the tests.
pub const LOCK_CONTRACT: Address = address!("0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");

/// A chain context over `mock` with a lock contract and, if requested, the
/// canonical multicall.
pub fn chain(mock: MockChain, multicall: bool) -> ChainContext<MockChain> {
    let ctx = ChainContext::new("testnet", "test", 31337, mock).with_lock_contract(LOCK_CONTRACT);
    if multicall {
        ctx.with_multicall(MULTICALL3_ADDRESS)
    } else {
        ctx
    }
}
