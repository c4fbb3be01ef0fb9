#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! EVM chain support for the HODL token-lock backend.
//!
//! This crate turns the read-heavy API of the lock contract into as few RPC
//! round trips as possible and decodes the answers into the types of the
//! [`hodl`] crate.
//!
//! # Architecture
//!
//! - [`provider`] - The `eth_call` seam and its JSON-RPC implementation
//! - [`chain`] - Per-chain context and the route registry
//! - [`abi`] - Call encoding and defensive return-data decoding
//! - [`batch`] - Multicall3 batching with a sequential fallback
//! - [`token`] - ERC-20 metadata with per-call fallbacks
//! - [`lock`] - Holder lock aggregation and single-lock reads
//! - [`encode`] - Unsigned transaction builders
//!
//! # Feature Flags
//!
//! - `telemetry` - `tracing` spans around RPC calls and aggregation steps

pub mod abi;
pub mod batch;
pub mod chain;
pub mod contract;
pub mod encode;
pub mod error;
pub mod lock;
pub mod provider;
pub mod token;

mod networks;
pub use networks::*;

#[cfg(test)]
mod mock;

pub use batch::{CallBatcher, CallDescriptor, CallResult};
pub use chain::{ChainContext, ChainRegistry};
pub use encode::{EncodedCall, LockRequest};
pub use error::EvmError;
pub use provider::{EvmReadProvider, RpcReadProvider};
