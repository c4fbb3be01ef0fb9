#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Core types for the HODL token-lock backend.
//!
//! This crate holds the chain-agnostic data model shared by the EVM support
//! crate and the HTTP server: token metadata, hydrated lock records, chain
//! descriptors and the error taxonomy surfaced to API clients.
//!
//! Every on-chain integer quantity (balances, lock amounts, lock ids) is a
//! 256-bit value and is serialized as a decimal string so that JSON clients
//! never lose precision.
//!
//! # Modules
//!
//! - [`chain`] - Chain descriptors and lock contract versions
//! - [`error`] - Error taxonomy shared by all layers
//! - [`lock`] - Lock records as returned to clients
//! - [`timestamp`] - Unix timestamps for lock unlock times
//! - [`token`] - ERC-20 token metadata with documented fallbacks
//! - [`types`] - Wire format types ([`ChecksummedAddress`], [`TokenAmount`])

pub mod chain;
pub mod error;
pub mod lock;
pub mod timestamp;
pub mod token;
pub mod types;

pub use chain::{ChainId, ChainInfo, ContractVersion};
pub use error::HodlError;
pub use lock::{AvailableTokens, HolderLocks, LockDetail, LockEntry, LockRecord, UserLock};
pub use timestamp::UnixTimestamp;
pub use token::TokenInfo;
pub use types::{ChecksummedAddress, TokenAmount};
