//! HTTP server for the HODL token-lock backend.
//!
//! Exposes the chain layer of `hodl-evm` as a JSON API: chain discovery,
//! token metadata, holder locks and unsigned transaction encoding.
//!
//! # Modules
//!
//! - [`config`] - Server configuration with environment variable expansion
//! - [`error`] - API error type and its HTTP mapping
//! - [`handlers`] - Axum route handlers and router builder

pub mod config;
pub mod error;
pub mod handlers;

pub use config::ServerConfig;
pub use error::ApiError;
pub use handlers::{AppState, api_router};
