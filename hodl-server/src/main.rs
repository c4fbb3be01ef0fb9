//! HODL token-lock API server.
//!
//! # Usage
//!
//! ```bash
//! # Run with default config (config.toml in current directory)
//! cargo run -p hodl-server --release
//!
//! # Run with custom config path
//! hodl-server --config /path/to/config.toml
//! CONFIG=/path/to/config.toml hodl-server
//!
//! # Configure logging level
//! RUST_LOG=hodl_evm=debug,info hodl-server
//! ```
//!
//! # Environment Variables
//!
//! Variables are also read from a `.env` file in the working directory.
//!
//! - `CONFIG` - Path to TOML configuration file (default: `config.toml`)
//! - `HOST` - Override bind address (default: `0.0.0.0`)
//! - `PORT` - Override port (default: `5000`)
//! - `RUST_LOG` - Log level filter (default: `info`)

mod util;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::http::Method;
use axum::{Json, Router};
use clap::Parser;
use tower_http::cors;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use hodl_server::config::ServerConfig;
use hodl_server::handlers::{AppState, api_router};

use crate::util::SigDown;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, env = "CONFIG", default_value = "config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        tracing::error!("Server failed: {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        tracing::debug!("rustls crypto provider already installed");
    }

    let config = ServerConfig::load_from(&args.config)?;
    tracing::info!(
        host = %config.host,
        port = config.port,
        chains = config.chains.len(),
        rpc_timeout_secs = config.rpc_timeout_secs,
        "Loaded configuration"
    );

    let registry = config.build_registry()?;
    if registry.iter().all(|chain| chain.lock_contract().is_none()) {
        tracing::warn!("No chain has a lock contract deployment; /api/chains will be empty");
    }
    let state: AppState = Arc::new(registry);

    let app = Router::new()
        .merge(api_router(Arc::clone(&state)))
        .route("/health", axum::routing::get(health))
        .layer(TraceLayer::new_for_http())
        .layer(
            cors::CorsLayer::new()
                .allow_origin(cors::Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers(cors::Any),
        );

    let sig_down = SigDown::try_new()?;
    let token = sig_down.cancellation_token();

    let addr = SocketAddr::new(config.host, config.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { token.cancelled().await })
        .await?;

    sig_down.recv().await;
    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// Health check endpoint.
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
