//! Server configuration.
//!
//! Loads configuration from a TOML file with support for environment variable
//! expansion in string values. Variables use `$VAR` or `${VAR}` syntax.
//!
//! # Example Configuration
//!
//! ```toml
//! host = "0.0.0.0"
//! port = 5000
//! rpc_timeout_secs = 15
//!
//! [chains.base_mainnet]
//! route = "base"
//! chain_id = 8453
//! chain_name = "Base"
//! rpc_url = "https://mainnet.base.org"
//! deployment = "$HODL_BASE"
//! multicall = "canonical"
//!
//! [chains.sepolia]
//! route = "sepolia"
//! chain_id = 11155111
//! contract_version = "single-token"
//! rpc = [
//!     { url = "https://rpc.sepolia.org", rate_limit = 10 },
//!     { url = "https://${SEPOLIA_RPC_HOST}/v1" },
//! ]
//! ```
//!
//! # Environment Variables
//!
//! - `CONFIG` - Path to configuration file (default: `config.toml`), read by the binary
//! - `HOST` - Override server bind address
//! - `PORT` - Override server port
//! - Deployment addresses and RPC secrets referenced by `$VAR` in the config file

use std::collections::{BTreeMap, HashSet};
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use alloy_primitives::Address;
use hodl::{ChainId, ChecksummedAddress, ContractVersion};
use hodl_evm::contract::MULTICALL3_ADDRESS;
use hodl_evm::provider::DEFAULT_RPC_TIMEOUT;
use hodl_evm::{ChainContext, ChainRegistry, RpcReadProvider};
use serde::{Deserialize, Serialize};
use url::Url;

/// Errors raised while loading or applying the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The TOML document is malformed or has invalid values.
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// An ABI file is not valid JSON.
    #[error("invalid ABI in {path}: {source}")]
    Abi {
        /// ABI file that failed.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
    /// The values parse but are inconsistent.
    #[error("invalid configuration: {0}")]
    Invalid(String),
    /// A chain could not be set up.
    #[error(transparent)]
    Chain(#[from] hodl_evm::EvmError),
}

/// Top-level server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address (default: `0.0.0.0`).
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Server port (default: `5000`).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Upper bound on a single RPC round trip, in seconds (default: `15`).
    #[serde(default = "default_rpc_timeout_secs")]
    pub rpc_timeout_secs: u64,

    /// Chain configurations keyed by configuration key.
    #[serde(default)]
    pub chains: BTreeMap<String, ChainConfig>,
}

/// Per-chain configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Public route slug used in request paths.
    pub route: String,

    /// EIP-155 chain ID.
    pub chain_id: ChainId,

    /// Display name; defaults to `Chain {id}`.
    #[serde(default)]
    pub chain_name: Option<String>,

    /// Single HTTP RPC endpoint.
    #[serde(default)]
    pub rpc_url: Option<RpcUrl>,

    /// Additional RPC endpoints with optional rate limits, used as fallbacks.
    #[serde(default)]
    pub rpc: Vec<RpcEndpoint>,

    /// Lock contract address. Chains without one are read-only for tokens.
    #[serde(default)]
    pub deployment: Option<ChecksummedAddress>,

    /// Multicall3 aggregator: an address, or `"canonical"`.
    #[serde(default)]
    pub multicall: Option<MulticallAddress>,

    /// Lock contract generation (default: `multi-token`).
    #[serde(default)]
    pub contract_version: ContractVersion,

    /// Block explorer override.
    #[serde(default)]
    pub explorer_url: Option<String>,

    /// Path to the lock contract ABI JSON served by `/config`.
    #[serde(default)]
    pub abi_path: Option<PathBuf>,
}

/// One RPC endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcEndpoint {
    /// HTTP(S) URL.
    pub url: RpcUrl,
    /// Requests per second; unlimited when absent.
    #[serde(default)]
    pub rate_limit: Option<u32>,
}

/// RPC endpoint URL that remembers the string it was configured with, so
/// `/config` serves it back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RpcUrl {
    raw: String,
    url: Url,
}

impl RpcUrl {
    /// The configured string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The parsed URL.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }
}

impl TryFrom<String> for RpcUrl {
    type Error = url::ParseError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        let url = Url::parse(&raw)?;
        Ok(Self { raw, url })
    }
}

impl From<RpcUrl> for String {
    fn from(value: RpcUrl) -> Self {
        value.raw
    }
}

/// Multicall3 aggregator address; the literal `"canonical"` selects
/// [`MULTICALL3_ADDRESS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MulticallAddress(pub Address);

impl TryFrom<String> for MulticallAddress {
    type Error = hodl::HodlError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.eq_ignore_ascii_case("canonical") {
            return Ok(Self(MULTICALL3_ADDRESS));
        }
        value.parse::<ChecksummedAddress>().map(|a| Self(a.0))
    }
}

impl From<MulticallAddress> for String {
    fn from(value: MulticallAddress) -> Self {
        ChecksummedAddress(value.0).to_string()
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(std::net::Ipv4Addr::new(0, 0, 0, 0))
}

const fn default_port() -> u16 {
    5000
}

const fn default_rpc_timeout_secs() -> u64 {
    DEFAULT_RPC_TIMEOUT.as_secs()
}

impl ServerConfig {
    /// Loads configuration from a specific file path.
    ///
    /// A missing file yields the defaults with no chains. After loading, all
    /// `$VAR` / `${VAR}` references are expanded from the process environment
    /// and `HOST` / `PORT` env vars override the file values.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = if path.exists() {
            std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_owned(),
                source,
            })?
        } else {
            tracing::warn!(path = %path.display(), "Configuration file not found, using defaults");
            String::new()
        };

        let mut config = Self::from_toml(&content)?;

        if let Ok(host) = std::env::var("HOST") {
            if let Ok(addr) = host.parse() {
                config.host = addr;
            }
        }
        if let Ok(port) = std::env::var("PORT") {
            if let Ok(p) = port.parse() {
                config.port = p;
            }
        }

        Ok(config)
    }

    /// Parses and validates a TOML document after environment expansion.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be parsed or validated.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let expanded = expand_env_vars(content);
        let config: Self = toml::from_str(&expanded)?;
        config.validate()?;
        Ok(config)
    }

    /// RPC timeout as a [`Duration`].
    #[must_use]
    pub const fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut routes = HashSet::new();
        for (key, chain) in &self.chains {
            if chain.route.is_empty() {
                return Err(ConfigError::Invalid(format!("chain {key} has an empty route")));
            }
            if !routes.insert(chain.route.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "route {} is used by more than one chain",
                    chain.route
                )));
            }
            if chain.endpoints().is_empty() {
                return Err(ConfigError::Invalid(format!("chain {key} has no RPC endpoint")));
            }
        }
        Ok(())
    }

    /// Builds the chain registry: one RPC provider per chain, ABI files loaded.
    ///
    /// # Errors
    ///
    /// Fails if an ABI file cannot be read or a chain has no usable endpoint.
    pub fn build_registry(&self) -> Result<ChainRegistry<RpcReadProvider>, ConfigError> {
        let timeout = self.rpc_timeout();
        let mut chains = Vec::with_capacity(self.chains.len());
        for (key, chain) in &self.chains {
            chains.push(chain.to_context(key, timeout)?);
        }
        Ok(ChainRegistry::new(chains)?)
    }
}

impl ChainConfig {
    /// All configured endpoints, `rpc_url` first.
    #[must_use]
    pub fn endpoints(&self) -> Vec<(Url, Option<u32>)> {
        self.rpc_url
            .iter()
            .map(|url| (url.url().clone(), None))
            .chain(self.rpc.iter().map(|e| (e.url.url().clone(), e.rate_limit)))
            .collect()
    }

    /// Builds the runtime context of this chain.
    ///
    /// # Errors
    ///
    /// Fails if the ABI file cannot be loaded or no endpoint is usable.
    pub fn to_context(
        &self,
        key: &str,
        timeout: Duration,
    ) -> Result<ChainContext<RpcReadProvider>, ConfigError> {
        let endpoints = self.endpoints();
        let provider = RpcReadProvider::connect(key, &endpoints, timeout)?;
        let mut context = ChainContext::new(key, &self.route, self.chain_id, provider)
            .with_contract_version(self.contract_version);
        let public_rpc = self.rpc_url.as_ref().or_else(|| self.rpc.first().map(|e| &e.url));
        if let Some(url) = public_rpc {
            context = context.with_rpc_url(url.as_str());
        }
        if let Some(name) = &self.chain_name {
            context = context.with_chain_name(name);
        }
        if let Some(deployment) = self.deployment {
            context = context.with_lock_contract(deployment.0);
        }
        if let Some(multicall) = self.multicall {
            context = context.with_multicall(multicall.0);
        }
        if let Some(explorer) = &self.explorer_url {
            context = context.with_explorer_url(explorer.trim_end_matches('/'));
        }
        if let Some(path) = &self.abi_path {
            context = context.with_abi(load_abi(path)?);
        }
        tracing::info!(
            chain = key,
            route = %self.route,
            chain_id = self.chain_id,
            deployment = ?self.deployment.map(|d| d.to_string()),
            multicall = self.multicall.is_some(),
            timeout_secs = context.provider().timeout().as_secs(),
            "Configured chain"
        );
        Ok(context)
    }
}

fn load_abi(path: &Path) -> Result<serde_json::Value, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_owned(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::Abi {
        path: path.to_owned(),
        source,
    })
}

/// Expands `$VAR` and `${VAR}` patterns in a string from environment variables.
///
/// Unresolved variables are left as-is.
fn expand_env_vars(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' {
            result.push(ch);
            continue;
        }
        let braced = chars.peek() == Some(&'{');
        if braced {
            chars.next();
        }

        let mut var_name = String::new();
        while let Some(&c) = chars.peek() {
            if braced {
                if c == '}' {
                    chars.next();
                    break;
                }
            } else if !c.is_ascii_alphanumeric() && c != '_' {
                break;
            }
            var_name.push(c);
            chars.next();
        }

        match std::env::var(&var_name) {
            Ok(val) if !var_name.is_empty() => result.push_str(&val),
            _ => {
                result.push('$');
                if braced {
                    result.push('{');
                }
                result.push_str(&var_name);
                if braced && !var_name.is_empty() {
                    result.push('}');
                }
            }
        }
    }

    result
}
