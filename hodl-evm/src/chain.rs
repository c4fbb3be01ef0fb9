//! Configured chains and route resolution.
//!
//! A [`ChainContext`] bundles everything a request needs to talk to one chain:
//! its read provider, the lock contract deployment, the optional multicall
//! aggregator and the descriptive data served to clients. Contexts are built
//! once at startup and collected into a [`ChainRegistry`], which resolves the
//! public route slug of every request.

use std::collections::HashMap;

use alloy_primitives::Address;
use hodl::{ChainId, ChainInfo, ContractVersion, HodlError};

use crate::error::EvmError;
use crate::networks;

/// Everything needed to serve requests for one configured chain.
#[derive(Debug)]
pub struct ChainContext<P> {
    key: String,
    route: String,
    chain_id: ChainId,
    chain_name: String,
    provider: P,
    rpc_url: String,
    lock_contract: Option<Address>,
    multicall: Option<Address>,
    contract_version: ContractVersion,
    explorer_url: String,
    abi: Option<serde_json::Value>,
}

impl<P> ChainContext<P> {
    /// Creates a context with no deployment, no aggregator and defaults for
    /// the descriptive fields derived from `chain_id`.
    pub fn new(
        key: impl Into<String>,
        route: impl Into<String>,
        chain_id: ChainId,
        provider: P,
    ) -> Self {
        Self {
            key: key.into(),
            route: route.into(),
            chain_id,
            chain_name: networks::default_chain_name(chain_id),
            provider,
            rpc_url: String::new(),
            lock_contract: None,
            multicall: None,
            contract_version: ContractVersion::default(),
            explorer_url: networks::explorer_url(chain_id).to_owned(),
            abi: None,
        }
    }

    /// Sets the human-readable chain name.
    #[must_use]
    pub fn with_chain_name(mut self, name: impl Into<String>) -> Self {
        self.chain_name = name.into();
        self
    }

    /// Sets the public RPC URL reported by `/config`.
    #[must_use]
    pub fn with_rpc_url(mut self, url: impl Into<String>) -> Self {
        self.rpc_url = url.into();
        self
    }

    /// Sets the lock contract deployment.
    #[must_use]
    pub const fn with_lock_contract(mut self, address: Address) -> Self {
        self.lock_contract = Some(address);
        self
    }

    /// Enables batching through a Multicall3 deployment.
    #[must_use]
    pub const fn with_multicall(mut self, address: Address) -> Self {
        self.multicall = Some(address);
        self
    }

    /// Sets the lock contract generation.
    #[must_use]
    pub const fn with_contract_version(mut self, version: ContractVersion) -> Self {
        self.contract_version = version;
        self
    }

    /// Overrides the block explorer URL.
    #[must_use]
    pub fn with_explorer_url(mut self, url: impl Into<String>) -> Self {
        self.explorer_url = url.into();
        self
    }

    /// Attaches the lock contract ABI served to clients.
    #[must_use]
    pub fn with_abi(mut self, abi: serde_json::Value) -> Self {
        self.abi = Some(abi);
        self
    }

    /// Configuration key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Public route slug.
    #[must_use]
    pub fn route(&self) -> &str {
        &self.route
    }

    /// EIP-155 chain ID.
    #[must_use]
    pub const fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    /// Human-readable chain name.
    #[must_use]
    pub fn chain_name(&self) -> &str {
        &self.chain_name
    }

    /// Read provider for this chain.
    #[must_use]
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// Public RPC URL.
    #[must_use]
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// Lock contract deployment, if any.
    #[must_use]
    pub const fn lock_contract(&self) -> Option<Address> {
        self.lock_contract
    }

    /// Returns the lock contract deployment or fails with
    /// [`HodlError::ContractNotDeployed`].
    ///
    /// # Errors
    ///
    /// Fails when the chain has no deployment configured.
    pub fn require_contract(&self) -> Result<Address, HodlError> {
        self.lock_contract
            .ok_or_else(|| HodlError::ContractNotDeployed {
                chain: self.key.clone(),
            })
    }

    /// Multicall aggregator, if batching is enabled.
    #[must_use]
    pub const fn multicall(&self) -> Option<Address> {
        self.multicall
    }

    /// Lock contract generation.
    #[must_use]
    pub const fn contract_version(&self) -> ContractVersion {
        self.contract_version
    }

    /// Block explorer base URL.
    #[must_use]
    pub fn explorer_url(&self) -> &str {
        &self.explorer_url
    }

    /// Lock contract ABI, if one was loaded.
    #[must_use]
    pub const fn abi(&self) -> Option<&serde_json::Value> {
        self.abi.as_ref()
    }

    /// Public summary for chain listings.
    #[must_use]
    pub fn info(&self) -> ChainInfo {
        ChainInfo {
            key: self.key.clone(),
            route: self.route.clone(),
            chain_id: self.chain_id,
            chain_name: self.chain_name.clone(),
        }
    }
}

/// Fixed set of configured chains, indexed by route.
#[derive(Debug)]
pub struct ChainRegistry<P> {
    chains: Vec<ChainContext<P>>,
    by_route: HashMap<String, usize>,
}

impl<P> ChainRegistry<P> {
    /// Builds a registry, ordering chains by configuration key.
    ///
    /// # Errors
    ///
    /// Returns [`EvmError::DuplicateRoute`] if two chains share a route.
    pub fn new(mut chains: Vec<ChainContext<P>>) -> Result<Self, EvmError> {
        chains.sort_by(|a, b| a.key.cmp(&b.key));
        let mut by_route = HashMap::with_capacity(chains.len());
        for (index, chain) in chains.iter().enumerate() {
            if by_route.insert(chain.route.clone(), index).is_some() {
                return Err(EvmError::DuplicateRoute(chain.route.clone()));
            }
        }
        Ok(Self { chains, by_route })
    }

    /// Resolves a public route slug.
    ///
    /// # Errors
    ///
    /// Returns [`HodlError::ChainNotFound`] for unknown routes.
    pub fn resolve(&self, route: &str) -> Result<&ChainContext<P>, HodlError> {
        self.by_route
            .get(route)
            .map(|&index| &self.chains[index])
            .ok_or_else(|| HodlError::ChainNotFound {
                route: route.to_owned(),
            })
    }

    /// Iterates over all chains in configuration-key order.
    pub fn iter(&self) -> impl Iterator<Item = &ChainContext<P>> {
        self.chains.iter()
    }

    /// Number of configured chains.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    /// Returns `true` if no chain is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    fn ctx(key: &str, route: &str) -> ChainContext<()> {
        ChainContext::new(key, route, 84532, ())
    }

    #[test]
    fn test_resolve_known_route() {
        let registry = ChainRegistry::new(vec![ctx("base_sepolia", "base-sepolia")]).unwrap();
        let chain = registry.resolve("base-sepolia").unwrap();
        assert_eq!(chain.key(), "base_sepolia");
        assert_eq!(chain.chain_name(), "Chain 84532");
        assert_eq!(chain.explorer_url(), "https://sepolia.basescan.org");
    }

    #[test]
    fn test_resolve_unknown_route_is_not_found() {
        let registry = ChainRegistry::new(vec![ctx("base_sepolia", "base-sepolia")]).unwrap();
        let err = registry.resolve("nowhere").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Chain not found");
    }

    #[test]
    fn test_duplicate_routes_are_rejected() {
        let err = ChainRegistry::new(vec![ctx("a", "same"), ctx("b", "same")]).unwrap_err();
        assert!(matches!(err, EvmError::DuplicateRoute(route) if route == "same"));
    }

    #[test]
    fn test_iteration_follows_key_order() {
        let registry =
            ChainRegistry::new(vec![ctx("sepolia", "s"), ctx("base", "b"), ctx("polygon", "p")])
                .unwrap();
        let keys = registry.iter().map(ChainContext::key).collect::<Vec<_>>();
        assert_eq!(keys, ["base", "polygon", "sepolia"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_require_contract() {
        let chain = ctx("base", "base");
        assert_eq!(
            chain.require_contract().unwrap_err(),
            HodlError::ContractNotDeployed {
                chain: "base".into()
            }
        );
        let deployment = address!("0x1111111111111111111111111111111111111111");
        let chain = chain.with_lock_contract(deployment);
        assert_eq!(chain.require_contract().unwrap(), deployment);
    }
}
