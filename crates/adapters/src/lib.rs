//! Bridge Adapters
//!
//! Provider-specific adapters for the bridge quote aggregator, plus the shared
//! HTTP plumbing they use.

pub mod across_adapter;
pub mod bungee_adapter;
pub mod chain_client;
pub mod client_cache;
pub mod erc20;
pub mod lifi_adapter;
pub mod near_adapter;
pub mod rango_adapter;
pub mod relay_adapter;
pub mod stargate_adapter;
pub mod wire;

#[cfg(test)]
mod test_support;

pub use across_adapter::{AcrossAdapter, ACROSS_ADAPTER_ID};
pub use bungee_adapter::{BungeeAdapter, BUNGEE_ADAPTER_ID};
pub use chain_client::JsonRpcChainClient;
pub use client_cache::{AuthConfig, ClientCache, ClientConfig};
pub use lifi_adapter::{LifiAdapter, LIFI_ADAPTER_ID};
pub use near_adapter::{NearAdapter, NEAR_ADAPTER_ID};
pub use rango_adapter::{RangoAdapter, RANGO_ADAPTER_ID};
pub use relay_adapter::{RelayAdapter, RELAY_ADAPTER_ID};
pub use stargate_adapter::{StargateAdapter, STARGATE_ADAPTER_ID};
pub use bridge_types::{AdapterError, AdapterResult, BridgeAdapter};

use bridge_types::{ChainClient, ProviderConfig};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Every adapter id this crate can build
pub const KNOWN_ADAPTER_IDS: &[&str] = &[
	ACROSS_ADAPTER_ID,
	LIFI_ADAPTER_ID,
	RELAY_ADAPTER_ID,
	BUNGEE_ADAPTER_ID,
	STARGATE_ADAPTER_ID,
	RANGO_ADAPTER_ID,
	NEAR_ADAPTER_ID,
];

/// Factory for creating bridge adapters
pub struct AdapterFactory;

impl AdapterFactory {
	/// Public endpoint used when configuration does not override it
	pub fn default_endpoint(adapter_id: &str) -> Option<&'static str> {
		match adapter_id {
			ACROSS_ADAPTER_ID => Some(across_adapter::ACROSS_DEFAULT_ENDPOINT),
			LIFI_ADAPTER_ID => Some(lifi_adapter::LIFI_DEFAULT_ENDPOINT),
			RELAY_ADAPTER_ID => Some(relay_adapter::RELAY_DEFAULT_ENDPOINT),
			BUNGEE_ADAPTER_ID => Some(bungee_adapter::BUNGEE_DEFAULT_ENDPOINT),
			STARGATE_ADAPTER_ID => Some(stargate_adapter::STARGATE_DEFAULT_ENDPOINT),
			RANGO_ADAPTER_ID => Some(rango_adapter::RANGO_DEFAULT_ENDPOINT),
			NEAR_ADAPTER_ID => Some(near_adapter::NEAR_DEFAULT_ENDPOINT),
			_ => None,
		}
	}

	pub fn is_known(adapter_id: &str) -> bool {
		KNOWN_ADAPTER_IDS.contains(&adapter_id)
	}

	/// Build the adapter registered under `adapter_id`
	///
	/// `chain_client` is only used by adapters that estimate gas or inspect
	/// the sender's account on-chain.
	pub fn create(
		adapter_id: &str,
		config: ProviderConfig,
		chain_client: Option<Arc<dyn ChainClient>>,
	) -> AdapterResult<Arc<dyn BridgeAdapter>> {
		let adapter: Arc<dyn BridgeAdapter> = match adapter_id {
			ACROSS_ADAPTER_ID => Arc::new(AcrossAdapter::new(config)),
			LIFI_ADAPTER_ID => Arc::new(LifiAdapter::new(config)),
			RELAY_ADAPTER_ID => {
				let adapter = RelayAdapter::new(config);
				Arc::new(match chain_client {
					Some(chain) => adapter.with_chain_client(chain),
					None => adapter,
				})
			},
			BUNGEE_ADAPTER_ID => Arc::new(BungeeAdapter::new(config)),
			STARGATE_ADAPTER_ID => Arc::new(StargateAdapter::new(config)),
			RANGO_ADAPTER_ID => Arc::new(RangoAdapter::new(config)),
			NEAR_ADAPTER_ID => {
				let adapter = NearAdapter::new(config);
				Arc::new(match chain_client {
					Some(chain) => adapter.with_chain_client(chain),
					None => adapter,
				})
			},
			other => {
				return Err(AdapterError::ConfigError {
					reason: format!("unknown adapter '{}'", other),
				})
			},
		};
		debug!("Created adapter {}", adapter_id);
		Ok(adapter)
	}

	/// Build `adapter_id` against its public endpoint
	pub fn create_default(
		adapter_id: &str,
		chain_client: Option<Arc<dyn ChainClient>>,
	) -> AdapterResult<Arc<dyn BridgeAdapter>> {
		let endpoint = Self::default_endpoint(adapter_id).ok_or_else(|| AdapterError::ConfigError {
			reason: format!("unknown adapter '{}'", adapter_id),
		})?;
		Self::create(adapter_id, ProviderConfig::new(endpoint), chain_client)
	}
}

/// The set of adapters an engine fans out to, keyed by adapter id
#[derive(Debug, Clone, Default)]
pub struct AdapterRegistry {
	adapters: BTreeMap<String, Arc<dyn BridgeAdapter>>,
}

impl AdapterRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registry holding every known adapter on its public endpoint
	pub fn with_defaults(chain_client: Option<Arc<dyn ChainClient>>) -> AdapterResult<Self> {
		let mut registry = Self::new();
		for id in KNOWN_ADAPTER_IDS {
			registry.register(AdapterFactory::create_default(id, chain_client.clone())?);
		}
		Ok(registry)
	}

	/// Add an adapter, replacing any previous one with the same id
	pub fn register(&mut self, adapter: Arc<dyn BridgeAdapter>) {
		self.adapters.insert(adapter.id().to_string(), adapter);
	}

	pub fn get(&self, adapter_id: &str) -> Option<Arc<dyn BridgeAdapter>> {
		self.adapters.get(adapter_id).cloned()
	}

	pub fn contains(&self, adapter_id: &str) -> bool {
		self.adapters.contains_key(adapter_id)
	}

	/// All adapters, ordered by id
	pub fn all(&self) -> Vec<Arc<dyn BridgeAdapter>> {
		self.adapters.values().cloned().collect()
	}

	pub fn ids(&self) -> Vec<String> {
		self.adapters.keys().cloned().collect()
	}

	pub fn len(&self) -> usize {
		self.adapters.len()
	}

	pub fn is_empty(&self) -> bool {
		self.adapters.is_empty()
	}
}
