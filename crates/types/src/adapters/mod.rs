//! Adapter metadata, runtime configuration and capability traits

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

pub mod errors;
pub mod traits;

pub use errors::{AdapterError, SettlementError};
pub use traits::{BridgeAdapter, RouteFilter, SettlementHook, TokenListSource};

use crate::models::SecretString;
use crate::token_list::TokenListData;

/// Result type for adapter operations
pub type AdapterResult<T> = Result<T, AdapterError>;

/// Default per-request HTTP timeout for provider calls
pub const DEFAULT_PROVIDER_TIMEOUT_MS: u64 = 10_000;

/// Static description of an adapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterInfo {
	pub adapter_id: String,
	pub name: String,
	pub logo_uri: String,
	pub version: String,
}

impl AdapterInfo {
	pub fn new(adapter_id: &str, name: &str, logo_uri: &str) -> Self {
		Self {
			adapter_id: adapter_id.to_string(),
			name: name.to_string(),
			logo_uri: logo_uri.to_string(),
			version: "1.0.0".to_string(),
		}
	}
}

/// Optional capabilities an adapter instance exposes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterCapabilities {
	pub supports_route_check: bool,
	pub has_settlement_hook: bool,
	pub has_generated_token_list: bool,
}

/// Runtime configuration for talking to one provider
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
	/// Base URL of the provider API
	pub endpoint: String,
	pub api_key: Option<SecretString>,
	/// Integrator / referrer tag sent with quote requests
	pub integrator: Option<String>,
	/// HTTP timeout for a single provider call
	pub timeout_ms: u64,
	pub headers: HashMap<String, String>,
}

impl ProviderConfig {
	pub fn new(endpoint: impl Into<String>) -> Self {
		Self {
			endpoint: endpoint.into(),
			api_key: None,
			integrator: None,
			timeout_ms: DEFAULT_PROVIDER_TIMEOUT_MS,
			headers: HashMap::new(),
		}
	}

	pub fn with_api_key(mut self, api_key: impl Into<SecretString>) -> Self {
		self.api_key = Some(api_key.into());
		self
	}

	pub fn with_integrator(mut self, integrator: impl Into<String>) -> Self {
		self.integrator = Some(integrator.into());
		self
	}

	pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
		self.timeout_ms = timeout_ms;
		self
	}

	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.insert(name.into(), value.into());
		self
	}

	/// Base URL without a trailing slash, ready for path concatenation
	pub fn base_url(&self) -> &str {
		self.endpoint.trim_end_matches('/')
	}
}

/// Per-request data the engine hands to an adapter
///
/// Carries the adapter's cached token list when it publishes one, so route
/// checks and asset lookups never hit the network themselves.
#[derive(Debug, Clone, Default)]
pub struct AdapterContext {
	pub token_list: Option<Arc<TokenListData>>,
}

impl AdapterContext {
	pub fn with_token_list(token_list: Arc<TokenListData>) -> Self {
		Self {
			token_list: Some(token_list),
		}
	}
}
