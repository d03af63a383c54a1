//! Configuration settings structures

use crate::configurable_value::{ConfigurableValue, ConfigurableValueError};
use bridge_types::ProviderConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// Main application settings
///
/// Every section has defaults, so an empty configuration runs every known
/// adapter against its public endpoint.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Settings {
	pub server: ServerSettings,
	pub aggregation: AggregationSettings,
	pub token_lists: TokenListSettings,
	/// Per-adapter overrides keyed by adapter id
	pub adapters: HashMap<String, AdapterSettings>,
	/// JSON-RPC endpoint per chain id
	pub rpc: HashMap<String, String>,
	pub settlement: SettlementSettings,
	pub logging: LoggingSettings,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
	pub host: String,
	pub port: u16,
}

impl Default for ServerSettings {
	fn default() -> Self {
		Self {
			host: "0.0.0.0".to_string(),
			port: 3000,
		}
	}
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct AggregationSettings {
	/// Per-adapter quote timeout in milliseconds
	pub timeout_ms: u64,
}

impl Default for AggregationSettings {
	fn default() -> Self {
		Self { timeout_ms: 10_000 }
	}
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct TokenListSettings {
	pub ttl_secs: u64,
	pub fetch_timeout_ms: u64,
	/// Run token-list generation on this interval; unset disables the job
	pub refresh_interval_minutes: Option<u64>,
	pub storage: StorageSettings,
}

impl Default for TokenListSettings {
	fn default() -> Self {
		Self {
			ttl_secs: 24 * 60 * 60,
			fetch_timeout_ms: 30_000,
			refresh_interval_minutes: None,
			storage: StorageSettings::default(),
		}
	}
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct StorageSettings {
	pub backend: StorageBackend,
	/// Directory for the file backend
	pub path: String,
}

impl Default for StorageSettings {
	fn default() -> Self {
		Self {
			backend: StorageBackend::Memory,
			path: "data/token-lists".to_string(),
		}
	}
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
	Memory,
	File,
}

/// Overrides for one adapter
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct AdapterSettings {
	pub enabled: bool,
	pub endpoint: Option<String>,
	pub api_key: Option<ConfigurableValue>,
	/// Integrator / referrer tag sent to the provider
	pub integrator: Option<String>,
	pub timeout_ms: Option<u64>,
	pub headers: Option<HashMap<String, String>>,
}

impl Default for AdapterSettings {
	fn default() -> Self {
		Self {
			enabled: true,
			endpoint: None,
			api_key: None,
			integrator: None,
			timeout_ms: None,
			headers: None,
		}
	}
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct SettlementSettings {
	pub timeout_ms: u64,
	pub max_attempts: u32,
	pub retry_delay_ms: u64,
}

impl Default for SettlementSettings {
	fn default() -> Self {
		Self {
			timeout_ms: 10_000,
			max_attempts: 3,
			retry_delay_ms: 500,
		}
	}
}

/// Logging configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingSettings {
	pub level: String,
	pub format: LogFormat,
	/// Include targets and thread ids
	pub structured: bool,
}

impl Default for LoggingSettings {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			format: LogFormat::Pretty,
			structured: false,
		}
	}
}

/// Log format options
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	Json,
	Pretty,
	Compact,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigValidationError {
	#[error("{field} must be greater than zero")]
	ZeroValue { field: String },

	#[error("Unknown adapter '{adapter_id}' in configuration")]
	UnknownAdapter { adapter_id: String },

	#[error("Invalid endpoint for adapter '{adapter_id}': {endpoint}")]
	InvalidEndpoint { adapter_id: String, endpoint: String },

	#[error("Invalid chain id '{key}' in rpc section")]
	InvalidChainId { key: String },

	#[error("Invalid API key for adapter '{adapter_id}': {source}")]
	ApiKey {
		adapter_id: String,
		#[source]
		source: ConfigurableValueError,
	},
}

impl Settings {
	/// Get server bind address
	pub fn bind_address(&self) -> String {
		format!("{}:{}", self.server.host, self.server.port)
	}

	pub fn aggregation_timeout(&self) -> Duration {
		Duration::from_millis(self.aggregation.timeout_ms)
	}

	pub fn token_list_ttl(&self) -> Duration {
		Duration::from_secs(self.token_lists.ttl_secs)
	}

	pub fn token_list_fetch_timeout(&self) -> Duration {
		Duration::from_millis(self.token_lists.fetch_timeout_ms)
	}

	/// Whether `adapter_id` should be registered; unlisted adapters are on
	pub fn is_adapter_enabled(&self, adapter_id: &str) -> bool {
		self.adapters
			.get(adapter_id)
			.map(|adapter| adapter.enabled)
			.unwrap_or(true)
	}

	/// Ids from `known` that are enabled, in the order given
	pub fn enabled_adapters<'a>(&self, known: &[&'a str]) -> Vec<&'a str> {
		known
			.iter()
			.copied()
			.filter(|id| self.is_adapter_enabled(id))
			.collect()
	}

	/// Runtime provider configuration for an adapter
	///
	/// `default_endpoint` is used unless the adapter section overrides it.
	pub fn provider_config(
		&self,
		adapter_id: &str,
		default_endpoint: &str,
	) -> Result<ProviderConfig, ConfigValidationError> {
		let Some(overrides) = self.adapters.get(adapter_id) else {
			return Ok(ProviderConfig::new(default_endpoint));
		};

		let mut config =
			ProviderConfig::new(overrides.endpoint.as_deref().unwrap_or(default_endpoint));
		if let Some(api_key) = &overrides.api_key {
			let secret =
				api_key
					.resolve_secret()
					.map_err(|source| ConfigValidationError::ApiKey {
						adapter_id: adapter_id.to_string(),
						source,
					})?;
			config = config.with_api_key(secret);
		}
		if let Some(integrator) = &overrides.integrator {
			config = config.with_integrator(integrator.clone());
		}
		if let Some(timeout_ms) = overrides.timeout_ms {
			config = config.with_timeout_ms(timeout_ms);
		}
		for (name, value) in overrides.headers.iter().flatten() {
			config = config.with_header(name.clone(), value.clone());
		}
		Ok(config)
	}

	/// RPC endpoints keyed by numeric chain id
	pub fn rpc_urls(&self) -> Result<HashMap<u64, String>, ConfigValidationError> {
		self.rpc
			.iter()
			.map(|(key, url)| {
				key.trim()
					.parse::<u64>()
					.map(|chain_id| (chain_id, url.clone()))
					.map_err(|_| ConfigValidationError::InvalidChainId { key: key.clone() })
			})
			.collect()
	}

	/// Check the settings against the adapters this build knows about
	pub fn validate(&self, known_adapters: &[&str]) -> Result<(), ConfigValidationError> {
		let positive = [
			("aggregation.timeout_ms", self.aggregation.timeout_ms),
			("token_lists.ttl_secs", self.token_lists.ttl_secs),
			("token_lists.fetch_timeout_ms", self.token_lists.fetch_timeout_ms),
			("settlement.timeout_ms", self.settlement.timeout_ms),
			("settlement.max_attempts", self.settlement.max_attempts as u64),
		];
		for (field, value) in positive {
			if value == 0 {
				return Err(ConfigValidationError::ZeroValue {
					field: field.to_string(),
				});
			}
		}
		if self.token_lists.refresh_interval_minutes == Some(0) {
			return Err(ConfigValidationError::ZeroValue {
				field: "token_lists.refresh_interval_minutes".to_string(),
			});
		}

		for (adapter_id, adapter) in &self.adapters {
			if !known_adapters.contains(&adapter_id.as_str()) {
				return Err(ConfigValidationError::UnknownAdapter {
					adapter_id: adapter_id.clone(),
				});
			}
			if let Some(endpoint) = &adapter.endpoint {
				if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
					return Err(ConfigValidationError::InvalidEndpoint {
						adapter_id: adapter_id.clone(),
						endpoint: endpoint.clone(),
					});
				}
			}
			if adapter.timeout_ms == Some(0) {
				return Err(ConfigValidationError::ZeroValue {
					field: format!("adapters.{}.timeout_ms", adapter_id),
				});
			}
		}

		self.rpc_urls()?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const KNOWN: &[&str] = &["across", "li.fi", "near"];

	#[test]
	fn test_defaults() {
		let settings = Settings::default();
		assert_eq!(settings.bind_address(), "0.0.0.0:3000");
		assert_eq!(settings.aggregation_timeout(), Duration::from_secs(10));
		assert_eq!(settings.token_list_ttl(), Duration::from_secs(86_400));
		assert_eq!(settings.token_lists.storage.backend, StorageBackend::Memory);
		assert_eq!(settings.settlement.max_attempts, 3);
		assert!(settings.validate(KNOWN).is_ok());
		assert_eq!(settings.enabled_adapters(KNOWN), KNOWN.to_vec());
	}

	#[test]
	fn test_disabled_adapter_is_filtered() {
		let mut settings = Settings::default();
		settings.adapters.insert(
			"li.fi".to_string(),
			AdapterSettings {
				enabled: false,
				..Default::default()
			},
		);
		assert_eq!(settings.enabled_adapters(KNOWN), vec!["across", "near"]);
	}

	#[test]
	fn test_provider_config_applies_overrides() {
		let mut settings = Settings::default();
		settings.adapters.insert(
			"li.fi".to_string(),
			AdapterSettings {
				endpoint: Some("http://127.0.0.1:9000".to_string()),
				api_key: Some(ConfigurableValue::from_plain("lifi-key")),
				integrator: Some("bridge-aggregator".to_string()),
				timeout_ms: Some(2_500),
				headers: Some(HashMap::from([("x-extra".to_string(), "1".to_string())])),
				..Default::default()
			},
		);

		let config = settings
			.provider_config("li.fi", "https://li.quest/v1")
			.unwrap();
		assert_eq!(config.endpoint, "http://127.0.0.1:9000");
		assert_eq!(config.api_key.as_ref().map(|k| k.expose_secret()), Some("lifi-key"));
		assert_eq!(config.integrator.as_deref(), Some("bridge-aggregator"));
		assert_eq!(config.timeout_ms, 2_500);
		assert_eq!(config.headers.get("x-extra").map(String::as_str), Some("1"));

		let untouched = settings
			.provider_config("across", "https://app.across.to/api")
			.unwrap();
		assert_eq!(untouched.endpoint, "https://app.across.to/api");
		assert!(untouched.api_key.is_none());
	}

	#[test]
	fn test_missing_api_key_env_is_reported() {
		let mut settings = Settings::default();
		settings.adapters.insert(
			"near".to_string(),
			AdapterSettings {
				api_key: Some(ConfigurableValue::from_env("BRIDGE_SETTINGS_TEST_UNSET_KEY")),
				..Default::default()
			},
		);
		assert!(matches!(
			settings.provider_config("near", "https://1click.chaindefuser.com"),
			Err(ConfigValidationError::ApiKey { .. })
		));
	}

	#[test]
	fn test_validation_failures() {
		let mut zero_timeout = Settings::default();
		zero_timeout.aggregation.timeout_ms = 0;
		assert_eq!(
			zero_timeout.validate(KNOWN),
			Err(ConfigValidationError::ZeroValue {
				field: "aggregation.timeout_ms".to_string()
			})
		);

		let mut zero_ttl = Settings::default();
		zero_ttl.token_lists.ttl_secs = 0;
		assert!(zero_ttl.validate(KNOWN).is_err());

		let mut unknown = Settings::default();
		unknown.adapters.insert("hop".to_string(), AdapterSettings::default());
		assert_eq!(
			unknown.validate(KNOWN),
			Err(ConfigValidationError::UnknownAdapter {
				adapter_id: "hop".to_string()
			})
		);

		let mut bad_endpoint = Settings::default();
		bad_endpoint.adapters.insert(
			"across".to_string(),
			AdapterSettings {
				endpoint: Some("app.across.to".to_string()),
				..Default::default()
			},
		);
		assert!(matches!(
			bad_endpoint.validate(KNOWN),
			Err(ConfigValidationError::InvalidEndpoint { .. })
		));

		let mut bad_rpc = Settings::default();
		bad_rpc
			.rpc
			.insert("mainnet".to_string(), "http://localhost:8545".to_string());
		assert_eq!(
			bad_rpc.validate(KNOWN),
			Err(ConfigValidationError::InvalidChainId {
				key: "mainnet".to_string()
			})
		);
	}

	#[test]
	fn test_rpc_urls_parse_chain_ids() {
		let mut settings = Settings::default();
		settings
			.rpc
			.insert("1".to_string(), "https://eth.example".to_string());
		settings
			.rpc
			.insert("42161".to_string(), "https://arb.example".to_string());

		let urls = settings.rpc_urls().unwrap();
		assert_eq!(urls.get(&1).map(String::as_str), Some("https://eth.example"));
		assert_eq!(urls.len(), 2);
	}
}
