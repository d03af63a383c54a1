//! HTTP client cache shared by provider adapters
//!
//! Keeps one pooled `reqwest::Client` per (adapter, base URL, headers) so
//! keep-alive connections survive across quote requests.

use bridge_types::{AdapterError, AdapterResult, ProviderConfig, SecretString};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use reqwest::{Client, ClientBuilder};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

const USER_AGENT: &str = "bridge-aggregator/0.1";

/// Key and build settings for a cached client
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientConfig {
	pub base_url: String,
	pub adapter_id: String,
	pub max_idle_per_host: usize,
	pub keep_alive_timeout_ms: u64,
	/// Default headers, including credentials
	pub headers: Vec<(String, String)>,
}

impl ClientConfig {
	pub fn for_provider(adapter_id: &str, provider: &ProviderConfig) -> Self {
		let mut headers = vec![
			("User-Agent".to_string(), USER_AGENT.to_string()),
			("Accept".to_string(), "application/json".to_string()),
		];
		let mut extra: Vec<_> = provider
			.headers
			.iter()
			.map(|(key, value)| (key.clone(), value.clone()))
			.collect();
		// HashMap order is random; sort so equal configs hash equally
		extra.sort();
		headers.extend(extra);

		Self {
			base_url: provider.base_url().to_string(),
			adapter_id: adapter_id.to_string(),
			max_idle_per_host: 10,
			keep_alive_timeout_ms: 90_000,
			headers,
		}
	}
}

/// How a provider expects its API key
#[derive(Debug, Clone)]
pub enum AuthConfig {
	None,
	/// `Authorization: Bearer <token>`
	Bearer { token: SecretString },
	/// Key sent in a custom header
	ApiKey { header: String, key: SecretString },
}

impl AuthConfig {
	pub fn bearer(token: Option<&SecretString>) -> Self {
		match token {
			Some(token) => Self::Bearer {
				token: token.clone(),
			},
			None => Self::None,
		}
	}

	pub fn api_key(header: &str, key: Option<&SecretString>) -> Self {
		match key {
			Some(key) => Self::ApiKey {
				header: header.to_string(),
				key: key.clone(),
			},
			None => Self::None,
		}
	}
}

#[derive(Debug, Clone)]
struct CachedClient {
	client: Arc<Client>,
	created_at: Instant,
}

impl CachedClient {
	fn new(client: Client) -> Self {
		Self {
			client: Arc::new(client),
			created_at: Instant::now(),
		}
	}

	fn is_expired(&self, ttl: Duration) -> bool {
		self.created_at.elapsed() > ttl
	}
}

/// Thread-safe cache of HTTP clients with TTL
#[derive(Clone, Debug)]
pub struct ClientCache {
	clients: Arc<DashMap<ClientConfig, CachedClient>>,
	ttl: Duration,
}

impl ClientCache {
	/// Create a new client cache with default 30-minute TTL
	pub fn new() -> Self {
		Self::with_ttl(Duration::from_secs(30 * 60))
	}

	pub fn with_ttl(ttl: Duration) -> Self {
		Self {
			clients: Arc::new(DashMap::new()),
			ttl,
		}
	}

	/// Get or create a client for the given configuration
	pub fn get_client(&self, config: &ClientConfig) -> AdapterResult<Arc<Client>> {
		self.clients
			.remove_if(config, |_, cached| cached.is_expired(self.ttl));

		if let Some(cached) = self.clients.get(config) {
			return Ok(cached.client.clone());
		}

		debug!(
			"Creating HTTP client for {} ({})",
			config.adapter_id, config.base_url
		);
		let cached = CachedClient::new(Self::build_client(config)?);

		match self.clients.entry(config.clone()) {
			// another task won the race; use its client
			Entry::Occupied(entry) => Ok(entry.get().client.clone()),
			Entry::Vacant(entry) => {
				let client = cached.client.clone();
				entry.insert(cached);
				Ok(client)
			},
		}
	}

	/// Get or create a client for a provider, with its credentials applied
	pub fn get_client_with_auth(
		&self,
		adapter_id: &str,
		provider: &ProviderConfig,
		auth: &AuthConfig,
	) -> AdapterResult<Arc<Client>> {
		let mut config = ClientConfig::for_provider(adapter_id, provider);

		match auth {
			AuthConfig::None => {},
			AuthConfig::Bearer { token } => {
				config.headers.push((
					"Authorization".to_string(),
					format!("Bearer {}", token.expose_secret()),
				));
			},
			AuthConfig::ApiKey { header, key } => {
				config
					.headers
					.push((header.clone(), key.expose_secret().to_string()));
			},
		}

		self.get_client(&config)
	}

	fn build_client(config: &ClientConfig) -> AdapterResult<Client> {
		let mut header_map = reqwest::header::HeaderMap::new();
		for (key, value) in &config.headers {
			if let (Ok(name), Ok(value)) = (
				reqwest::header::HeaderName::from_bytes(key.as_bytes()),
				reqwest::header::HeaderValue::from_str(value),
			) {
				header_map.insert(name, value);
			}
		}

		ClientBuilder::new()
			.pool_max_idle_per_host(config.max_idle_per_host)
			.pool_idle_timeout(Duration::from_millis(config.keep_alive_timeout_ms))
			.tcp_keepalive(Duration::from_secs(60))
			.default_headers(header_map)
			.build()
			.map_err(AdapterError::HttpError)
	}

	/// Drop expired clients, returning how many were removed
	pub fn cleanup_expired(&self) -> usize {
		let before = self.clients.len();
		self.clients
			.retain(|_, cached| !cached.is_expired(self.ttl));
		before.saturating_sub(self.clients.len())
	}

	pub fn ttl(&self) -> Duration {
		self.ttl
	}

	pub fn len(&self) -> usize {
		self.clients.len()
	}

	pub fn is_empty(&self) -> bool {
		self.clients.is_empty()
	}

	/// Handle on the process-wide cache, the default for every adapter
	pub fn for_adapter() -> Self {
		GLOBAL_CLIENT_CACHE.clone()
	}
}

impl Default for ClientCache {
	fn default() -> Self {
		Self::new()
	}
}

lazy_static::lazy_static! {
	static ref GLOBAL_CLIENT_CACHE: ClientCache = ClientCache::new();
}
