//! Per-adapter token-list cache
//!
//! Stale-while-revalidate: fresh entries are served directly, stale entries
//! are served while a single background refresh runs, and only a missing or
//! empty entry makes the caller wait for the provider. Empty fetches are
//! never committed.

use bridge_types::{AdapterError, BridgeAdapter, TokenListData, TokenListEntry, TokenListStorage};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Default time-to-live for a token list
pub const DEFAULT_TOKEN_LIST_TTL: Duration = Duration::from_secs(24 * 60 * 60);
/// Default bound on a single token-list fetch
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum CacheError {
	#[error("Adapter {adapter_id} does not publish a token list")]
	NotSupported { adapter_id: String },

	#[error("Token list fetch for {adapter_id} failed: {source}")]
	Fetch {
		adapter_id: String,
		#[source]
		source: AdapterError,
	},

	#[error("Token list fetch for {adapter_id} timed out after {timeout_ms}ms")]
	Timeout { adapter_id: String, timeout_ms: u64 },

	#[error("Token list fetch for {adapter_id} returned no tokens")]
	EmptyList { adapter_id: String },
}

pub type CacheResult<T> = Result<T, CacheError>;

#[derive(Debug, Clone, Copy)]
pub struct TokenListCacheConfig {
	pub ttl: Duration,
	pub fetch_timeout: Duration,
}

impl Default for TokenListCacheConfig {
	fn default() -> Self {
		Self {
			ttl: DEFAULT_TOKEN_LIST_TTL,
			fetch_timeout: DEFAULT_FETCH_TIMEOUT,
		}
	}
}

#[derive(Debug, Clone)]
struct CachedList {
	data: Arc<TokenListData>,
	fetched_at: DateTime<Utc>,
}

impl CachedList {
	fn from_entry(entry: TokenListEntry) -> Self {
		Self {
			data: Arc::new(entry.data),
			fetched_at: entry.fetched_at,
		}
	}

	fn to_entry(&self, adapter_id: &str) -> TokenListEntry {
		TokenListEntry {
			adapter_id: adapter_id.to_string(),
			data: self.data.as_ref().clone(),
			fetched_at: self.fetched_at,
		}
	}

	fn is_fresh(&self, ttl: Duration) -> bool {
		match (Utc::now() - self.fetched_at).to_std() {
			Ok(age) => age < ttl,
			Err(_) => true,
		}
	}
}

#[derive(Debug)]
struct CacheInner {
	config: TokenListCacheConfig,
	entries: DashMap<String, CachedList>,
	/// One writer per adapter id
	refresh_locks: DashMap<String, Arc<Mutex<()>>>,
	/// Adapter ids with a background refresh in flight
	refreshing: DashMap<String, ()>,
	storage: Option<Arc<dyn TokenListStorage>>,
}

/// Shared handle to the token-list cache
#[derive(Debug, Clone)]
pub struct TokenListCache {
	inner: Arc<CacheInner>,
}

impl Default for TokenListCache {
	fn default() -> Self {
		Self::new(TokenListCacheConfig::default())
	}
}

impl TokenListCache {
	pub fn new(config: TokenListCacheConfig) -> Self {
		Self::build(config, None)
	}

	/// Cache that reads through to `storage` on cold start and persists refreshes
	pub fn with_storage(config: TokenListCacheConfig, storage: Arc<dyn TokenListStorage>) -> Self {
		Self::build(config, Some(storage))
	}

	fn build(config: TokenListCacheConfig, storage: Option<Arc<dyn TokenListStorage>>) -> Self {
		Self {
			inner: Arc::new(CacheInner {
				config,
				entries: DashMap::new(),
				refresh_locks: DashMap::new(),
				refreshing: DashMap::new(),
				storage,
			}),
		}
	}

	pub fn config(&self) -> TokenListCacheConfig {
		self.inner.config
	}

	/// Put an entry in the cache as-is, without fetching or persisting it
	///
	/// Empty entries are ignored.
	pub fn seed(&self, entry: TokenListEntry) {
		if entry.data.is_empty() {
			return;
		}
		let adapter_id = entry.adapter_id.clone();
		self.inner
			.entries
			.insert(adapter_id, CachedList::from_entry(entry));
	}

	/// Snapshot of the cached entry for an adapter, never fetches
	pub fn entry(&self, adapter_id: &str) -> Option<TokenListEntry> {
		self.inner
			.entries
			.get(adapter_id)
			.map(|cached| cached.to_entry(adapter_id))
	}

	pub fn cached_adapter_ids(&self) -> Vec<String> {
		let mut ids: Vec<String> = self.inner.entries.iter().map(|e| e.key().clone()).collect();
		ids.sort();
		ids
	}

	/// Whether a background refresh is running for `adapter_id`
	pub fn is_refreshing(&self, adapter_id: &str) -> bool {
		self.inner.refreshing.contains_key(adapter_id)
	}

	/// Token list for `adapter`, following the stale-while-revalidate policy
	pub async fn get(&self, adapter: &Arc<dyn BridgeAdapter>) -> CacheResult<Arc<TokenListData>> {
		let adapter_id = adapter.id().to_string();
		if adapter.token_list_source().is_none() {
			return Err(CacheError::NotSupported { adapter_id });
		}

		if let Some(data) = self.serve_cached(adapter, &adapter_id) {
			return Ok(data);
		}

		if self.load_from_storage(&adapter_id).await {
			if let Some(data) = self.serve_cached(adapter, &adapter_id) {
				return Ok(data);
			}
		}

		debug!("No usable token list for {}, fetching synchronously", adapter_id);
		self.refresh_if_unusable(adapter).await
	}

	/// Fetch the adapter's token list now and commit it if non-empty
	pub async fn refresh(&self, adapter: &Arc<dyn BridgeAdapter>) -> CacheResult<Arc<TokenListData>> {
		let lock = self.lock_for(adapter.id());
		let _guard = lock.lock().await;
		self.fetch_and_commit(adapter).await
	}

	fn serve_cached(&self, adapter: &Arc<dyn BridgeAdapter>, adapter_id: &str) -> Option<Arc<TokenListData>> {
		let cached = self.inner.entries.get(adapter_id)?.clone();
		if cached.data.is_empty() {
			return None;
		}
		if !cached.is_fresh(self.inner.config.ttl) {
			self.spawn_refresh(adapter);
		}
		Some(cached.data)
	}

	async fn load_from_storage(&self, adapter_id: &str) -> bool {
		let Some(storage) = &self.inner.storage else {
			return false;
		};
		match storage.get(adapter_id).await {
			Ok(Some(entry)) if !entry.data.is_empty() => {
				debug!("Loaded token list for {} from storage", adapter_id);
				self.seed(entry);
				true
			},
			Ok(_) => false,
			Err(e) => {
				warn!("Failed to read stored token list for {}: {}", adapter_id, e);
				false
			},
		}
	}

	async fn refresh_if_unusable(&self, adapter: &Arc<dyn BridgeAdapter>) -> CacheResult<Arc<TokenListData>> {
		let lock = self.lock_for(adapter.id());
		let _guard = lock.lock().await;

		// another caller may have filled it while we waited
		let existing = self
			.inner
			.entries
			.get(adapter.id())
			.map(|cached| Arc::clone(&cached.data));
		if let Some(data) = existing.filter(|data| !data.is_empty()) {
			return Ok(data);
		}
		self.fetch_and_commit(adapter).await
	}

	fn spawn_refresh(&self, adapter: &Arc<dyn BridgeAdapter>) {
		let adapter_id = adapter.id().to_string();
		if self.inner.refreshing.insert(adapter_id.clone(), ()).is_some() {
			return;
		}

		debug!("Token list for {} is stale, refreshing in background", adapter_id);
		let cache = self.clone();
		let adapter = Arc::clone(adapter);
		tokio::spawn(async move {
			if let Err(e) = cache.refresh(&adapter).await {
				warn!("Background token list refresh failed: {}", e);
			}
			cache.inner.refreshing.remove(&adapter_id);
		});
	}

	fn lock_for(&self, adapter_id: &str) -> Arc<Mutex<()>> {
		self.inner
			.refresh_locks
			.entry(adapter_id.to_string())
			.or_insert_with(|| Arc::new(Mutex::new(())))
			.clone()
	}

	/// Caller must hold the adapter's refresh lock
	async fn fetch_and_commit(&self, adapter: &Arc<dyn BridgeAdapter>) -> CacheResult<Arc<TokenListData>> {
		let adapter_id = adapter.id().to_string();
		let source = adapter
			.token_list_source()
			.ok_or_else(|| CacheError::NotSupported {
				adapter_id: adapter_id.clone(),
			})?;

		let timeout = self.inner.config.fetch_timeout;
		let data = match tokio::time::timeout(timeout, source.fetch_token_list()).await {
			Ok(Ok(data)) => data,
			Ok(Err(source)) => return Err(CacheError::Fetch { adapter_id, source }),
			Err(_) => {
				return Err(CacheError::Timeout {
					adapter_id,
					timeout_ms: timeout.as_millis() as u64,
				})
			},
		};

		if data.is_empty() {
			warn!("Token list fetch for {} returned no tokens, keeping previous entry", adapter_id);
			return Err(CacheError::EmptyList { adapter_id });
		}

		let entry = TokenListEntry::new(adapter_id.clone(), data);
		if let Some(storage) = &self.inner.storage {
			if let Err(e) = storage.put(&entry).await {
				warn!("Failed to persist token list for {}: {}", adapter_id, e);
			}
		}

		let cached = CachedList::from_entry(entry);
		let data = Arc::clone(&cached.data);
		info!("Cached token list for {} ({} tokens)", adapter_id, data.len());
		self.inner.entries.insert(adapter_id, cached);
		Ok(data)
	}
}
