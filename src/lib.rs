//! Bridge Aggregator Library
//!
//! Fans a single cross-chain transfer request out to every configured bridge
//! provider, normalizes the answers into comparable quotes and exposes the
//! result over HTTP.

// Core domain types - the most commonly used types
pub use bridge_types::{
	chrono,
	// External dependencies for convenience
	serde_json,
	AdapterCapabilities,
	AdapterContext,
	// Error types
	AdapterError,
	AdapterInfo,
	// Adapter seams
	BridgeAdapter,
	ChainClient,
	ProviderConfig,
	// Primary domain entities
	Quote,
	QuoteRequest,
	QuoteValidationError,
	RankedQuote,
	RouteFilter,
	SettlementError,
	SettlementHook,
	Token,
	TokenListData,
	TokenListEntry,
	TokenListSource,
	TxRequest,
	U256,
};

// Service layer
pub use bridge_service::{
	AggregationReport, AggregatorService, BridgeExecution, MarketData, QuoteRanker,
	QuoteWarning, SettlementConfig, SettlementNotifier, SettlementOutcome, TokenListCache,
	TokenListCacheConfig, TokenListRefreshJob,
};

// Storage layer
pub use bridge_storage::{FileStore, MemoryStore, StorageError, StorageResult, TokenListStorage};

// API layer
pub use bridge_api::{create_router, AppState};

// Adapters
pub use bridge_adapters::{AdapterFactory, AdapterRegistry, JsonRpcChainClient, KNOWN_ADAPTER_IDS};

// Config
pub use bridge_config::{
	load_config, load_validated_config, log_service_info, log_startup_complete, Settings,
};

pub mod models {
	pub use bridge_types::*;
}

pub mod storage {
	pub use bridge_storage::*;
}

pub mod config {
	pub use bridge_config::*;
}

pub mod adapters {
	pub use bridge_adapters::*;
}

pub mod api {
	pub use bridge_api::*;
}

pub mod service {
	pub use bridge_service::*;
}

use std::net::SocketAddr;
use std::sync::Arc;

use bridge_config::{log_service_shutdown, log_settings_summary, LogFormat, StorageBackend};
use tracing::{info, warn};

// Re-export external dependencies for custom adapters
pub use async_trait;
pub use reqwest;

/// Builder pattern for configuring the aggregator
#[derive(Default)]
pub struct AggregatorBuilder {
	settings: Option<Settings>,
	adapter_registry: Option<AdapterRegistry>,
	adapters: Vec<Arc<dyn BridgeAdapter>>,
	token_storage: Option<Arc<dyn TokenListStorage>>,
}

impl AggregatorBuilder {
	/// Create a new aggregator builder with default settings
	pub fn new() -> Self {
		Self::default()
	}

	/// Create a builder from the configuration file and `BRIDGE__*` environment
	pub fn from_config() -> Result<Self, Box<dyn std::error::Error>> {
		let settings = load_validated_config(KNOWN_ADAPTER_IDS)?;
		Ok(Self::new().with_settings(settings))
	}

	/// Set custom settings
	pub fn with_settings(mut self, settings: Settings) -> Self {
		self.settings = Some(settings);
		self
	}

	/// Get the current settings
	pub fn settings(&self) -> Option<&Settings> {
		self.settings.as_ref()
	}

	/// Replace the registry that would otherwise be built from settings
	pub fn with_adapter_registry(mut self, registry: AdapterRegistry) -> Self {
		self.adapter_registry = Some(registry);
		self
	}

	/// Register a custom adapter (uses adapter's own ID)
	///
	/// Registered after the configured adapters, so it replaces a built-in
	/// adapter with the same id.
	pub fn with_adapter(mut self, adapter: Arc<dyn BridgeAdapter>) -> Self {
		self.adapters.push(adapter);
		self
	}

	/// Use `storage` for token lists instead of the configured backend
	pub fn with_token_storage(mut self, storage: Arc<dyn TokenListStorage>) -> Self {
		self.token_storage = Some(storage);
		self
	}

	/// Build the aggregation engine without starting any server
	pub fn build_service(&self) -> Result<Arc<AggregatorService>, Box<dyn std::error::Error>> {
		let settings = self.settings.clone().unwrap_or_default();

		let mut registry = match &self.adapter_registry {
			Some(registry) => registry.clone(),
			None => registry_from_settings(&settings)?,
		};
		for adapter in &self.adapters {
			registry.register(Arc::clone(adapter));
		}
		if registry.is_empty() {
			warn!("No bridge adapters registered; every quote request will return nothing");
		}

		let cache_config = TokenListCacheConfig {
			ttl: settings.token_list_ttl(),
			fetch_timeout: settings.token_list_fetch_timeout(),
		};
		let storage = match &self.token_storage {
			Some(storage) => Arc::clone(storage),
			None => token_storage_from_settings(&settings),
		};

		let settlement = SettlementConfig {
			timeout: std::time::Duration::from_millis(settings.settlement.timeout_ms),
			max_attempts: settings.settlement.max_attempts,
			retry_delay: std::time::Duration::from_millis(settings.settlement.retry_delay_ms),
		};

		let service = AggregatorService::new(Arc::new(registry), settings.aggregation_timeout())
			.with_token_cache(TokenListCache::with_storage(cache_config, storage))
			.with_settlement_config(settlement);

		Ok(Arc::new(service))
	}

	/// Start the aggregator and return the configured router with state
	pub async fn start(self) -> Result<(axum::Router, AppState), Box<dyn std::error::Error>> {
		let aggregator_service = self.build_service()?;
		info!(
			"Successfully initialized with {} adapter(s)",
			aggregator_service.adapter_registry().len()
		);

		let app_state = AppState::new(aggregator_service);
		let router = create_router().with_state(app_state.clone());

		Ok((router, app_state))
	}

	/// Start the complete server with all defaults and setup
	/// This method handles everything needed to run the server, including:
	/// - Loading .env file
	/// - Loading configuration with defaults
	/// - Initializing tracing
	/// - Starting the token list refresh job
	/// - Binding and serving the application until Ctrl+C
	pub async fn start_server(mut self) -> Result<(), Box<dyn std::error::Error>> {
		// Load .env file if it exists
		dotenvy::dotenv().ok();

		let using_provided_settings = self.settings.is_some();
		let settings = match self.settings.take() {
			Some(settings) => settings,
			None => load_validated_config(KNOWN_ADAPTER_IDS)?,
		};

		init_tracing(&settings);
		log_service_info();

		info!(
			"Using configuration: loaded from {}",
			if using_provided_settings {
				"provided settings"
			} else {
				"config file or defaults"
			}
		);

		let bind_addr = settings.bind_address();
		let addr: SocketAddr = bind_addr
			.parse()
			.map_err(|e| format!("Invalid bind address '{}': {}", bind_addr, e))?;

		self.settings = Some(settings.clone());

		let (app, state) = self.start().await?;
		log_settings_summary(&settings, &state.aggregator_service.adapter_registry().ids());

		let refresh_job = match settings.token_lists.refresh_interval_minutes {
			Some(minutes) => Some(TokenListRefreshJob::start(
				Arc::clone(&state.aggregator_service),
				minutes,
			)?),
			None => None,
		};

		let listener = tokio::net::TcpListener::bind(addr).await?;

		log_startup_complete(&bind_addr);
		info!("API endpoints available:");
		info!("  GET  /health");
		info!("  GET  /api/v1/adapters");
		info!("  GET  /api/v1/adapters/{{id}}/tokens");
		info!("  POST /api/v1/quotes");
		info!("  POST /api/v1/settlements");
		info!("  POST /api/v1/token-lists/refresh");

		axum::serve(listener, app)
			.with_graceful_shutdown(shutdown_signal())
			.await?;

		if let Some(job) = refresh_job {
			if let Err(e) = job.shutdown().await {
				warn!("Token list refresh job did not stop cleanly: {}", e);
			}
		}
		log_service_shutdown();

		Ok(())
	}
}

/// Initialize tracing with configuration-based settings
///
/// `RUST_LOG` wins over the configured level when set.
pub fn init_tracing(settings: &Settings) {
	let log_level = &settings.logging.level;
	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

	let result = match settings.logging.format {
		LogFormat::Json => {
			let subscriber = tracing_subscriber::fmt().json().with_env_filter(env_filter);

			if settings.logging.structured {
				subscriber.with_target(true).with_thread_ids(true).try_init()
			} else {
				subscriber.try_init()
			}
		},
		LogFormat::Pretty => {
			let subscriber = tracing_subscriber::fmt()
				.pretty()
				.with_env_filter(env_filter);

			if settings.logging.structured {
				subscriber.with_target(true).with_thread_ids(true).try_init()
			} else {
				subscriber.try_init()
			}
		},
		LogFormat::Compact => {
			let subscriber = tracing_subscriber::fmt()
				.compact()
				.with_env_filter(env_filter);

			if settings.logging.structured {
				subscriber.with_target(true).with_thread_ids(true).try_init()
			} else {
				subscriber.try_init()
			}
		},
	};

	match result {
		Ok(()) => info!(
			"Logging configuration applied: level={}, format={:?}, structured={}",
			settings.logging.level, settings.logging.format, settings.logging.structured
		),
		Err(e) => eprintln!("Tracing already initialized: {}", e),
	}
}

/// Registry of every enabled built-in adapter, configured from `settings`
pub fn registry_from_settings(
	settings: &Settings,
) -> Result<AdapterRegistry, Box<dyn std::error::Error>> {
	let rpc_urls = settings.rpc_urls()?;
	let chain_client: Option<Arc<dyn ChainClient>> = if rpc_urls.is_empty() {
		None
	} else {
		Some(Arc::new(JsonRpcChainClient::new(rpc_urls)))
	};

	let mut registry = AdapterRegistry::new();
	for adapter_id in settings.enabled_adapters(KNOWN_ADAPTER_IDS) {
		let Some(default_endpoint) = AdapterFactory::default_endpoint(adapter_id) else {
			continue;
		};
		let config = settings.provider_config(adapter_id, default_endpoint)?;
		let adapter = AdapterFactory::create(adapter_id, config, chain_client.clone())?;
		registry.register(adapter);
	}
	Ok(registry)
}

/// Token-list store selected by `token_lists.storage`
pub fn token_storage_from_settings(settings: &Settings) -> Arc<dyn TokenListStorage> {
	match settings.token_lists.storage.backend {
		StorageBackend::Memory => Arc::new(MemoryStore::new()),
		StorageBackend::File => Arc::new(FileStore::new(&settings.token_lists.storage.path)),
	}
}

async fn shutdown_signal() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		warn!("Failed to listen for shutdown signal: {}", e);
		std::future::pending::<()>().await;
	}
	info!("Shutdown signal received");
}
