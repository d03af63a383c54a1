//! Service startup logging for the bridge aggregator

use crate::settings::Settings;
use std::env;
use tracing::{info, warn};

/// Logs service, platform and environment information at startup
pub fn log_service_info() {
	// root package name, not this crate's
	let service_name = "bridge-aggregator";
	let service_version = env!("CARGO_PKG_VERSION");

	info!("=== Bridge Aggregator Service Starting ===");
	info!("🚀 Service: {} v{}", service_name, service_version);
	info!("💻 Platform: {} ({})", env::consts::OS, env::consts::ARCH);

	if let Ok(cwd) = env::current_dir() {
		info!("📁 Working Directory: {}", cwd.display());
	}
	if let Ok(rust_log) = env::var("RUST_LOG") {
		info!("🔧 Log Level: {}", rust_log);
	}

	info!(
		"🕒 Started at: {}",
		chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
	);
}

/// Logs the effective configuration, without secrets
pub fn log_settings_summary(settings: &Settings, adapter_ids: &[String]) {
	info!("🌉 Adapters: {}", adapter_ids.join(", "));
	info!(
		"⏱️ Quote timeout: {}ms, token list TTL: {}s",
		settings.aggregation.timeout_ms, settings.token_lists.ttl_secs
	);
	info!(
		"💾 Token list storage: {:?} ({})",
		settings.token_lists.storage.backend, settings.token_lists.storage.path
	);
	if let Some(minutes) = settings.token_lists.refresh_interval_minutes {
		info!("🔄 Token list refresh every {} minutes", minutes);
	}
	if !settings.rpc.is_empty() {
		info!("⛓️ RPC endpoints configured for {} chains", settings.rpc.len());
	}

	for (adapter_id, adapter) in &settings.adapters {
		if let Some(api_key) = &adapter.api_key {
			info!("🔑 {} API key from {}", adapter_id, api_key.description());
			if api_key.is_plain() {
				warn!("API key for {} is stored in plain text configuration", adapter_id);
			}
		}
	}
}

/// Logs service shutdown information
pub fn log_service_shutdown() {
	info!("🛑 Bridge Aggregator Service Shutting Down");
	info!(
		"🕒 Shutdown at: {}",
		chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
	);
}

/// Logs additional startup completion information
pub fn log_startup_complete(bind_address: &str) {
	info!("✅ Bridge Aggregator Service Started Successfully");
	info!("🌐 Server listening on: {}", bind_address);
	info!("📡 Ready to accept requests");
}
