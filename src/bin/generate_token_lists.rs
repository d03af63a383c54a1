//! Offline token-list generation
//!
//! Fetches the token universe of every token-list adapter once and persists it
//! to the configured store, so a server started later has warm lists.
//! Exits non-zero if any adapter failed.

use bridge_aggregator::{config::StorageBackend, init_tracing, AggregatorBuilder};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	dotenvy::dotenv().ok();

	let builder = AggregatorBuilder::from_config()?;
	let settings = builder.settings().cloned().unwrap_or_default();
	init_tracing(&settings);

	if settings.token_lists.storage.backend == StorageBackend::Memory {
		warn!("Token list storage is in-memory; generated lists will not outlive this process");
	}

	let service = builder.build_service()?;
	let report = service.generate_token_lists().await;

	for result in &report.results {
		if result.success {
			info!("✅ {}: {} tokens", result.adapter_id, result.token_count);
		} else {
			error!(
				"❌ {}: {}",
				result.adapter_id,
				result.error.as_deref().unwrap_or("unknown error")
			);
		}
	}
	println!("{}", serde_json::to_string_pretty(&report)?);

	if report.failed > 0 {
		error!(
			"Token list generation finished with {} failure(s) out of {}",
			report.failed,
			report.results.len()
		);
		std::process::exit(1);
	}
	info!("Generated {} token list(s)", report.succeeded);
	Ok(())
}
