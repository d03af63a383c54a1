//! Test server for end-to-end tests

use std::sync::Arc;

use bridge_aggregator::{AdapterRegistry, AggregatorBuilder, BridgeAdapter, Settings};
use tokio::task::JoinHandle;

/// Running server bound to an ephemeral local port
pub struct TestServer {
	pub base_url: String,
	pub handle: JoinHandle<()>,
}

#[allow(dead_code)]
impl TestServer {
	/// Spawn a server fanning out only to `adapters`
	pub async fn spawn_with_adapters(
		adapters: Vec<Arc<dyn BridgeAdapter>>,
		timeout_ms: u64,
	) -> Result<Self, Box<dyn std::error::Error>> {
		let mut settings = Settings::default();
		settings.aggregation.timeout_ms = timeout_ms;

		let mut builder = AggregatorBuilder::new()
			.with_settings(settings)
			.with_adapter_registry(AdapterRegistry::new());
		for adapter in adapters {
			builder = builder.with_adapter(adapter);
		}
		let (app, _state) = builder.start().await?;

		let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
		let addr = listener.local_addr()?;
		let handle = tokio::spawn(async move {
			if let Err(e) = axum::serve(listener, app).await {
				eprintln!("test server error: {}", e);
			}
		});

		Ok(Self {
			base_url: format!("http://{}", addr),
			handle,
		})
	}

	pub fn url(&self, path: &str) -> String {
		format!("{}{}", self.base_url, path)
	}

	pub fn abort(self) {
		self.handle.abort();
	}
}
