//! Timing-controlled mock adapters for integration tests

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bridge_aggregator::async_trait::async_trait;
use bridge_aggregator::models::{test_utils::sample_quote, AdapterResult};
use bridge_aggregator::{
	AdapterContext, AdapterError, AdapterInfo, BridgeAdapter, Quote, QuoteRequest, RouteFilter,
	SettlementError, SettlementHook, TokenListData, TokenListSource,
};

/// Call tracking for verifying which adapters were actually called
#[derive(Debug, Clone, Default)]
pub struct CallTracker {
	pub calls: Arc<AtomicUsize>,
}

impl CallTracker {
	pub fn record_call(&self) -> usize {
		self.calls.fetch_add(1, Ordering::SeqCst)
	}

	pub fn call_count(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}

/// Chain-1 token list holding `tokens`
#[allow(dead_code)]
pub fn mock_token_list(tokens: &[&str]) -> TokenListData {
	let mut map = BTreeMap::new();
	map.insert(1u64, tokens.iter().map(|t| t.to_lowercase()).collect());
	TokenListData::ChainTokens(map)
}

#[derive(Debug, Clone)]
enum Response {
	Quote { amount: String, gas: String },
	Fail,
	Never,
}

/// Mock adapter that responds after a configurable delay
#[derive(Debug, Clone)]
pub struct TimingControlledAdapter {
	info: AdapterInfo,
	delay: Duration,
	response: Response,
	route_supported: Option<bool>,
	token_list: Option<TokenListData>,
	settlement_failures: Option<usize>,
	pub quotes: CallTracker,
	pub route_checks: CallTracker,
	pub token_list_fetches: CallTracker,
	pub settlements: CallTracker,
}

#[allow(dead_code)]
impl TimingControlledAdapter {
	/// Adapter quoting `amount` after `delay_ms`
	pub fn new(id: &str, delay_ms: u64, amount: &str) -> Self {
		Self {
			info: AdapterInfo::new(id, &format!("Timing Controlled {}", id), "https://example.invalid/logo.png"),
			delay: Duration::from_millis(delay_ms),
			response: Response::Quote {
				amount: amount.to_string(),
				gas: "21000".to_string(),
			},
			route_supported: None,
			token_list: None,
			settlement_failures: None,
			quotes: CallTracker::default(),
			route_checks: CallTracker::default(),
			token_list_fetches: CallTracker::default(),
			settlements: CallTracker::default(),
		}
	}

	/// Create a fast-responding adapter (responds in ~10ms)
	pub fn fast(id: &str, amount: &str) -> Self {
		Self::new(id, 10, amount)
	}

	/// Create an adapter whose quote never settles
	pub fn never(id: &str) -> Self {
		let mut adapter = Self::new(id, 0, "0");
		adapter.response = Response::Never;
		adapter
	}

	/// Create an adapter that always fails
	pub fn failing(id: &str) -> Self {
		let mut adapter = Self::new(id, 10, "0");
		adapter.response = Response::Fail;
		adapter
	}

	pub fn with_gas(mut self, gas: &str) -> Self {
		if let Response::Quote { gas: current, .. } = &mut self.response {
			*current = gas.to_string();
		}
		self
	}

	pub fn with_route_support(mut self, supported: bool) -> Self {
		self.route_supported = Some(supported);
		self
	}

	pub fn with_token_list(mut self, data: TokenListData) -> Self {
		self.token_list = Some(data);
		self
	}

	/// Adds a settlement hook that fails `failures` times before succeeding
	pub fn with_settlement(mut self, failures: usize) -> Self {
		self.settlement_failures = Some(failures);
		self
	}

	pub fn shared(self) -> Arc<dyn BridgeAdapter> {
		Arc::new(self)
	}
}

#[async_trait]
impl BridgeAdapter for TimingControlledAdapter {
	fn adapter_info(&self) -> &AdapterInfo {
		&self.info
	}

	async fn get_quote(&self, _request: &QuoteRequest, _ctx: &AdapterContext) -> AdapterResult<Quote> {
		self.quotes.record_call();
		tokio::time::sleep(self.delay).await;

		match &self.response {
			Response::Quote { amount, gas } => Ok(sample_quote(self.id(), amount, gas)),
			Response::Fail => Err(AdapterError::http_failure(500, "Internal Server Error")),
			Response::Never => {
				std::future::pending::<()>().await;
				unreachable!()
			},
		}
	}

	fn route_filter(&self) -> Option<&dyn RouteFilter> {
		self.route_supported.map(|_| self as &dyn RouteFilter)
	}

	fn settlement_hook(&self) -> Option<&dyn SettlementHook> {
		self.settlement_failures.map(|_| self as &dyn SettlementHook)
	}

	fn token_list_source(&self) -> Option<&dyn TokenListSource> {
		self.token_list.as_ref().map(|_| self as &dyn TokenListSource)
	}
}

#[async_trait]
impl RouteFilter for TimingControlledAdapter {
	async fn supports_route(&self, _request: &QuoteRequest, _ctx: &AdapterContext) -> AdapterResult<bool> {
		self.route_checks.record_call();
		Ok(self.route_supported.unwrap_or(true))
	}
}

#[async_trait]
impl SettlementHook for TimingControlledAdapter {
	async fn post_bridge(&self, _quote: &Quote, _source_tx_hash: &str) -> Result<(), SettlementError> {
		let attempt = self.settlements.record_call();
		if attempt < self.settlement_failures.unwrap_or(0) {
			return Err(SettlementError::HttpStatus {
				status_code: 502,
				reason: "Bad Gateway".to_string(),
			});
		}
		Ok(())
	}
}

#[async_trait]
impl TokenListSource for TimingControlledAdapter {
	async fn fetch_token_list(&self) -> AdapterResult<TokenListData> {
		self.token_list_fetches.record_call();
		self.token_list
			.clone()
			.ok_or_else(|| AdapterError::invalid_response("no token list"))
	}
}
