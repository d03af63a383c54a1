//! Configurable in-process adapters for service tests

use async_trait::async_trait;
use bridge_types::{
	test_utils::sample_quote, AdapterContext, AdapterError, AdapterInfo, AdapterResult,
	BridgeAdapter, Quote, QuoteRequest, RouteFilter, SettlementError, SettlementHook,
	TokenListData, TokenListSource,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum QuoteBehavior {
	Succeed { amount: String, gas: String },
	Fail,
	Hang,
	Panic,
}

/// Chain-1 token list holding `tokens`
pub fn chain_tokens(tokens: &[&str]) -> TokenListData {
	let mut map = BTreeMap::new();
	map.insert(1u64, tokens.iter().map(|t| t.to_string()).collect());
	TokenListData::ChainTokens(map)
}

#[derive(Debug)]
pub struct MockAdapter {
	info: AdapterInfo,
	behavior: QuoteBehavior,
	delay: Duration,
	route_supported: Option<bool>,
	route_check_fails: bool,
	token_list: Option<TokenListData>,
	token_list_delay: Duration,
	/// Failures before post_bridge starts succeeding; `None` means no hook
	settlement_failures: Option<usize>,
	quote_calls: Arc<AtomicUsize>,
	route_calls: Arc<AtomicUsize>,
	token_list_calls: Arc<AtomicUsize>,
	settlement_calls: Arc<AtomicUsize>,
	seen_token_lists: Arc<Mutex<Vec<bool>>>,
}

impl MockAdapter {
	pub fn new(adapter_id: &str) -> Self {
		Self {
			info: AdapterInfo::new(adapter_id, adapter_id, "https://example.invalid/logo.png"),
			behavior: QuoteBehavior::Succeed {
				amount: "1000".to_string(),
				gas: "21000".to_string(),
			},
			delay: Duration::ZERO,
			route_supported: None,
			route_check_fails: false,
			token_list: None,
			token_list_delay: Duration::ZERO,
			settlement_failures: None,
			quote_calls: Arc::new(AtomicUsize::new(0)),
			route_calls: Arc::new(AtomicUsize::new(0)),
			token_list_calls: Arc::new(AtomicUsize::new(0)),
			settlement_calls: Arc::new(AtomicUsize::new(0)),
			seen_token_lists: Arc::new(Mutex::new(Vec::new())),
		}
	}

	pub fn quoting(mut self, amount: &str, gas: &str) -> Self {
		self.behavior = QuoteBehavior::Succeed {
			amount: amount.to_string(),
			gas: gas.to_string(),
		};
		self
	}

	pub fn failing(mut self) -> Self {
		self.behavior = QuoteBehavior::Fail;
		self
	}

	pub fn hanging(mut self) -> Self {
		self.behavior = QuoteBehavior::Hang;
		self
	}

	pub fn panicking(mut self) -> Self {
		self.behavior = QuoteBehavior::Panic;
		self
	}

	/// Route checks return an error instead of an answer
	pub fn route_check_failing(mut self) -> Self {
		self.route_check_fails = true;
		self
	}

	pub fn with_delay(mut self, delay: Duration) -> Self {
		self.delay = delay;
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

	pub fn with_token_list_delay(mut self, delay: Duration) -> Self {
		self.token_list_delay = delay;
		self
	}

	pub fn with_settlement(mut self, failures_before_success: usize) -> Self {
		self.settlement_failures = Some(failures_before_success);
		self
	}

	pub fn quote_calls(&self) -> Arc<AtomicUsize> {
		Arc::clone(&self.quote_calls)
	}

	pub fn route_calls(&self) -> Arc<AtomicUsize> {
		Arc::clone(&self.route_calls)
	}

	pub fn token_list_calls(&self) -> Arc<AtomicUsize> {
		Arc::clone(&self.token_list_calls)
	}

	pub fn settlement_calls(&self) -> Arc<AtomicUsize> {
		Arc::clone(&self.settlement_calls)
	}

	/// Whether each get_quote call received a token list in its context
	pub fn seen_token_lists(&self) -> Arc<Mutex<Vec<bool>>> {
		Arc::clone(&self.seen_token_lists)
	}
}

#[async_trait]
impl BridgeAdapter for MockAdapter {
	fn adapter_info(&self) -> &AdapterInfo {
		&self.info
	}

	async fn get_quote(&self, _request: &QuoteRequest, ctx: &AdapterContext) -> AdapterResult<Quote> {
		self.quote_calls.fetch_add(1, Ordering::SeqCst);
		self.seen_token_lists
			.lock()
			.unwrap()
			.push(ctx.token_list.is_some());
		tokio::time::sleep(self.delay).await;

		match &self.behavior {
			QuoteBehavior::Succeed { amount, gas } => Ok(sample_quote(self.id(), amount, gas)),
			QuoteBehavior::Fail => Err(AdapterError::http_failure(502, "upstream unavailable")),
			QuoteBehavior::Hang => {
				futures::future::pending::<()>().await;
				unreachable!()
			},
			QuoteBehavior::Panic => panic!("{} blew up while quoting", self.id()),
		}
	}

	fn route_filter(&self) -> Option<&dyn RouteFilter> {
		(self.route_supported.is_some() || self.route_check_fails).then_some(self as &dyn RouteFilter)
	}

	fn settlement_hook(&self) -> Option<&dyn SettlementHook> {
		self.settlement_failures.map(|_| self as &dyn SettlementHook)
	}

	fn token_list_source(&self) -> Option<&dyn TokenListSource> {
		self.token_list.as_ref().map(|_| self as &dyn TokenListSource)
	}
}

#[async_trait]
impl RouteFilter for MockAdapter {
	async fn supports_route(&self, _request: &QuoteRequest, _ctx: &AdapterContext) -> AdapterResult<bool> {
		self.route_calls.fetch_add(1, Ordering::SeqCst);
		if self.route_check_fails {
			return Err(AdapterError::http_failure(500, "route lookup failed"));
		}
		Ok(self.route_supported.unwrap_or(true))
	}
}

#[async_trait]
impl SettlementHook for MockAdapter {
	async fn post_bridge(&self, _quote: &Quote, _source_tx_hash: &str) -> Result<(), SettlementError> {
		let attempt = self.settlement_calls.fetch_add(1, Ordering::SeqCst);
		if attempt < self.settlement_failures.unwrap_or(0) {
			return Err(SettlementError::HttpStatus {
				status_code: 503,
				reason: "Service Unavailable".to_string(),
			});
		}
		Ok(())
	}
}

#[async_trait]
impl TokenListSource for MockAdapter {
	async fn fetch_token_list(&self) -> AdapterResult<TokenListData> {
		self.token_list_calls.fetch_add(1, Ordering::SeqCst);
		tokio::time::sleep(self.token_list_delay).await;
		self.token_list
			.clone()
			.ok_or_else(|| AdapterError::invalid_response("no token list configured"))
	}
}
