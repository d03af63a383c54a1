//! Core aggregation service logic
//!
//! A request is validated, route-checked adapter by adapter, then fanned out to
//! every surviving adapter at once. Each call races its own timeout; the
//! engine waits for all of them and keeps only the successes.

use crate::settlement::{SettlementConfig, SettlementNotifier, SettlementOutcome};
use crate::token_cache::TokenListCache;
use bridge_adapters::AdapterRegistry;
use bridge_types::{AdapterContext, BridgeAdapter, Quote, QuoteRequest, QuoteValidationError, U256};
use futures::future::join_all;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Default per-adapter quote timeout
pub const DEFAULT_AGGREGATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that fail a whole aggregation call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AggregatorServiceError {
	#[error("Invalid quote request: {0}")]
	Validation(#[from] QuoteValidationError),
}

pub type AggregatorResult<T> = Result<T, AggregatorServiceError>;

/// Why one adapter contributed nothing to a result set
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuoteFailure {
	#[error("route not supported: {reason}")]
	RouteUnsupported { reason: String },

	#[error("provider error: {message}")]
	ProviderError { message: String },

	#[error("timed out after {timeout_ms}ms")]
	Timeout { timeout_ms: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OutcomeKind {
	Success,
	RouteUnsupported,
	ProviderError,
	Timeout,
}

/// What happened to one adapter during an aggregation call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterOutcome {
	pub adapter_id: String,
	pub outcome: OutcomeKind,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub detail: Option<String>,
	pub duration_ms: u64,
}

impl AdapterOutcome {
	fn success(adapter_id: &str, elapsed: Duration) -> Self {
		Self {
			adapter_id: adapter_id.to_string(),
			outcome: OutcomeKind::Success,
			detail: None,
			duration_ms: elapsed.as_millis() as u64,
		}
	}

	fn failure(adapter_id: &str, failure: &QuoteFailure, elapsed: Duration) -> Self {
		let outcome = match failure {
			QuoteFailure::RouteUnsupported { .. } => OutcomeKind::RouteUnsupported,
			QuoteFailure::ProviderError { .. } => OutcomeKind::ProviderError,
			QuoteFailure::Timeout { .. } => OutcomeKind::Timeout,
		};
		Self {
			adapter_id: adapter_id.to_string(),
			outcome,
			detail: Some(failure.to_string()),
			duration_ms: elapsed.as_millis() as u64,
		}
	}
}

/// Successful quotes plus the per-adapter record of everything that was dropped
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationReport {
	pub quotes: Vec<Quote>,
	pub outcomes: Vec<AdapterOutcome>,
	pub adapters_considered: usize,
	pub route_unsupported: usize,
	pub succeeded: usize,
	pub failed: usize,
	pub timed_out: usize,
	pub total_duration_ms: u64,
}

impl AggregationReport {
	fn record(&mut self, outcome: AdapterOutcome) {
		match outcome.outcome {
			OutcomeKind::Success => self.succeeded += 1,
			OutcomeKind::RouteUnsupported => self.route_unsupported += 1,
			OutcomeKind::ProviderError => self.failed += 1,
			OutcomeKind::Timeout => self.timed_out += 1,
		}
		self.outcomes.push(outcome);
	}

	pub fn outcome_for(&self, adapter_id: &str) -> Option<&AdapterOutcome> {
		self.outcomes.iter().find(|o| o.adapter_id == adapter_id)
	}
}

/// Per-adapter result of a token-list generation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenListGenerationResult {
	pub adapter_id: String,
	pub success: bool,
	pub token_count: usize,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenListGenerationReport {
	pub results: Vec<TokenListGenerationResult>,
	pub succeeded: usize,
	pub failed: usize,
}

/// Service for aggregating quotes from multiple bridge adapters
#[derive(Debug, Clone)]
pub struct AggregatorService {
	adapter_registry: Arc<AdapterRegistry>,
	token_cache: TokenListCache,
	notifier: SettlementNotifier,
	timeout: Duration,
}

impl AggregatorService {
	/// Create a service with a fresh token-list cache and default settlement policy
	pub fn new(adapter_registry: Arc<AdapterRegistry>, timeout: Duration) -> Self {
		let notifier =
			SettlementNotifier::new(Arc::clone(&adapter_registry), SettlementConfig::default());
		Self {
			adapter_registry,
			token_cache: TokenListCache::default(),
			notifier,
			timeout,
		}
	}

	pub fn with_token_cache(mut self, token_cache: TokenListCache) -> Self {
		self.token_cache = token_cache;
		self
	}

	pub fn with_settlement_config(mut self, config: SettlementConfig) -> Self {
		self.notifier = SettlementNotifier::new(Arc::clone(&self.adapter_registry), config);
		self
	}

	pub fn adapter_registry(&self) -> &Arc<AdapterRegistry> {
		&self.adapter_registry
	}

	pub fn token_cache(&self) -> &TokenListCache {
		&self.token_cache
	}

	pub fn notifier(&self) -> &SettlementNotifier {
		&self.notifier
	}

	pub fn timeout(&self) -> Duration {
		self.timeout
	}

	/// Fetch quotes from every adapter (or `adapter_subset`) that supports the route
	///
	/// Partial failure never fails the call; an empty list means no route was
	/// found. Only a malformed request is an error.
	pub async fn get_quotes(
		&self,
		request: &QuoteRequest,
		adapter_subset: Option<&[String]>,
	) -> AggregatorResult<Vec<Quote>> {
		Ok(self
			.get_quotes_with_report(request, adapter_subset)
			.await?
			.quotes)
	}

	/// Same as [`get_quotes`](Self::get_quotes), keeping the per-adapter outcomes
	pub async fn get_quotes_with_report(
		&self,
		request: &QuoteRequest,
		adapter_subset: Option<&[String]>,
	) -> AggregatorResult<AggregationReport> {
		request.validate()?;
		let started = Instant::now();
		let adapters = self.resolve_adapters(adapter_subset);

		let mut report = AggregationReport {
			adapters_considered: adapters.len(),
			..Default::default()
		};
		info!(
			"Fetching quotes for {} {} -> {} {} from {} adapters",
			request.src_chain_id,
			request.input_token.symbol,
			request.dst_chain_id,
			request.output_token.symbol,
			adapters.len()
		);

		// route checks are cheap and run one adapter at a time
		let mut eligible = Vec::with_capacity(adapters.len());
		for adapter in adapters {
			let check_started = Instant::now();
			let ctx = self.adapter_context(&adapter).await;
			match check_route(adapter.as_ref(), request, &ctx).await {
				Ok(()) => eligible.push((adapter, ctx)),
				Err(failure) => {
					debug!("Skipping adapter {}: {}", adapter.id(), failure);
					report.record(AdapterOutcome::failure(
						adapter.id(),
						&failure,
						check_started.elapsed(),
					));
				},
			}
		}

		let request = Arc::new(request.clone());
		let timeout = self.timeout;
		let mut tasks = JoinSet::new();
		for (adapter, ctx) in eligible {
			let request = Arc::clone(&request);
			tasks.spawn(async move {
				let call_started = Instant::now();
				let result = fetch_quote(adapter.as_ref(), &request, &ctx, timeout).await;
				(adapter.id().to_string(), result, call_started.elapsed())
			});
		}

		// every call settles (quote, error or timeout) before results are returned
		while let Some(joined) = tasks.join_next().await {
			let (adapter_id, result, elapsed) = match joined {
				Ok(settled) => settled,
				Err(e) => {
					warn!("Quote task ended abnormally: {}", e);
					continue;
				},
			};
			match result {
				Ok(quote) => {
					debug!("Got quote from {} in {}ms", adapter_id, elapsed.as_millis());
					report.record(AdapterOutcome::success(&adapter_id, elapsed));
					report.quotes.push(quote);
				},
				Err(failure) => {
					warn!("Adapter {} dropped from results: {}", adapter_id, failure);
					report.record(AdapterOutcome::failure(&adapter_id, &failure, elapsed));
				},
			}
		}

		report.total_duration_ms = started.elapsed().as_millis() as u64;
		info!(
			"Quote aggregation completed: {} quotes, {} route unsupported, {} failed, {} timed out in {}ms",
			report.succeeded,
			report.route_unsupported,
			report.failed,
			report.timed_out,
			report.total_duration_ms
		);
		Ok(report)
	}

	/// Hand a confirmed source transaction to the quote's adapter, if it needs one
	pub async fn post_bridge(&self, quote: &Quote, source_tx_hash: &str) -> SettlementOutcome {
		self.notifier.notify(quote, source_tx_hash).await
	}

	/// Refresh and persist every token-list-capable adapter's token universe
	pub async fn generate_token_lists(&self) -> TokenListGenerationReport {
		let adapters: Vec<_> = self
			.adapter_registry
			.all()
			.into_iter()
			.filter(|adapter| adapter.token_list_source().is_some())
			.collect();
		info!("Generating token lists for {} adapters", adapters.len());

		let tasks = adapters.iter().map(|adapter| async move {
			match self.token_cache.refresh(adapter).await {
				Ok(data) => TokenListGenerationResult {
					adapter_id: adapter.id().to_string(),
					success: true,
					token_count: data.len(),
					error: None,
				},
				Err(e) => {
					warn!("Token list generation failed for {}: {}", adapter.id(), e);
					TokenListGenerationResult {
						adapter_id: adapter.id().to_string(),
						success: false,
						token_count: 0,
						error: Some(e.to_string()),
					}
				},
			}
		});

		let results = join_all(tasks).await;
		let succeeded = results.iter().filter(|r| r.success).count();
		TokenListGenerationReport {
			failed: results.len() - succeeded,
			succeeded,
			results,
		}
	}

	fn resolve_adapters(&self, adapter_subset: Option<&[String]>) -> Vec<Arc<dyn BridgeAdapter>> {
		match adapter_subset {
			None => self.adapter_registry.all(),
			Some(ids) => {
				let mut adapters: Vec<Arc<dyn BridgeAdapter>> = Vec::with_capacity(ids.len());
				for id in ids {
					if adapters.iter().any(|a| a.id() == id) {
						continue;
					}
					match self.adapter_registry.get(id) {
						Some(adapter) => adapters.push(adapter),
						None => warn!("Ignoring unknown adapter '{}' in request subset", id),
					}
				}
				adapters
			},
		}
	}

	async fn adapter_context(&self, adapter: &Arc<dyn BridgeAdapter>) -> AdapterContext {
		if adapter.token_list_source().is_none() {
			return AdapterContext::default();
		}
		match self.token_cache.get(adapter).await {
			Ok(data) => AdapterContext::with_token_list(data),
			Err(e) => {
				warn!("No token list for {}: {}", adapter.id(), e);
				AdapterContext::default()
			},
		}
	}
}

async fn check_route(
	adapter: &dyn BridgeAdapter,
	request: &QuoteRequest,
	ctx: &AdapterContext,
) -> Result<(), QuoteFailure> {
	let Some(filter) = adapter.route_filter() else {
		return Ok(());
	};
	match filter.supports_route(request, ctx).await {
		Ok(true) => Ok(()),
		Ok(false) => Err(QuoteFailure::RouteUnsupported {
			reason: "declined by adapter".to_string(),
		}),
		Err(e) => Err(QuoteFailure::RouteUnsupported {
			reason: e.to_string(),
		}),
	}
}

/// Race one adapter's quote against `timeout`
///
/// Losing the race drops the adapter future, which aborts its in-flight HTTP
/// call. A panicking adapter is reported as a provider error.
async fn fetch_quote(
	adapter: &dyn BridgeAdapter,
	request: &QuoteRequest,
	ctx: &AdapterContext,
	timeout: Duration,
) -> Result<Quote, QuoteFailure> {
	let call = AssertUnwindSafe(adapter.get_quote(request, ctx)).catch_unwind();
	let quote = match tokio::time::timeout(timeout, call).await {
		Ok(Ok(Ok(quote))) => quote,
		Ok(Ok(Err(e))) => {
			return Err(QuoteFailure::ProviderError {
				message: e.to_string(),
			})
		},
		Ok(Err(_)) => {
			return Err(QuoteFailure::ProviderError {
				message: "adapter panicked".to_string(),
			})
		},
		Err(_) => {
			return Err(QuoteFailure::Timeout {
				timeout_ms: timeout.as_millis() as u64,
			})
		},
	};
	sanitize_quote(adapter.id(), quote)
}

/// Amounts must be digit strings; an unreadable gas figure becomes unknown
fn sanitize_quote(adapter_id: &str, mut quote: Quote) -> Result<Quote, QuoteFailure> {
	if let Err(reason) = quote.estimated_amount.validate() {
		return Err(QuoteFailure::ProviderError {
			message: format!("invalid estimatedAmount: {}", reason),
		});
	}
	if quote.gas_estimate.validate().is_err() {
		warn!(
			"Adapter {} returned unreadable gas estimate '{}', treating as unknown",
			adapter_id, quote.gas_estimate
		);
		quote.gas_estimate = U256::zero();
	}
	Ok(quote)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_mocks::{chain_tokens, MockAdapter};
	use bridge_types::test_utils::{sample_quote, sample_request, USDC_ETHEREUM};
	use std::sync::atomic::Ordering;

	fn service(adapters: Vec<MockAdapter>, timeout: Duration) -> AggregatorService {
		let mut registry = AdapterRegistry::new();
		for adapter in adapters {
			registry.register(Arc::new(adapter));
		}
		AggregatorService::new(Arc::new(registry), timeout)
	}

	fn ids(quotes: &[Quote]) -> Vec<String> {
		let mut ids: Vec<String> = quotes.iter().map(|q| q.adapter_id.clone()).collect();
		ids.sort();
		ids
	}

	#[tokio::test]
	async fn test_partial_failure_is_isolated() {
		let service = service(
			vec![
				MockAdapter::new("across").quoting("100", "21000"),
				MockAdapter::new("li.fi").failing(),
				MockAdapter::new("relay").quoting("90", "0"),
			],
			Duration::from_secs(1),
		);

		let report = service
			.get_quotes_with_report(&sample_request(), None)
			.await
			.unwrap();
		assert_eq!(ids(&report.quotes), vec!["across", "relay"]);
		assert_eq!(report.adapters_considered, 3);
		assert_eq!(report.succeeded, 2);
		assert_eq!(report.failed, 1);
		assert_eq!(
			report.outcome_for("li.fi").map(|o| o.outcome),
			Some(OutcomeKind::ProviderError)
		);
	}

	#[tokio::test]
	async fn test_panicking_adapter_is_reported_as_provider_error() {
		let service = service(
			vec![
				MockAdapter::new("across").quoting("100", "21000"),
				MockAdapter::new("bungee").panicking(),
				MockAdapter::new("relay").quoting("90", "21000"),
			],
			Duration::from_secs(1),
		);

		let report = service
			.get_quotes_with_report(&sample_request(), None)
			.await
			.unwrap();
		assert_eq!(ids(&report.quotes), vec!["across", "relay"]);
		assert_eq!(report.failed, 1);
		assert_eq!(
			report.outcome_for("bungee").map(|o| o.outcome),
			Some(OutcomeKind::ProviderError)
		);
	}

	#[tokio::test]
	async fn test_failing_route_check_counts_as_unsupported() {
		let broken = MockAdapter::new("stargate").route_check_failing();
		let broken_calls = broken.quote_calls();
		let service = service(
			vec![broken, MockAdapter::new("across").quoting("100", "21000")],
			Duration::from_secs(1),
		);

		let report = service
			.get_quotes_with_report(&sample_request(), None)
			.await
			.unwrap();
		assert_eq!(ids(&report.quotes), vec!["across"]);
		assert_eq!(report.route_unsupported, 1);
		assert_eq!(
			report.outcome_for("stargate").map(|o| o.outcome),
			Some(OutcomeKind::RouteUnsupported)
		);
		assert_eq!(broken_calls.load(Ordering::SeqCst), 0);
	}

	#[tokio::test(start_paused = true)]
	async fn test_hanging_adapter_is_bounded_by_timeout() {
		let service = service(
			vec![
				MockAdapter::new("a")
					.quoting("100", "21000")
					.with_delay(Duration::from_millis(200)),
				MockAdapter::new("b")
					.quoting("90", "21000")
					.with_delay(Duration::from_millis(50)),
				MockAdapter::new("c").hanging(),
			],
			Duration::from_millis(1000),
		);

		let started = tokio::time::Instant::now();
		let report = service
			.get_quotes_with_report(&sample_request(), None)
			.await
			.unwrap();
		let elapsed = started.elapsed();

		assert_eq!(ids(&report.quotes), vec!["a", "b"]);
		assert_eq!(report.timed_out, 1);
		assert!(elapsed >= Duration::from_millis(1000));
		assert!(elapsed < Duration::from_millis(1200));
	}

	#[tokio::test]
	async fn test_route_filter_short_circuits_get_quote() {
		let declined = MockAdapter::new("d").with_route_support(false);
		let declined_calls = declined.quote_calls();
		let declined_checks = declined.route_calls();
		let service = service(
			vec![declined, MockAdapter::new("e").with_route_support(true)],
			Duration::from_secs(1),
		);

		let report = service
			.get_quotes_with_report(&sample_request(), None)
			.await
			.unwrap();
		assert_eq!(ids(&report.quotes), vec!["e"]);
		assert_eq!(report.route_unsupported, 1);
		assert_eq!(declined_checks.load(Ordering::SeqCst), 1);
		assert_eq!(declined_calls.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn test_all_failing_yields_empty_list() {
		let service = service(
			vec![
				MockAdapter::new("a").failing(),
				MockAdapter::new("b").with_route_support(false),
			],
			Duration::from_secs(1),
		);
		let quotes = service.get_quotes(&sample_request(), None).await.unwrap();
		assert!(quotes.is_empty());
	}

	#[tokio::test]
	async fn test_validation_error_is_returned_before_fan_out() {
		let adapter = MockAdapter::new("a");
		let calls = adapter.quote_calls();
		let service = service(vec![adapter], Duration::from_secs(1));

		let mut request = sample_request();
		request.sender = String::new();
		let result = service.get_quotes(&request, None).await;
		assert!(matches!(result, Err(AggregatorServiceError::Validation(_))));
		assert_eq!(calls.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn test_subset_restricts_and_ignores_unknown_ids() {
		let skipped = MockAdapter::new("b");
		let skipped_calls = skipped.quote_calls();
		let service = service(vec![MockAdapter::new("a"), skipped], Duration::from_secs(1));

		let subset = vec!["a".to_string(), "missing".to_string(), "a".to_string()];
		let report = service
			.get_quotes_with_report(&sample_request(), Some(&subset))
			.await
			.unwrap();
		assert_eq!(ids(&report.quotes), vec!["a"]);
		assert_eq!(report.adapters_considered, 1);
		assert_eq!(skipped_calls.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn test_token_list_adapters_receive_cached_list() {
		let adapter = MockAdapter::new("across")
			.with_route_support(true)
			.with_token_list(chain_tokens(&[&USDC_ETHEREUM.to_lowercase()]));
		let seen = adapter.seen_token_lists();
		let fetches = adapter.token_list_calls();
		let service = service(vec![adapter, MockAdapter::new("relay")], Duration::from_secs(1));

		service.get_quotes(&sample_request(), None).await.unwrap();
		service.get_quotes(&sample_request(), None).await.unwrap();

		assert_eq!(*seen.lock().unwrap(), vec![true, true]);
		assert_eq!(fetches.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn test_generate_token_lists_reports_per_adapter() {
		let service = service(
			vec![
				MockAdapter::new("across").with_token_list(chain_tokens(&["0xa", "0xb"])),
				MockAdapter::new("near").with_token_list(chain_tokens(&[])),
				MockAdapter::new("relay"),
			],
			Duration::from_secs(1),
		);

		let report = service.generate_token_lists().await;
		assert_eq!(report.results.len(), 2);
		assert_eq!(report.succeeded, 1);
		assert_eq!(report.failed, 1);

		let across = report
			.results
			.iter()
			.find(|r| r.adapter_id == "across")
			.unwrap();
		assert!(across.success);
		assert_eq!(across.token_count, 2);
		assert!(service.token_cache().entry("across").is_some());
		assert!(service.token_cache().entry("near").is_none());
	}

	#[test]
	fn test_sanitize_quote() {
		let bad_amount = sample_quote("a", "1.5", "21000");
		assert!(matches!(
			sanitize_quote("a", bad_amount),
			Err(QuoteFailure::ProviderError { .. })
		));

		let bad_gas = sample_quote("a", "100", "lots");
		let quote = sanitize_quote("a", bad_gas).unwrap();
		assert!(quote.gas_estimate.is_zero());
	}
}
