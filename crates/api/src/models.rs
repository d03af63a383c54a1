//! Request and response bodies for the HTTP API

use bridge_service::{AdapterOutcome, AggregationReport, MarketData, QuoteWarning};
use bridge_types::{AdapterCapabilities, AdapterInfo, Quote, QuoteRequest, RankedQuote};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ================================
// QUOTES
// ================================

/// POST /api/v1/quotes body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotesRequest {
	pub request: QuoteRequest,
	/// Restrict the fan-out to these adapter ids
	#[serde(default)]
	pub adapters: Option<Vec<String>>,
	/// Prices used to rank the quotes; ranking is skipped without them
	#[serde(default)]
	pub market: Option<MarketData>,
	/// Adapter the user picked, for warnings
	#[serde(default)]
	pub selected_adapter: Option<String>,
	/// USD value of the input amount, for the price-impact warning
	#[serde(default, rename = "inputAmountUSD")]
	pub input_amount_usd: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationMetadata {
	pub adapters_considered: usize,
	pub route_unsupported: usize,
	pub succeeded: usize,
	pub failed: usize,
	pub timed_out: usize,
	pub total_duration_ms: u64,
	pub outcomes: Vec<AdapterOutcome>,
}

impl AggregationMetadata {
	/// Split a report into its quotes and everything else
	pub fn from_report(report: AggregationReport) -> (Vec<Quote>, Self) {
		let metadata = Self {
			adapters_considered: report.adapters_considered,
			route_unsupported: report.route_unsupported,
			succeeded: report.succeeded,
			failed: report.failed,
			timed_out: report.timed_out,
			total_duration_ms: report.total_duration_ms,
			outcomes: report.outcomes,
		};
		(report.quotes, metadata)
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotesResponse {
	pub quotes: Vec<Quote>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub ranked_quotes: Option<Vec<RankedQuote>>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub warnings: Vec<QuoteWarning>,
	pub total_quotes: usize,
	pub metadata: AggregationMetadata,
}

// ================================
// ADAPTERS
// ================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterResponse {
	#[serde(flatten)]
	pub info: AdapterInfo,
	pub capabilities: AdapterCapabilities,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdaptersResponse {
	pub adapters: Vec<AdapterResponse>,
	pub total_adapters: usize,
	/// Adapters with a token list currently held in the cache
	pub cached_token_lists: Vec<String>,
}

// ================================
// SETTLEMENTS
// ================================

/// POST /api/v1/settlements body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementRequest {
	pub quote: Quote,
	pub source_tx_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementAccepted {
	pub adapter_id: String,
	pub source_tx_hash: String,
	/// False when the adapter needs no settlement step and nothing will be sent
	pub settlement_required: bool,
}
