//! Canonical quote shapes produced by adapters and the ranker

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::U256;

/// Transaction the user signs on the source chain to execute a quote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxRequest {
	pub to: String,
	pub data: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub value: Option<U256>,
}

/// A priced, executable route from one adapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
	pub adapter_id: String,
	/// Contract the user must approve before sending `tx_request`, if any
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub token_spender_address: Option<String>,
	/// Expected fill time in seconds
	pub estimated_time: u64,
	/// Output amount in the output token's smallest unit
	pub estimated_amount: U256,
	/// Gas units, `"0"` when unknown
	pub gas_estimate: U256,
	pub tx_request: TxRequest,
	/// Adapter-owned data consumed only by that adapter's settlement hook
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub extra_data: Option<Value>,
}

impl Quote {
	pub fn has_gas_estimate(&self) -> bool {
		!self.gas_estimate.is_zero()
	}
}

/// Quote with USD valuations attached by the ranker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedQuote {
	#[serde(flatten)]
	pub quote: Quote,
	#[serde(rename = "estimatedAmountUSD")]
	pub estimated_amount_usd: Decimal,
	#[serde(rename = "gasFeesUSD")]
	pub gas_fees_usd: Decimal,
	#[serde(rename = "estimatedAmountAfterFeesUSD")]
	pub estimated_amount_after_fees_usd: Decimal,
}
