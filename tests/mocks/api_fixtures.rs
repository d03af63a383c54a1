//! Request bodies shared by the API tests

use bridge_aggregator::models::test_utils::{sample_quote, sample_request};
use bridge_aggregator::serde_json::{json, Value};

pub struct ApiFixtures;

#[allow(dead_code)]
impl ApiFixtures {
	/// USDC Ethereum -> Arbitrum quote request, no ranking inputs
	pub fn quotes_request() -> Value {
		json!({ "request": sample_request() })
	}

	/// Quote request with USDC at $1 and ETH at $2000, 10 gwei gas
	pub fn ranked_quotes_request(selected_adapter: Option<&str>) -> Value {
		let mut body = json!({
			"request": sample_request(),
			"market": {
				"outputTokenPriceUSD": "1",
				"nativeTokenPriceUSD": "2000",
				"gasPriceWei": "10000000000"
			}
		});
		if let Some(adapter_id) = selected_adapter {
			body["selectedAdapter"] = json!(adapter_id);
		}
		body
	}

	/// Quote request with an empty sender address
	pub fn invalid_quotes_request() -> Value {
		let mut request = sample_request();
		request.sender = String::new();
		json!({ "request": request })
	}

	pub fn settlement_request(adapter_id: &str, source_tx_hash: &str) -> Value {
		json!({
			"quote": sample_quote(adapter_id, "990000", "21000"),
			"sourceTxHash": source_tx_hash,
		})
	}
}
