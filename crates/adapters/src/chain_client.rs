//! JSON-RPC implementation of [`ChainClient`]

use async_trait::async_trait;
use bridge_types::{AccountKind, ChainClient, ChainError, GasRequest, U256};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct RpcResponse {
	#[serde(default)]
	result: Option<Value>,
	#[serde(default)]
	error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
	code: i64,
	message: String,
}

/// Chain client talking to one JSON-RPC endpoint per chain id
#[derive(Debug, Clone)]
pub struct JsonRpcChainClient {
	rpc_urls: HashMap<u64, String>,
	client: Client,
	timeout: Duration,
}

impl JsonRpcChainClient {
	pub fn new(rpc_urls: HashMap<u64, String>) -> Self {
		Self {
			rpc_urls,
			client: Client::new(),
			timeout: Duration::from_secs(5),
		}
	}

	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;
		self
	}

	pub fn supports_chain(&self, chain_id: u64) -> bool {
		self.rpc_urls.contains_key(&chain_id)
	}

	async fn call(&self, chain_id: u64, method: &str, params: Value) -> Result<Value, ChainError> {
		let url = self
			.rpc_urls
			.get(&chain_id)
			.ok_or(ChainError::NoRpcForChain { chain_id })?;

		debug!("RPC {} on chain {}", method, chain_id);
		let response: RpcResponse = self
			.client
			.post(url)
			.timeout(self.timeout)
			.json(&json!({
				"jsonrpc": "2.0",
				"id": 1,
				"method": method,
				"params": params,
			}))
			.send()
			.await?
			.error_for_status()?
			.json()
			.await?;

		if let Some(error) = response.error {
			return Err(ChainError::Rpc {
				code: error.code,
				message: error.message,
			});
		}
		response.result.ok_or_else(|| ChainError::InvalidResponse {
			reason: format!("{} returned neither result nor error", method),
		})
	}
}

#[async_trait]
impl ChainClient for JsonRpcChainClient {
	async fn estimate_gas(&self, request: &GasRequest) -> Result<U256, ChainError> {
		let mut tx = json!({
			"from": request.from,
			"to": request.to,
			"data": request.data,
		});
		if let Some(value) = &request.value {
			let raw = value
				.to_raw()
				.map_err(|reason| ChainError::InvalidResponse { reason })?;
			tx["value"] = Value::String(format!("{:#x}", raw));
		}

		let result = self.call(request.chain_id, "eth_estimateGas", json!([tx])).await?;
		let quantity = result.as_str().ok_or_else(|| ChainError::InvalidResponse {
			reason: "eth_estimateGas result is not a string".to_string(),
		})?;
		U256::from_hex_quantity(quantity).map_err(|reason| ChainError::InvalidResponse { reason })
	}

	async fn account_kind(&self, chain_id: u64, address: &str) -> Result<AccountKind, ChainError> {
		let result = self
			.call(chain_id, "eth_getCode", json!([address, "latest"]))
			.await?;
		let code = result.as_str().ok_or_else(|| ChainError::InvalidResponse {
			reason: "eth_getCode result is not a string".to_string(),
		})?;
		Ok(AccountKind::from_code(code))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::{routing::post, Json, Router};

	async fn rpc_server() -> String {
		async fn handle(Json(body): Json<Value>) -> Json<Value> {
			let result = match body["method"].as_str() {
				Some("eth_estimateGas") => {
					if body["params"][0]["value"] == "0x2a" {
						json!({"jsonrpc": "2.0", "id": 1, "result": "0x5208"})
					} else {
						json!({"jsonrpc": "2.0", "id": 1, "error": {"code": 3, "message": "execution reverted"}})
					}
				},
				Some("eth_getCode") => json!({"jsonrpc": "2.0", "id": 1, "result": "0xef0100aabbcc"}),
				_ => json!({"jsonrpc": "2.0", "id": 1, "error": {"code": -32601, "message": "not found"}}),
			};
			Json(result)
		}

		let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();
		tokio::spawn(async move {
			axum::serve(listener, Router::new().route("/", post(handle)))
				.await
				.unwrap();
		});
		format!("http://{}/", addr)
	}

	fn gas_request(value: Option<U256>) -> GasRequest {
		GasRequest {
			chain_id: 1,
			from: "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".to_string(),
			to: "0x76b4c56085ED136a8744D52bE956396624a730E8".to_string(),
			data: "0x".to_string(),
			value,
		}
	}

	#[tokio::test]
	async fn test_estimate_gas_and_errors() {
		let url = rpc_server().await;
		let client = JsonRpcChainClient::new(HashMap::from([(1, url)]));

		let gas = client.estimate_gas(&gas_request(Some(U256::from(42u64)))).await.unwrap();
		assert_eq!(gas.as_str(), "21000");

		let reverted = client.estimate_gas(&gas_request(None)).await;
		assert!(matches!(reverted, Err(ChainError::Rpc { code: 3, .. })));
	}

	#[tokio::test]
	async fn test_account_kind_and_missing_chain() {
		let url = rpc_server().await;
		let client = JsonRpcChainClient::new(HashMap::from([(1, url)]));

		let kind = client
			.account_kind(1, "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
			.await
			.unwrap();
		assert_eq!(kind, AccountKind::Eip7702Delegated);

		let missing = client
			.account_kind(10, "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
			.await;
		assert!(matches!(missing, Err(ChainError::NoRpcForChain { chain_id: 10 })));
		assert!(!client.supports_chain(10));
	}
}
