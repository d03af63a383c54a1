//! Across adapter implementation
//!
//! Quotes through the Across swap API. Route checks combine a static chain
//! allow-list with the token list published at `/swap/tokens`.

use async_trait::async_trait;
use bridge_types::{
	AdapterContext, AdapterError, AdapterInfo, AdapterResult, BridgeAdapter, ProviderConfig,
	Quote, QuoteRequest, RouteFilter, TokenListData, TokenListSource, TxRequest,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::client_cache::{ClientCache, ClientConfig};
use crate::wire::{ensure_success, read_json, seconds, LooseAmount};

pub const ACROSS_ADAPTER_ID: &str = "across";
pub const ACROSS_DEFAULT_ENDPOINT: &str = "https://app.across.to/api";

const SUPPORTED_CHAINS: &[u64] = &[
	1,              // Ethereum
	10,             // Optimism
	56,             // BNB Smart Chain
	130,            // Unichain
	137,            // Polygon
	143,            // Monad
	232,            // Lens
	324,            // zkSync
	480,            // World Chain
	999,            // HyperEVM
	1135,           // Lisk
	1337,           // HyperCore
	1868,           // Soneium
	8453,           // Base
	9745,           // Plasma
	34443,          // Mode
	42161,          // Arbitrum
	57073,          // Ink
	59144,          // Linea
	81457,          // Blast
	534352,         // Scroll
	7777777,        // Zora
	34268394551451, // Solana
];

// ================================
// ACROSS API MODELS
// ================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AcrossApprovalResponse {
	#[serde(default)]
	approval_txns: Option<Vec<serde_json::Value>>,
	#[serde(default)]
	swap_tx: Option<AcrossSwapTx>,
	#[serde(default)]
	checks: Option<AcrossChecks>,
	#[serde(default, deserialize_with = "seconds")]
	expected_fill_time: u64,
	#[serde(default)]
	expected_output_amount: Option<LooseAmount>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AcrossSwapTx {
	#[serde(default)]
	simulation_success: bool,
	#[serde(default)]
	to: Option<String>,
	#[serde(default)]
	data: Option<String>,
	#[serde(default)]
	value: Option<LooseAmount>,
	#[serde(default)]
	gas: Option<LooseAmount>,
}

#[derive(Debug, Deserialize)]
struct AcrossChecks {
	#[serde(default)]
	allowance: Option<AcrossAllowance>,
}

#[derive(Debug, Deserialize)]
struct AcrossAllowance {
	#[serde(default)]
	spender: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AcrossToken {
	chain_id: u64,
	address: String,
}

/// Across adapter for cross-chain bridge quotes
#[derive(Debug)]
pub struct AcrossAdapter {
	info: AdapterInfo,
	config: ProviderConfig,
	cache: ClientCache,
}

impl AcrossAdapter {
	pub fn new(config: ProviderConfig) -> Self {
		Self::with_cache(config, ClientCache::for_adapter())
	}

	pub fn with_cache(config: ProviderConfig, cache: ClientCache) -> Self {
		Self {
			info: AdapterInfo::new(
				ACROSS_ADAPTER_ID,
				"Across",
				"https://icons.llamao.fi/icons/protocols/across?w=48&q=75",
			),
			config,
			cache,
		}
	}

	pub fn with_default_config() -> Self {
		Self::new(ProviderConfig::new(ACROSS_DEFAULT_ENDPOINT))
	}

	fn client(&self) -> AdapterResult<Arc<reqwest::Client>> {
		self.cache
			.get_client(&ClientConfig::for_provider(ACROSS_ADAPTER_ID, &self.config))
	}

	fn timeout(&self) -> Duration {
		Duration::from_millis(self.config.timeout_ms)
	}
}

#[async_trait]
impl BridgeAdapter for AcrossAdapter {
	fn adapter_info(&self) -> &AdapterInfo {
		&self.info
	}

	async fn get_quote(&self, request: &QuoteRequest, _ctx: &AdapterContext) -> AdapterResult<Quote> {
		let url = format!("{}/swap/approval", self.config.base_url());
		let amount = request.amount.to_string();
		let origin_chain = request.src_chain_id.to_string();
		let destination_chain = request.dst_chain_id.to_string();
		let slippage = request.slippage().as_fraction_string();

		let mut query: Vec<(&str, &str)> = vec![
			("tradeType", "exactInput"),
			("amount", amount.as_str()),
			("inputToken", request.input_token.address.as_str()),
			("originChainId", origin_chain.as_str()),
			("outputToken", request.output_token.address.as_str()),
			("destinationChainId", destination_chain.as_str()),
			("depositor", request.sender.as_str()),
			("recipient", request.recipient.as_str()),
			("skipOriginTxEstimation", "false"),
			("refundOnOrigin", "true"),
			("slippage", slippage.as_str()),
		];
		if let Some(integrator) = &self.config.integrator {
			query.push(("integratorId", integrator.as_str()));
		}

		debug!(
			"Fetching Across quote {}:{} -> {}:{}",
			request.src_chain_id,
			request.input_token.symbol,
			request.dst_chain_id,
			request.output_token.symbol
		);

		let response = self
			.client()?
			.get(&url)
			.timeout(self.timeout())
			.query(&query)
			.send()
			.await?;
		let data: AcrossApprovalResponse = read_json(ensure_success(response).await?).await?;

		let has_approval = data
			.approval_txns
			.as_ref()
			.map(|txns| !txns.is_empty())
			.unwrap_or(false);
		let swap_tx = data
			.swap_tx
			.ok_or_else(|| AdapterError::invalid_response("Across response has no swapTx"))?;

		// an approval has to land first, so the swap cannot be simulated yet
		if !swap_tx.simulation_success && !has_approval {
			return Err(AdapterError::rejected(ACROSS_ADAPTER_ID, "Swap simulation failed"));
		}

		let to = swap_tx
			.to
			.ok_or_else(|| AdapterError::invalid_response("Across swapTx has no target"))?;

		Ok(Quote {
			adapter_id: ACROSS_ADAPTER_ID.to_string(),
			token_spender_address: data.checks.and_then(|c| c.allowance).and_then(|a| a.spender),
			estimated_time: data.expected_fill_time,
			estimated_amount: data
				.expected_output_amount
				.map(LooseAmount::into_inner)
				.unwrap_or_default(),
			gas_estimate: swap_tx.gas.map(LooseAmount::into_inner).unwrap_or_default(),
			tx_request: TxRequest {
				to,
				data: swap_tx.data.unwrap_or_else(|| "0x".to_string()),
				value: swap_tx
					.value
					.map(LooseAmount::into_inner)
					.filter(|v| !v.is_zero()),
			},
			extra_data: None,
		})
	}

	fn route_filter(&self) -> Option<&dyn RouteFilter> {
		Some(self)
	}

	fn token_list_source(&self) -> Option<&dyn TokenListSource> {
		Some(self)
	}
}

#[async_trait]
impl RouteFilter for AcrossAdapter {
	async fn supports_route(&self, request: &QuoteRequest, ctx: &AdapterContext) -> AdapterResult<bool> {
		if !SUPPORTED_CHAINS.contains(&request.src_chain_id)
			|| !SUPPORTED_CHAINS.contains(&request.dst_chain_id)
		{
			return Ok(false);
		}

		let Some(tokens) = &ctx.token_list else {
			debug!("Across token list unavailable, declining route");
			return Ok(false);
		};

		Ok(tokens.is_address_supported(request.src_chain_id, &request.input_token.address)
			&& tokens.is_address_supported(request.dst_chain_id, &request.output_token.address))
	}
}

#[async_trait]
impl TokenListSource for AcrossAdapter {
	async fn fetch_token_list(&self) -> AdapterResult<TokenListData> {
		let url = format!("{}/swap/tokens", self.config.base_url());
		let response = self.client()?.get(&url).timeout(self.timeout()).send().await?;
		let tokens: Vec<AcrossToken> = read_json(ensure_success(response).await?).await?;

		let mut map: BTreeMap<u64, Vec<String>> = BTreeMap::new();
		for token in tokens {
			map.entry(token.chain_id)
				.or_default()
				.push(bridge_types::normalize_address(&token.address));
		}
		debug!("Across token list covers {} chains", map.len());
		Ok(TokenListData::ChainTokens(map))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_support::{serve, tokens_for};
	use axum::{extract::Query, routing::get, Json, Router};
	use bridge_types::test_utils::{sample_request, USDC_ARBITRUM, USDC_ETHEREUM};
	use serde_json::json;
	use std::collections::HashMap;

	fn adapter(endpoint: String) -> AcrossAdapter {
		AcrossAdapter::with_cache(ProviderConfig::new(endpoint), ClientCache::new())
	}

	#[tokio::test]
	async fn test_get_quote_maps_response() {
		let router = Router::new().route(
			"/swap/approval",
			get(|Query(params): Query<HashMap<String, String>>| async move {
				assert_eq!(params["slippage"], "0.005");
				assert_eq!(params["tradeType"], "exactInput");
				Json(json!({
					"approvalTxns": [],
					"swapTx": {"simulationSuccess": true, "to": "0xspoke", "data": "0xabcd", "gas": "150000"},
					"checks": {"allowance": {"spender": "0xspender"}},
					"expectedFillTime": 4,
					"expectedOutputAmount": "999000"
				}))
			}),
		);
		let endpoint = serve(router).await;

		let quote = adapter(endpoint)
			.get_quote(&sample_request(), &AdapterContext::default())
			.await
			.unwrap();
		assert_eq!(quote.adapter_id, "across");
		assert_eq!(quote.estimated_amount.as_str(), "999000");
		assert_eq!(quote.gas_estimate.as_str(), "150000");
		assert_eq!(quote.estimated_time, 4);
		assert_eq!(quote.token_spender_address.as_deref(), Some("0xspender"));
		assert_eq!(quote.tx_request.data, "0xabcd");
		assert!(quote.tx_request.value.is_none());
	}

	#[tokio::test]
	async fn test_failed_simulation_without_approval_is_rejected() {
		let router = Router::new().route(
			"/swap/approval",
			get(|| async {
				Json(json!({"swapTx": {"simulationSuccess": false, "to": "0xspoke", "data": "0x"}}))
			}),
		);
		let endpoint = serve(router).await;

		let result = adapter(endpoint)
			.get_quote(&sample_request(), &AdapterContext::default())
			.await;
		assert!(matches!(result, Err(AdapterError::ProviderRejected { .. })));
	}

	#[tokio::test]
	async fn test_failed_simulation_with_pending_approval_is_accepted() {
		let router = Router::new().route(
			"/swap/approval",
			get(|| async {
				Json(json!({
					"approvalTxns": [{"to": "0xtoken", "data": "0x095ea7b3"}],
					"swapTx": {"simulationSuccess": false, "to": "0xspoke", "data": "0x"},
					"expectedOutputAmount": "10"
				}))
			}),
		);
		let endpoint = serve(router).await;

		let quote = adapter(endpoint)
			.get_quote(&sample_request(), &AdapterContext::default())
			.await
			.unwrap();
		assert!(quote.gas_estimate.is_zero());
	}

	#[tokio::test]
	async fn test_http_error_uses_provider_message() {
		let router = Router::new().route(
			"/swap/approval",
			get(|| async {
				(
					axum::http::StatusCode::BAD_REQUEST,
					Json(json!({"message": "Amount too low relative to fees"})),
				)
			}),
		);
		let endpoint = serve(router).await;

		let error = adapter(endpoint)
			.get_quote(&sample_request(), &AdapterContext::default())
			.await
			.unwrap_err();
		assert_eq!(error.to_string(), "HTTP 400: Amount too low relative to fees");
	}

	#[tokio::test]
	async fn test_token_list_fetch_normalizes_addresses() {
		let router = Router::new().route(
			"/swap/tokens",
			get(|| async {
				Json(json!([
					{"chainId": 1, "address": USDC_ETHEREUM, "symbol": "USDC"},
					{"chainId": 42161, "address": USDC_ARBITRUM, "symbol": "USDC"}
				]))
			}),
		);
		let endpoint = serve(router).await;

		let data = adapter(endpoint).fetch_token_list().await.unwrap();
		assert_eq!(data.len(), 2);
		assert!(data.is_address_supported(1, &USDC_ETHEREUM.to_lowercase()));
	}

	#[tokio::test]
	async fn test_route_check_uses_chain_list_and_tokens() {
		let adapter = AcrossAdapter::with_default_config();
		let request = sample_request();

		let ctx = AdapterContext::with_token_list(Arc::new(tokens_for(&request)));
		assert!(adapter.supports_route(&request, &ctx).await.unwrap());

		// no token list yet
		assert!(!adapter
			.supports_route(&request, &AdapterContext::default())
			.await
			.unwrap());

		let mut unsupported_chain = request.clone();
		unsupported_chain.dst_chain_id = 43114;
		unsupported_chain.output_token.chain_id = 43114;
		assert!(!adapter.supports_route(&unsupported_chain, &ctx).await.unwrap());
	}
}
