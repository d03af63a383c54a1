//! Bungee adapter implementation
//!
//! Quotes come from Bungee's auto-route endpoint with the inbox (approval)
//! flow enabled instead of Permit2 signatures.

use async_trait::async_trait;
use bridge_types::{
	AdapterContext, AdapterError, AdapterInfo, AdapterResult, BridgeAdapter, ProviderConfig,
	Quote, QuoteRequest, RouteFilter, Token, TxRequest,
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::client_cache::{AuthConfig, ClientCache};
use crate::wire::{ensure_success, read_json, seconds, LooseAmount};

pub const BUNGEE_ADAPTER_ID: &str = "bungee";
pub const BUNGEE_DEFAULT_ENDPOINT: &str = "https://public-backend.bungee.exchange";

/// Bungee's placeholder for the chain's native asset
const NATIVE_PLACEHOLDER: &str = "0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE";

const SUPPORTED_CHAINS: &[u64] = &[
	1,         // Ethereum
	10,        // Optimism
	56,        // BNB
	100,       // Gnosis
	130,       // Unichain
	137,       // Polygon
	143,       // Monad
	146,       // Sonic
	324,       // zkSync Era
	480,       // World Chain
	999,       // HyperEVM
	1101,      // Polygon zkEVM
	1329,      // Sei
	1337,      // Hypercore
	1868,      // Soneium
	2741,      // Abstract
	5000,      // Mantle
	8453,      // Base
	9745,      // Plasma
	34443,     // Mode
	42161,     // Arbitrum
	43114,     // Avalanche
	57073,     // Ink
	59144,     // Linea
	80094,     // Berachain
	81457,     // Blast
	89999,     // Solana
	98866,     // Plume
	534352,    // Scroll
	747474,    // Katana
	728126428, // Tron
];

// ================================
// BUNGEE API MODELS
// ================================

#[derive(Debug, Deserialize)]
struct BungeeQuoteResponse {
	#[serde(default)]
	success: bool,
	#[serde(default)]
	message: Option<String>,
	#[serde(default)]
	result: Option<BungeeQuoteResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BungeeQuoteResult {
	#[serde(default)]
	auto_route: Option<BungeeAutoRoute>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BungeeAutoRoute {
	#[serde(default)]
	approval_data: Option<BungeeApprovalData>,
	#[serde(default, deserialize_with = "seconds")]
	estimated_time: u64,
	#[serde(default)]
	output: Option<BungeeOutput>,
	#[serde(default)]
	gas_fee: Option<BungeeGasFee>,
	#[serde(default)]
	tx_data: Option<BungeeTxData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BungeeApprovalData {
	#[serde(default)]
	spender_address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BungeeOutput {
	#[serde(default)]
	amount: LooseAmount,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BungeeGasFee {
	#[serde(default)]
	gas_limit: LooseAmount,
}

#[derive(Debug, Deserialize)]
struct BungeeTxData {
	#[serde(default)]
	to: Option<String>,
	#[serde(default)]
	data: Option<String>,
	#[serde(default)]
	value: Option<LooseAmount>,
}

/// Bungee adapter for cross-chain bridge quotes
#[derive(Debug)]
pub struct BungeeAdapter {
	info: AdapterInfo,
	config: ProviderConfig,
	cache: ClientCache,
}

impl BungeeAdapter {
	pub fn new(config: ProviderConfig) -> Self {
		Self::with_cache(config, ClientCache::for_adapter())
	}

	pub fn with_cache(config: ProviderConfig, cache: ClientCache) -> Self {
		Self {
			info: AdapterInfo::new(
				BUNGEE_ADAPTER_ID,
				"Bungee",
				"https://icons.llamao.fi/icons/protocols/bungee?w=48&q=75",
			),
			config,
			cache,
		}
	}

	pub fn with_default_config() -> Self {
		Self::new(ProviderConfig::new(BUNGEE_DEFAULT_ENDPOINT))
	}

	fn client(&self) -> AdapterResult<Arc<reqwest::Client>> {
		self.cache
			.get_client_with_auth(BUNGEE_ADAPTER_ID, &self.config, &AuthConfig::None)
	}

	fn timeout(&self) -> Duration {
		Duration::from_millis(self.config.timeout_ms)
	}
}

fn bungee_token(token: &Token) -> &str {
	if token.is_native() {
		NATIVE_PLACEHOLDER
	} else {
		&token.address
	}
}

#[async_trait]
impl BridgeAdapter for BungeeAdapter {
	fn adapter_info(&self) -> &AdapterInfo {
		&self.info
	}

	async fn get_quote(&self, request: &QuoteRequest, _ctx: &AdapterContext) -> AdapterResult<Quote> {
		let src_chain = request.src_chain_id.to_string();
		let dst_chain = request.dst_chain_id.to_string();
		let slippage = request.slippage().as_percent_string();
		let query: Vec<(&str, &str)> = vec![
			("userAddress", request.sender.as_str()),
			("originChainId", src_chain.as_str()),
			("destinationChainId", dst_chain.as_str()),
			("inputToken", bungee_token(&request.input_token)),
			("outputToken", bungee_token(&request.output_token)),
			("inputAmount", request.amount.as_str()),
			("receiverAddress", request.recipient.as_str()),
			("slippage", slippage.as_str()),
			("useInbox", "true"),
			("enableMultipleAutoRoutes", "true"),
		];

		let url = format!("{}/api/v1/bungee/quote", self.config.base_url());
		let mut builder = self.client()?.get(&url).timeout(self.timeout()).query(&query);
		if let Some(affiliate) = &self.config.integrator {
			builder = builder.header("affiliate", affiliate.as_str());
		}

		debug!(
			"Fetching Bungee quote {} -> {}",
			request.src_chain_id, request.dst_chain_id
		);
		let response = builder.send().await?;
		let data: BungeeQuoteResponse = read_json(ensure_success(response).await?).await?;

		let route = match data.result.and_then(|r| r.auto_route) {
			Some(route) if data.success => route,
			_ => {
				return Err(AdapterError::rejected(
					BUNGEE_ADAPTER_ID,
					data.message.unwrap_or_else(|| "no route available".to_string()),
				))
			},
		};

		let tx_data = route
			.tx_data
			.ok_or_else(|| AdapterError::invalid_response("Bungee route has no txData"))?;
		let to = tx_data
			.to
			.ok_or_else(|| AdapterError::invalid_response("Bungee txData has no target"))?;

		Ok(Quote {
			adapter_id: BUNGEE_ADAPTER_ID.to_string(),
			token_spender_address: route.approval_data.and_then(|a| a.spender_address),
			estimated_time: route.estimated_time,
			estimated_amount: route.output.map(|o| o.amount.into_inner()).unwrap_or_default(),
			gas_estimate: route
				.gas_fee
				.map(|g| g.gas_limit.into_inner())
				.unwrap_or_default(),
			tx_request: TxRequest {
				to,
				data: tx_data.data.unwrap_or_else(|| "0x".to_string()),
				value: tx_data.value.map(LooseAmount::into_inner).filter(|v| !v.is_zero()),
			},
			extra_data: None,
		})
	}

	fn route_filter(&self) -> Option<&dyn RouteFilter> {
		Some(self)
	}
}

#[async_trait]
impl RouteFilter for BungeeAdapter {
	async fn supports_route(&self, request: &QuoteRequest, _ctx: &AdapterContext) -> AdapterResult<bool> {
		Ok(SUPPORTED_CHAINS.contains(&request.src_chain_id)
			&& SUPPORTED_CHAINS.contains(&request.dst_chain_id))
	}
}
