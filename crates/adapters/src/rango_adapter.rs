//! Rango adapter implementation
//!
//! Rango identifies assets as `CHAIN.SYMBOL` for native coins and
//! `CHAIN--address` for tokens, using its own chain names.

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

pub const RANGO_ADAPTER_ID: &str = "rango";
pub const RANGO_DEFAULT_ENDPOINT: &str = "https://api.rango.exchange";

const CHAIN_NAMES: &[(u64, &str)] = &[
	(1, "ETH"),
	(10, "OPTIMISM"),
	(25, "CRONOS"),
	(56, "BSC"),
	(66, "OKC"),
	(100, "GNOSIS"),
	(137, "POLYGON"),
	(146, "SONIC"),
	(324, "ZKSYNC"),
	(1088, "METIS"),
	(1101, "POLYGONZK"),
	(1284, "MOONBEAM"),
	(1285, "MOONRIVER"),
	(8453, "BASE"),
	(34443, "MODE"),
	(42161, "ARBITRUM"),
	(42220, "CELO"),
	(43114, "AVAX_CCHAIN"),
	(56288, "BOBA_BNB"),
	(59144, "LINEA"),
	(80094, "BERACHAIN"),
	(81457, "BLAST"),
	(167000, "TAIKO"),
	(534352, "SCROLL"),
	(7777777, "ZORA"),
	(1313161554, "AURORA"),
];

fn chain_name(chain_id: u64) -> Option<&'static str> {
	CHAIN_NAMES
		.iter()
		.find(|(id, _)| *id == chain_id)
		.map(|(_, name)| *name)
}

fn rango_asset(chain: &str, token: &Token) -> String {
	if token.is_native() {
		format!("{}.{}", chain, token.symbol)
	} else {
		format!("{}--{}", chain, token.address)
	}
}

// ================================
// RANGO API MODELS
// ================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RangoSwapResponse {
	#[serde(default)]
	result_type: Option<String>,
	#[serde(default)]
	error: Option<String>,
	#[serde(default)]
	route: Option<RangoRoute>,
	#[serde(default)]
	tx: Option<RangoTx>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RangoRoute {
	#[serde(default)]
	output_amount: LooseAmount,
	#[serde(default, deserialize_with = "seconds")]
	estimated_time_in_seconds: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RangoTx {
	#[serde(default)]
	tx_to: Option<String>,
	#[serde(default)]
	tx_data: Option<String>,
	#[serde(default)]
	value: Option<LooseAmount>,
	#[serde(default)]
	gas_limit: LooseAmount,
}

/// Rango adapter for cross-chain swap quotes
#[derive(Debug)]
pub struct RangoAdapter {
	info: AdapterInfo,
	config: ProviderConfig,
	cache: ClientCache,
}

impl RangoAdapter {
	pub fn new(config: ProviderConfig) -> Self {
		Self::with_cache(config, ClientCache::for_adapter())
	}

	pub fn with_cache(config: ProviderConfig, cache: ClientCache) -> Self {
		Self {
			info: AdapterInfo::new(
				RANGO_ADAPTER_ID,
				"Rango",
				"https://icons.llamao.fi/icons/protocols/rango?w=48&q=75",
			),
			config,
			cache,
		}
	}

	pub fn with_default_config() -> Self {
		Self::new(ProviderConfig::new(RANGO_DEFAULT_ENDPOINT))
	}

	fn client(&self) -> AdapterResult<Arc<reqwest::Client>> {
		self.cache
			.get_client_with_auth(RANGO_ADAPTER_ID, &self.config, &AuthConfig::None)
	}

	fn timeout(&self) -> Duration {
		Duration::from_millis(self.config.timeout_ms)
	}
}

#[async_trait]
impl BridgeAdapter for RangoAdapter {
	fn adapter_info(&self) -> &AdapterInfo {
		&self.info
	}

	async fn get_quote(&self, request: &QuoteRequest, _ctx: &AdapterContext) -> AdapterResult<Quote> {
		let src_chain = chain_name(request.src_chain_id)
			.ok_or_else(|| AdapterError::chain_not_supported(RANGO_ADAPTER_ID, request.src_chain_id))?;
		let dst_chain = chain_name(request.dst_chain_id)
			.ok_or_else(|| AdapterError::chain_not_supported(RANGO_ADAPTER_ID, request.dst_chain_id))?;

		let from = rango_asset(src_chain, &request.input_token);
		let to = rango_asset(dst_chain, &request.output_token);
		let slippage = request.slippage().as_percent_string();
		let mut query: Vec<(&str, &str)> = vec![
			("from", from.as_str()),
			("to", to.as_str()),
			("amount", request.amount.as_str()),
			("slippage", slippage.as_str()),
			("fromAddress", request.sender.as_str()),
			("toAddress", request.recipient.as_str()),
		];
		// Rango authenticates with a query parameter rather than a header
		if let Some(key) = &self.config.api_key {
			query.push(("apiKey", key.expose_secret()));
		}
		if let Some(referrer) = &self.config.integrator {
			query.push(("referrerCode", referrer.as_str()));
		}

		debug!("Fetching Rango quote {} -> {}", from, to);
		let url = format!("{}/basic/swap", self.config.base_url());
		let response = self
			.client()?
			.get(&url)
			.timeout(self.timeout())
			.query(&query)
			.send()
			.await?;
		let data: RangoSwapResponse = read_json(ensure_success(response).await?).await?;

		if data.error.is_some() || data.result_type.as_deref() != Some("OK") {
			let reason = data
				.error
				.or(data.result_type)
				.unwrap_or_else(|| "no result".to_string());
			return Err(AdapterError::rejected(RANGO_ADAPTER_ID, reason));
		}

		let tx = data
			.tx
			.ok_or_else(|| AdapterError::invalid_response("Rango response has no tx"))?;
		let tx_to = tx
			.tx_to
			.ok_or_else(|| AdapterError::invalid_response("Rango tx has no txTo"))?;
		let (estimated_amount, estimated_time) = data
			.route
			.map(|r| (r.output_amount.into_inner(), r.estimated_time_in_seconds))
			.unwrap_or_default();

		Ok(Quote {
			adapter_id: RANGO_ADAPTER_ID.to_string(),
			token_spender_address: Some(tx_to.clone()),
			estimated_time,
			estimated_amount,
			gas_estimate: tx.gas_limit.into_inner(),
			tx_request: TxRequest {
				to: tx_to,
				data: tx.tx_data.unwrap_or_else(|| "0x".to_string()),
				value: tx.value.map(LooseAmount::into_inner).filter(|v| !v.is_zero()),
			},
			extra_data: None,
		})
	}

	fn route_filter(&self) -> Option<&dyn RouteFilter> {
		Some(self)
	}
}

#[async_trait]
impl RouteFilter for RangoAdapter {
	async fn supports_route(&self, request: &QuoteRequest, _ctx: &AdapterContext) -> AdapterResult<bool> {
		Ok(chain_name(request.src_chain_id).is_some() && chain_name(request.dst_chain_id).is_some())
	}
}
