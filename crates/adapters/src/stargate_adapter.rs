//! Stargate adapter implementation
//!
//! Stargate pools only move like-for-like assets, so routes are filtered on
//! symbol equality. Slippage is expressed as a minimum destination amount.

use async_trait::async_trait;
use bridge_types::{
	AdapterContext, AdapterError, AdapterInfo, AdapterResult, BridgeAdapter, ProviderConfig,
	Quote, QuoteRequest, RouteFilter, TxRequest, U256,
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::client_cache::{AuthConfig, ClientCache};
use crate::erc20::decode_approve;
use crate::wire::{ensure_success, read_json, seconds, LooseAmount};

pub const STARGATE_ADAPTER_ID: &str = "stargate";
pub const STARGATE_DEFAULT_ENDPOINT: &str = "https://stargate.finance/api";

const CHAIN_KEYS: &[(u64, &str)] = &[
	(1, "ethereum"),
	(10, "optimism"),
	(14, "flare"),
	(25, "cronosevm"),
	(30, "rootstock"),
	(37, "xpla"),
	(40, "telos"),
	(50, "xdc"),
	(56, "bsc"),
	(88, "tomo"),
	(100, "gnosis"),
	(122, "fuse"),
	(137, "polygon"),
	(143, "monad"),
	(146, "sonic"),
	(169, "manta"),
	(196, "xlayer"),
	(204, "opbnb"),
	(239, "tac"),
	(252, "fraxtal"),
	(291, "orderly"),
	(295, "hedera"),
	(324, "zksync"),
	(480, "worldchain"),
	(592, "astar"),
	(999, "hyperliquid"),
	(1030, "conflux"),
	(1088, "metis"),
	(1101, "zkevm"),
	(1116, "coredao"),
	(1135, "lisk"),
	(1284, "moonbeam"),
	(1285, "moonriver"),
	(1890, "lightlink"),
	(2222, "kava"),
	(3338, "peaq"),
	(5000, "mantle"),
	(8217, "klaytn"),
	(8453, "base"),
	(34443, "mode"),
	(42161, "arbitrum"),
	(42220, "celo"),
	(42793, "etherlink"),
	(43114, "avalanche"),
	(55244, "superposition"),
	(57073, "ink"),
	(59144, "linea"),
	(60808, "bob"),
	(81457, "blast"),
	(167000, "taiko"),
	(534352, "scroll"),
	(747474, "katana"),
	(7777777, "zora"),
	(1313161554, "aurora"),
	(1380012617, "rarible"),
];

fn chain_key(chain_id: u64) -> Option<&'static str> {
	CHAIN_KEYS
		.iter()
		.find(|(id, _)| *id == chain_id)
		.map(|(_, key)| *key)
}

// ================================
// STARGATE API MODELS
// ================================

#[derive(Debug, Deserialize)]
struct StargateQuotesResponse {
	#[serde(default)]
	quotes: Vec<StargateQuote>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StargateQuote {
	#[serde(default)]
	dst_amount: LooseAmount,
	#[serde(default)]
	duration: Option<StargateDuration>,
	#[serde(default)]
	steps: Vec<StargateStep>,
}

#[derive(Debug, Deserialize)]
struct StargateDuration {
	#[serde(default, deserialize_with = "seconds")]
	estimated: u64,
}

#[derive(Debug, Deserialize)]
struct StargateStep {
	#[serde(rename = "type")]
	step_type: String,
	#[serde(default)]
	transaction: Option<StargateTransaction>,
}

#[derive(Debug, Deserialize)]
struct StargateTransaction {
	#[serde(default)]
	to: Option<String>,
	#[serde(default)]
	data: Option<String>,
	#[serde(default)]
	value: Option<LooseAmount>,
}

/// Stargate adapter for cross-chain bridge quotes
#[derive(Debug)]
pub struct StargateAdapter {
	info: AdapterInfo,
	config: ProviderConfig,
	cache: ClientCache,
}

impl StargateAdapter {
	pub fn new(config: ProviderConfig) -> Self {
		Self::with_cache(config, ClientCache::for_adapter())
	}

	pub fn with_cache(config: ProviderConfig, cache: ClientCache) -> Self {
		Self {
			info: AdapterInfo::new(
				STARGATE_ADAPTER_ID,
				"Stargate",
				"https://icons.llamao.fi/icons/protocols/stargate-finance?w=48&q=75",
			),
			config,
			cache,
		}
	}

	pub fn with_default_config() -> Self {
		Self::new(ProviderConfig::new(STARGATE_DEFAULT_ENDPOINT))
	}

	fn client(&self) -> AdapterResult<Arc<reqwest::Client>> {
		self.cache
			.get_client_with_auth(STARGATE_ADAPTER_ID, &self.config, &AuthConfig::None)
	}

	fn timeout(&self) -> Duration {
		Duration::from_millis(self.config.timeout_ms)
	}
}

#[async_trait]
impl BridgeAdapter for StargateAdapter {
	fn adapter_info(&self) -> &AdapterInfo {
		&self.info
	}

	async fn get_quote(&self, request: &QuoteRequest, _ctx: &AdapterContext) -> AdapterResult<Quote> {
		let src_key = chain_key(request.src_chain_id)
			.ok_or_else(|| AdapterError::chain_not_supported(STARGATE_ADAPTER_ID, request.src_chain_id))?;
		let dst_key = chain_key(request.dst_chain_id)
			.ok_or_else(|| AdapterError::chain_not_supported(STARGATE_ADAPTER_ID, request.dst_chain_id))?;

		let amount = request
			.amount
			.to_raw()
			.map_err(|reason| AdapterError::ConfigError { reason })?;
		let min_amount = U256::from(request.slippage().min_amount_out(amount));

		let query: Vec<(&str, &str)> = vec![
			("srcToken", request.input_token.address.as_str()),
			("dstToken", request.output_token.address.as_str()),
			("srcAddress", request.sender.as_str()),
			("dstAddress", request.recipient.as_str()),
			("srcChainKey", src_key),
			("dstChainKey", dst_key),
			("srcAmount", request.amount.as_str()),
			("dstAmountMin", min_amount.as_str()),
		];

		debug!("Fetching Stargate quote {} -> {}", src_key, dst_key);
		let url = format!("{}/v1/quotes", self.config.base_url());
		let response = self
			.client()?
			.get(&url)
			.timeout(self.timeout())
			.query(&query)
			.send()
			.await?;
		let data: StargateQuotesResponse = read_json(ensure_success(response).await?).await?;

		let quote = data.quotes.into_iter().next().ok_or_else(|| {
			AdapterError::rejected(
				STARGATE_ADAPTER_ID,
				format!("No quotes found for {}", request.input_token.symbol),
			)
		})?;

		let spender = quote
			.steps
			.iter()
			.filter(|step| step.step_type == "approve")
			.filter_map(|step| step.transaction.as_ref()?.data.as_deref())
			.find_map(decode_approve)
			.map(|call| call.spender);

		let bridge_tx = quote
			.steps
			.into_iter()
			.find(|step| step.step_type == "bridge")
			.and_then(|step| step.transaction)
			.ok_or_else(|| AdapterError::invalid_response("Stargate quote has no bridge step"))?;
		let to = bridge_tx
			.to
			.ok_or_else(|| AdapterError::invalid_response("Stargate bridge step has no target"))?;

		Ok(Quote {
			adapter_id: STARGATE_ADAPTER_ID.to_string(),
			token_spender_address: spender,
			estimated_time: quote.duration.map(|d| d.estimated).unwrap_or(0),
			estimated_amount: quote.dst_amount.into_inner(),
			gas_estimate: U256::zero(),
			tx_request: TxRequest {
				to,
				data: bridge_tx.data.unwrap_or_else(|| "0x".to_string()),
				value: bridge_tx.value.map(LooseAmount::into_inner).filter(|v| !v.is_zero()),
			},
			extra_data: None,
		})
	}

	fn route_filter(&self) -> Option<&dyn RouteFilter> {
		Some(self)
	}
}

#[async_trait]
impl RouteFilter for StargateAdapter {
	async fn supports_route(&self, request: &QuoteRequest, _ctx: &AdapterContext) -> AdapterResult<bool> {
		if !request
			.input_token
			.symbol
			.eq_ignore_ascii_case(&request.output_token.symbol)
		{
			return Ok(false);
		}
		Ok(chain_key(request.src_chain_id).is_some() && chain_key(request.dst_chain_id).is_some())
	}
}
