//! LI.FI adapter implementation
//!
//! An optional API key is sent as `x-lifi-api-key`; without one LI.FI
//! applies its anonymous rate limits.

use alloy_primitives::U256 as RawU256;
use async_trait::async_trait;
use bridge_types::{
	normalize_address, AdapterContext, AdapterError, AdapterInfo, AdapterResult, BridgeAdapter,
	ProviderConfig, Quote, QuoteRequest, RouteFilter, TokenListData, TokenListSource, TxRequest,
	U256,
};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::client_cache::{AuthConfig, ClientCache};
use crate::wire::{ensure_success, read_json, seconds, LooseAmount};

pub const LIFI_ADAPTER_ID: &str = "li.fi";
pub const LIFI_DEFAULT_ENDPOINT: &str = "https://li.quest/v1";
const API_KEY_HEADER: &str = "x-lifi-api-key";

const SUPPORTED_CHAINS: &[u64] = &[
	1,        // Ethereum
	10,       // Optimism
	14,       // Flare
	25,       // Cronos
	30,       // Rootstock
	50,       // XDC
	56,       // BSC
	88,       // Viction
	100,      // Gnosis
	122,      // FUSE
	130,      // Unichain
	137,      // Polygon
	143,      // Monad
	146,      // Sonic
	204,      // opBNB
	232,      // Lens
	252,      // Fraxtal
	288,      // Boba
	324,      // zkSync
	480,      // World Chain
	747,      // Flow
	988,      // Stable
	999,      // HyperEVM
	1088,     // Metis
	1135,     // Lisk
	1284,     // Moonbeam
	1329,     // Sei
	1337,     // Hyperliquid
	1480,     // Vana
	1625,     // Gravity
	1868,     // Soneium
	1923,     // Swellchain
	2020,     // Ronin
	2741,     // Abstract
	5000,     // Mantle
	8217,     // Kaia
	8453,     // Base
	9745,     // Plasma
	13371,    // Immutable zkEVM
	33139,    // Apechain
	34443,    // Mode
	42161,    // Arbitrum
	42220,    // Celo
	42793,    // Etherlink
	43111,    // Hemi
	43114,    // Avalanche
	50104,    // Sophon
	55244,    // Superposition
	57073,    // Ink
	59144,    // Linea
	60808,    // BOB
	80094,    // Berachain
	81457,    // Blast
	98866,    // Plume
	167000,   // Taiko
	534352,   // Scroll
	747474,   // Katana
	21000000, // Corn
];

// ================================
// LI.FI API MODELS
// ================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LifiQuoteResponse {
	#[serde(default)]
	estimate: Option<LifiEstimate>,
	#[serde(default)]
	transaction_request: Option<LifiTransactionRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LifiEstimate {
	#[serde(default)]
	approval_address: Option<String>,
	#[serde(default, deserialize_with = "seconds")]
	execution_duration: u64,
	#[serde(default)]
	to_amount: Option<LooseAmount>,
	#[serde(default)]
	gas_costs: Vec<LifiGasCost>,
}

#[derive(Debug, Deserialize)]
struct LifiGasCost {
	#[serde(default)]
	limit: Option<LooseAmount>,
}

#[derive(Debug, Deserialize)]
struct LifiTransactionRequest {
	#[serde(default)]
	to: Option<String>,
	#[serde(default)]
	data: Option<String>,
	#[serde(default)]
	value: Option<LooseAmount>,
}

#[derive(Debug, Deserialize)]
struct LifiTokensResponse {
	tokens: HashMap<String, Vec<LifiToken>>,
}

#[derive(Debug, Deserialize)]
struct LifiToken {
	address: String,
}

/// Total gas across every step LI.FI reports
fn total_gas(costs: &[LifiGasCost]) -> U256 {
	let total = costs
		.iter()
		.filter_map(|cost| cost.limit.as_ref())
		.filter_map(|limit| limit.0.to_raw().ok())
		.fold(RawU256::ZERO, |acc, limit| acc.saturating_add(limit));
	U256::from(total)
}

/// LI.FI adapter for cross-chain bridge quotes
#[derive(Debug)]
pub struct LifiAdapter {
	info: AdapterInfo,
	config: ProviderConfig,
	cache: ClientCache,
}

impl LifiAdapter {
	pub fn new(config: ProviderConfig) -> Self {
		Self::with_cache(config, ClientCache::for_adapter())
	}

	pub fn with_cache(config: ProviderConfig, cache: ClientCache) -> Self {
		Self {
			info: AdapterInfo::new(
				LIFI_ADAPTER_ID,
				"LI.FI",
				"https://icons.llamao.fi/icons/protocols/li.fi?w=48&q=75",
			),
			config,
			cache,
		}
	}

	pub fn with_default_config() -> Self {
		Self::new(ProviderConfig::new(LIFI_DEFAULT_ENDPOINT))
	}

	fn client(&self) -> AdapterResult<Arc<reqwest::Client>> {
		self.cache.get_client_with_auth(
			LIFI_ADAPTER_ID,
			&self.config,
			&AuthConfig::api_key(API_KEY_HEADER, self.config.api_key.as_ref()),
		)
	}

	fn timeout(&self) -> Duration {
		Duration::from_millis(self.config.timeout_ms)
	}
}

#[async_trait]
impl BridgeAdapter for LifiAdapter {
	fn adapter_info(&self) -> &AdapterInfo {
		&self.info
	}

	async fn get_quote(&self, request: &QuoteRequest, _ctx: &AdapterContext) -> AdapterResult<Quote> {
		let url = format!("{}/quote", self.config.base_url());
		let from_chain = request.src_chain_id.to_string();
		let to_chain = request.dst_chain_id.to_string();
		let amount = request.amount.to_string();
		let slippage = request.slippage().as_fraction_string();

		let mut query: Vec<(&str, &str)> = vec![
			("fromChain", from_chain.as_str()),
			("toChain", to_chain.as_str()),
			("fromToken", request.input_token.address.as_str()),
			("toToken", request.output_token.address.as_str()),
			("fromAddress", request.sender.as_str()),
			("toAddress", request.recipient.as_str()),
			("fromAmount", amount.as_str()),
			("slippage", slippage.as_str()),
			("skipSimulation", "false"),
		];
		if let Some(integrator) = &self.config.integrator {
			query.push(("integrator", integrator.as_str()));
		}

		debug!(
			"Fetching LI.FI quote {} -> {} for {}",
			request.src_chain_id, request.dst_chain_id, request.amount
		);

		let response = self
			.client()?
			.get(&url)
			.timeout(self.timeout())
			.query(&query)
			.send()
			.await?;
		let data: LifiQuoteResponse = read_json(ensure_success(response).await?).await?;

		let estimate = data
			.estimate
			.ok_or_else(|| AdapterError::invalid_response("LI.FI quote has no estimate"))?;
		let tx = data
			.transaction_request
			.ok_or_else(|| AdapterError::invalid_response("LI.FI quote has no transactionRequest"))?;
		let to = tx
			.to
			.ok_or_else(|| AdapterError::invalid_response("LI.FI transactionRequest has no target"))?;

		Ok(Quote {
			adapter_id: LIFI_ADAPTER_ID.to_string(),
			token_spender_address: estimate.approval_address,
			estimated_time: estimate.execution_duration,
			estimated_amount: estimate
				.to_amount
				.map(LooseAmount::into_inner)
				.unwrap_or_default(),
			gas_estimate: total_gas(&estimate.gas_costs),
			tx_request: TxRequest {
				to,
				data: tx.data.unwrap_or_else(|| "0x".to_string()),
				value: tx.value.map(LooseAmount::into_inner).filter(|v| !v.is_zero()),
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
impl RouteFilter for LifiAdapter {
	async fn supports_route(&self, request: &QuoteRequest, ctx: &AdapterContext) -> AdapterResult<bool> {
		if !SUPPORTED_CHAINS.contains(&request.src_chain_id)
			|| !SUPPORTED_CHAINS.contains(&request.dst_chain_id)
		{
			return Ok(false);
		}

		let Some(tokens) = &ctx.token_list else {
			return Ok(false);
		};
		Ok(tokens.is_address_supported(request.src_chain_id, &request.input_token.address)
			&& tokens.is_address_supported(request.dst_chain_id, &request.output_token.address))
	}
}

#[async_trait]
impl TokenListSource for LifiAdapter {
	async fn fetch_token_list(&self) -> AdapterResult<TokenListData> {
		let url = format!("{}/tokens", self.config.base_url());
		let chains = SUPPORTED_CHAINS
			.iter()
			.map(u64::to_string)
			.collect::<Vec<_>>()
			.join(",");

		let response = self
			.client()?
			.get(&url)
			.timeout(self.timeout())
			.query(&[("chains", chains.as_str())])
			.send()
			.await?;
		let data: LifiTokensResponse = read_json(ensure_success(response).await?).await?;

		let mut map = BTreeMap::new();
		for (chain, tokens) in data.tokens {
			let Ok(chain_id) = chain.parse::<u64>() else {
				warn!("Skipping LI.FI tokens for unparsable chain key '{}'", chain);
				continue;
			};
			map.insert(
				chain_id,
				tokens.iter().map(|t| normalize_address(&t.address)).collect(),
			);
		}
		Ok(TokenListData::ChainTokens(map))
	}
}
