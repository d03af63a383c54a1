//! NEAR Intents (1Click) adapter implementation
//!
//! 1Click quotes return a deposit address instead of calldata. The adapter
//! builds the deposit transfer itself and, once the transfer is mined,
//! registers it with the settlement network through `/v0/deposit/submit`.

use async_trait::async_trait;
use bridge_types::{
	chrono::{Duration as ChronoDuration, SecondsFormat, Utc},
	normalize_address, AdapterContext, AdapterError, AdapterInfo, AdapterResult, AssetDescriptor,
	BridgeAdapter, ChainClient, GasRequest, ProviderConfig, Quote, QuoteRequest, RouteFilter,
	SettlementError, SettlementHook, TokenListData, TokenListSource, TxRequest,
	NATIVE_TOKEN_ADDRESS, U256,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::client_cache::{AuthConfig, ClientCache};
use crate::erc20::encode_transfer;
use crate::wire::{ensure_success, read_json, seconds, LooseAmount};

pub const NEAR_ADAPTER_ID: &str = "near";
pub const NEAR_DEFAULT_ENDPOINT: &str = "https://1click.chaindefuser.com";

/// Quote deadline, measured from the request
const QUOTE_DEADLINE_MINUTES: i64 = 5;
/// How long 1Click may wait for solvers before answering
const QUOTE_WAITING_TIME_MS: u64 = 3_000;
const DEPOSIT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(10);

const CHAIN_NAMES: &[(u64, &str)] = &[
	(1, "eth"),
	(56, "bsc"),
	(137, "pol"),
	(42161, "arb"),
	(10, "op"),
	(8453, "base"),
	(43114, "avax"),
	(100, "gnosis"),
	(59144, "linea"),
	(534352, "scroll"),
	(324, "zksync"),
	(80094, "bera"),
	(143, "monad"),
];

fn chain_name(chain_id: u64) -> Option<&'static str> {
	CHAIN_NAMES
		.iter()
		.find(|(id, _)| *id == chain_id)
		.map(|(_, name)| *name)
}

fn chain_id_for(blockchain: &str) -> Option<u64> {
	CHAIN_NAMES
		.iter()
		.find(|(_, name)| *name == blockchain)
		.map(|(id, _)| *id)
}

// ================================
// 1CLICK API MODELS
// ================================

#[derive(Debug, Deserialize)]
struct NearQuoteResponse {
	#[serde(default)]
	quote: Option<NearQuote>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NearQuote {
	#[serde(default)]
	deposit_address: Option<String>,
	#[serde(default)]
	amount_in: Option<LooseAmount>,
	#[serde(default)]
	amount_out: LooseAmount,
	#[serde(default, deserialize_with = "seconds")]
	time_estimate: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NearToken {
	asset_id: String,
	blockchain: String,
	#[serde(default)]
	contract_address: Option<String>,
}

/// NEAR Intents adapter
#[derive(Debug)]
pub struct NearAdapter {
	info: AdapterInfo,
	config: ProviderConfig,
	cache: ClientCache,
	chain_client: Option<Arc<dyn ChainClient>>,
}

impl NearAdapter {
	pub fn new(config: ProviderConfig) -> Self {
		Self::with_cache(config, ClientCache::for_adapter())
	}

	pub fn with_cache(config: ProviderConfig, cache: ClientCache) -> Self {
		Self {
			info: AdapterInfo::new(
				NEAR_ADAPTER_ID,
				"NEAR Intents",
				"https://icons.llamao.fi/icons/protocols/near?w=48&q=75",
			),
			config,
			cache,
			chain_client: None,
		}
	}

	pub fn with_default_config() -> Self {
		Self::new(ProviderConfig::new(NEAR_DEFAULT_ENDPOINT))
	}

	/// Use `chain_client` to estimate gas for the deposit transfer
	pub fn with_chain_client(mut self, chain_client: Arc<dyn ChainClient>) -> Self {
		self.chain_client = Some(chain_client);
		self
	}

	fn client(&self) -> AdapterResult<Arc<reqwest::Client>> {
		self.cache.get_client_with_auth(
			NEAR_ADAPTER_ID,
			&self.config,
			&AuthConfig::bearer(self.config.api_key.as_ref()),
		)
	}

	fn timeout(&self) -> Duration {
		Duration::from_millis(self.config.timeout_ms)
	}

	fn asset_id(ctx: &AdapterContext, chain_id: u64, address: &str) -> AdapterResult<String> {
		ctx.token_list
			.as_ref()
			.and_then(|tokens| tokens.asset_id_for(chain_id, address))
			.map(str::to_string)
			.ok_or_else(|| AdapterError::AssetNotFound {
				chain_id,
				address: address.to_string(),
			})
	}

	async fn estimate_gas(&self, request: &QuoteRequest, tx: &TxRequest) -> U256 {
		let Some(chain) = &self.chain_client else {
			return U256::zero();
		};
		let gas_request = GasRequest {
			chain_id: request.src_chain_id,
			from: request.sender.clone(),
			to: tx.to.clone(),
			data: tx.data.clone(),
			value: tx.value.clone(),
		};
		match chain.estimate_gas(&gas_request).await {
			Ok(gas) => gas,
			Err(e) => {
				warn!("NEAR failed to estimate gas: {}", e);
				U256::zero()
			},
		}
	}
}

/// The transaction that funds a 1Click deposit address
fn deposit_tx(request: &QuoteRequest, deposit_address: &str, amount_in: &U256) -> AdapterResult<TxRequest> {
	if request.input_token.is_native() {
		return Ok(TxRequest {
			to: deposit_address.to_string(),
			data: "0x".to_string(),
			value: Some(amount_in.clone()),
		});
	}
	Ok(TxRequest {
		to: request.input_token.address.clone(),
		data: encode_transfer(deposit_address, amount_in)?,
		value: None,
	})
}

#[async_trait]
impl BridgeAdapter for NearAdapter {
	fn adapter_info(&self) -> &AdapterInfo {
		&self.info
	}

	async fn get_quote(&self, request: &QuoteRequest, ctx: &AdapterContext) -> AdapterResult<Quote> {
		let origin_asset = Self::asset_id(ctx, request.src_chain_id, &request.input_token.address)?;
		let destination_asset =
			Self::asset_id(ctx, request.dst_chain_id, &request.output_token.address)?;

		let deadline = (Utc::now() + ChronoDuration::minutes(QUOTE_DEADLINE_MINUTES))
			.to_rfc3339_opts(SecondsFormat::Millis, true);
		let mut body = json!({
			"dry": false,
			"depositMode": "SIMPLE",
			"swapType": "EXACT_INPUT",
			"slippageTolerance": request.slippage().as_bps(),
			"originAsset": origin_asset,
			"depositType": "ORIGIN_CHAIN",
			"destinationAsset": destination_asset,
			"amount": request.amount,
			"refundTo": request.sender,
			"refundType": "ORIGIN_CHAIN",
			"recipient": request.recipient,
			"recipientType": "DESTINATION_CHAIN",
			"deadline": deadline,
			"quoteWaitingTimeMs": QUOTE_WAITING_TIME_MS,
		});
		if let Some(referral) = &self.config.integrator {
			body["referral"] = json!(referral);
		}

		debug!("Fetching 1Click quote {} -> {}", origin_asset, destination_asset);
		let url = format!("{}/v0/quote", self.config.base_url());
		let response = self
			.client()?
			.post(&url)
			.timeout(self.timeout())
			.json(&body)
			.send()
			.await?;
		let data: NearQuoteResponse = read_json(ensure_success(response).await?).await?;

		let quote = data
			.quote
			.ok_or_else(|| AdapterError::invalid_response("1Click response has no quote"))?;
		let deposit_address = quote
			.deposit_address
			.ok_or_else(|| AdapterError::invalid_response("1Click quote has no deposit address"))?;
		let amount_in = quote
			.amount_in
			.map(LooseAmount::into_inner)
			.filter(|a| !a.is_zero())
			.unwrap_or_else(|| request.amount.clone());

		let tx_request = deposit_tx(request, &deposit_address, &amount_in)?;
		let gas_estimate = self.estimate_gas(request, &tx_request).await;

		Ok(Quote {
			adapter_id: NEAR_ADAPTER_ID.to_string(),
			token_spender_address: None,
			estimated_time: quote.time_estimate,
			estimated_amount: quote.amount_out.into_inner(),
			gas_estimate,
			tx_request,
			extra_data: Some(json!({ "depositAddress": deposit_address })),
		})
	}

	fn route_filter(&self) -> Option<&dyn RouteFilter> {
		Some(self)
	}

	fn settlement_hook(&self) -> Option<&dyn SettlementHook> {
		Some(self)
	}

	fn token_list_source(&self) -> Option<&dyn TokenListSource> {
		Some(self)
	}
}

#[async_trait]
impl RouteFilter for NearAdapter {
	async fn supports_route(&self, request: &QuoteRequest, ctx: &AdapterContext) -> AdapterResult<bool> {
		if chain_name(request.src_chain_id).is_none() || chain_name(request.dst_chain_id).is_none() {
			return Ok(false);
		}

		// Without a token list the provider decides
		let tokens = match &ctx.token_list {
			Some(tokens) if !tokens.is_empty() => tokens,
			_ => return Ok(true),
		};

		Ok(
			tokens.is_address_supported(request.src_chain_id, &request.input_token.address)
				&& tokens.is_address_supported(request.dst_chain_id, &request.output_token.address),
		)
	}
}

#[async_trait]
impl SettlementHook for NearAdapter {
	async fn post_bridge(&self, quote: &Quote, source_tx_hash: &str) -> Result<(), SettlementError> {
		let deposit_address = quote
			.extra_data
			.as_ref()
			.and_then(|extra| extra.get("depositAddress"))
			.and_then(|value| value.as_str())
			.ok_or_else(|| SettlementError::MissingExtraData {
				field: "depositAddress".to_string(),
			})?;

		let client = self.client().map_err(|e| match e {
			AdapterError::HttpError(e) => SettlementError::Http(e),
			other => SettlementError::HttpStatus {
				status_code: other.status_code().unwrap_or(0),
				reason: other.to_string(),
			},
		})?;
		let url = format!("{}/v0/deposit/submit", self.config.base_url());
		let response = client
			.post(&url)
			.timeout(DEPOSIT_SUBMIT_TIMEOUT)
			.json(&json!({
				"txHash": source_tx_hash,
				"depositAddress": deposit_address,
			}))
			.send()
			.await
			.map_err(|e| {
				if e.is_timeout() {
					SettlementError::Timeout {
						timeout_ms: DEPOSIT_SUBMIT_TIMEOUT.as_millis() as u64,
					}
				} else {
					SettlementError::Http(e)
				}
			})?;

		if let Err(e) = ensure_success(response).await {
			return Err(SettlementError::HttpStatus {
				status_code: e.status_code().unwrap_or(0),
				reason: e.to_string(),
			});
		}

		info!(
			"Submitted deposit {} for 1Click address {}",
			source_tx_hash, deposit_address
		);
		Ok(())
	}
}

#[async_trait]
impl TokenListSource for NearAdapter {
	async fn fetch_token_list(&self) -> AdapterResult<TokenListData> {
		let url = format!("{}/v0/tokens", self.config.base_url());
		let response = self.client()?.get(&url).timeout(self.timeout()).send().await?;
		let tokens: Vec<NearToken> = read_json(ensure_success(response).await?).await?;

		let assets = tokens
			.into_iter()
			.map(|token| AssetDescriptor {
				chain_id: chain_id_for(&token.blockchain),
				contract_address: token
					.contract_address
					.as_deref()
					.map(normalize_address)
					.unwrap_or_else(|| NATIVE_TOKEN_ADDRESS.to_string()),
				asset_id: token.asset_id,
				blockchain: token.blockchain,
			})
			.collect::<Vec<_>>();

		debug!("1Click lists {} assets", assets.len());
		Ok(TokenListData::Assets(assets))
	}
}
