//! Relay adapter implementation
//!
//! Relay needs to know whether the sender can sign plain transfers: smart
//! accounts and EIP-7702 delegated accounts must use an explicit deposit.
//! Gas is estimated on the source chain from the returned transaction.

use async_trait::async_trait;
use bridge_types::{
	AccountKind, AdapterContext, AdapterError, AdapterInfo, AdapterResult, BridgeAdapter,
	ChainClient, GasRequest, ProviderConfig, Quote, QuoteRequest, RouteFilter, TxRequest, U256,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::client_cache::{AuthConfig, ClientCache};
use crate::wire::{ensure_success, read_json, seconds, LooseAmount};

pub const RELAY_ADAPTER_ID: &str = "relay";
pub const RELAY_DEFAULT_ENDPOINT: &str = "https://api.relay.link";

const SUPPORTED_CHAINS: &[u64] = &[
	1,          // ethereum
	10,         // optimism
	25,         // cronos
	56,         // bsc
	100,        // gnosis
	130,        // unichain
	137,        // polygon
	143,        // monad
	146,        // sonic
	169,        // manta-pacific
	288,        // boba
	324,        // zksync
	360,        // shape
	466,        // appchain
	480,        // world-chain
	690,        // redstone
	747,        // flow-evm
	988,        // stable
	999,        // hyperevm
	1088,       // metis
	1101,       // polygon-zkevm
	1135,       // lisk
	1329,       // sei
	1337,       // hyperliquid
	1424,       // perennial
	1514,       // story
	1625,       // gravity
	1868,       // soneium
	1923,       // swellchain
	1996,       // sanko
	2020,       // ronin
	2741,       // abstract
	2818,       // morph
	5000,       // mantle
	5031,       // somnia
	5330,       // superseed
	7560,       // cyber
	7869,       // powerloom-v2
	7897,       // arena-z
	8333,       // B3
	8453,       // base
	9745,       // plasma
	33139,      // apechain
	33979,      // funki
	34443,      // mode
	42018,      // mythos
	42161,      // arbitrum
	42170,      // arbitrum-nova
	42220,      // celo
	43111,      // hemi
	43114,      // avalanche
	43419,      // gunz
	48900,      // zircuit
	55244,      // superposition
	57073,      // ink
	59144,      // linea
	60808,      // bob
	69000,      // animechain
	80094,      // berachain
	81457,      // blast
	98866,      // plume
	167000,     // taiko
	510003,     // syndicate
	534352,     // scroll
	543210,     // zero-network
	660279,     // xai
	747474,     // katana
	984122,     // forma
	5064014,    // ethereal
	7777777,    // zora
	8253038,    // bitcoin
	9286185,    // eclipse
	9286186,    // soon
	21000000,   // corn
	666666666,  // degen
	728126428,  // tron
	792703809,  // solana
	888888888,  // ancient8
	1380012617, // rari
];

// ================================
// RELAY API MODELS
// ================================

#[derive(Debug, Deserialize)]
struct RelayQuoteResponse {
	#[serde(default)]
	steps: Vec<RelayStep>,
	#[serde(default)]
	details: Option<RelayDetails>,
}

#[derive(Debug, Deserialize)]
struct RelayStep {
	#[serde(default)]
	items: Vec<RelayStepItem>,
}

#[derive(Debug, Deserialize)]
struct RelayStepItem {
	#[serde(default)]
	data: Option<RelayTxData>,
}

#[derive(Debug, Deserialize)]
struct RelayTxData {
	to: String,
	#[serde(default)]
	data: Option<String>,
	#[serde(default)]
	value: Option<LooseAmount>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RelayDetails {
	#[serde(default, deserialize_with = "seconds")]
	time_estimate: u64,
	#[serde(default)]
	currency_out: Option<RelayCurrencyAmount>,
}

#[derive(Debug, Deserialize)]
struct RelayCurrencyAmount {
	#[serde(default)]
	amount: Option<LooseAmount>,
}

/// Relay adapter for cross-chain bridge quotes
#[derive(Debug)]
pub struct RelayAdapter {
	info: AdapterInfo,
	config: ProviderConfig,
	cache: ClientCache,
	chain_client: Option<Arc<dyn ChainClient>>,
}

impl RelayAdapter {
	pub fn new(config: ProviderConfig) -> Self {
		Self::with_cache(config, ClientCache::for_adapter())
	}

	pub fn with_cache(config: ProviderConfig, cache: ClientCache) -> Self {
		Self {
			info: AdapterInfo::new(
				RELAY_ADAPTER_ID,
				"Relay",
				"https://icons.llamao.fi/icons/protocols/relay?w=48&q=75",
			),
			config,
			cache,
			chain_client: None,
		}
	}

	pub fn with_default_config() -> Self {
		Self::new(ProviderConfig::new(RELAY_DEFAULT_ENDPOINT))
	}

	/// Use `chain_client` for wallet detection and gas estimation
	pub fn with_chain_client(mut self, chain_client: Arc<dyn ChainClient>) -> Self {
		self.chain_client = Some(chain_client);
		self
	}

	fn client(&self) -> AdapterResult<Arc<reqwest::Client>> {
		self.cache.get_client_with_auth(
			RELAY_ADAPTER_ID,
			&self.config,
			&AuthConfig::api_key("x-api-key", self.config.api_key.as_ref()),
		)
	}

	fn timeout(&self) -> Duration {
		Duration::from_millis(self.config.timeout_ms)
	}

	async fn sender_kind(&self, request: &QuoteRequest) -> AccountKind {
		let Some(chain) = &self.chain_client else {
			return AccountKind::Eoa;
		};
		match chain.account_kind(request.src_chain_id, &request.sender).await {
			Ok(kind) => kind,
			Err(e) => {
				warn!("Relay could not detect wallet type, assuming EOA: {}", e);
				AccountKind::Eoa
			},
		}
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
				warn!("Relay failed to estimate gas: {}", e);
				U256::zero()
			},
		}
	}
}

#[async_trait]
impl BridgeAdapter for RelayAdapter {
	fn adapter_info(&self) -> &AdapterInfo {
		&self.info
	}

	async fn get_quote(&self, request: &QuoteRequest, _ctx: &AdapterContext) -> AdapterResult<Quote> {
		let kind = self.sender_kind(request).await;

		let mut body = json!({
			"tradeType": "EXACT_INPUT",
			"amount": request.amount,
			"originCurrency": request.input_token.address,
			"originChainId": request.src_chain_id,
			"destinationCurrency": request.output_token.address,
			"destinationChainId": request.dst_chain_id,
			"user": request.sender,
			"recipient": request.recipient,
			"explicitDeposit": !kind.is_eoa(),
			"slippageTolerance": request.slippage().as_bps().to_string(),
		});
		if let Some(referrer) = &self.config.integrator {
			body["referrer"] = json!(referrer);
		}

		debug!(
			"Fetching Relay quote {} -> {} (sender {:?})",
			request.src_chain_id, request.dst_chain_id, kind
		);

		let url = format!("{}/quote/v2", self.config.base_url());
		let response = self
			.client()?
			.post(&url)
			.timeout(self.timeout())
			.json(&body)
			.send()
			.await?;
		let data: RelayQuoteResponse = read_json(ensure_success(response).await?).await?;

		let tx_data = data
			.steps
			.into_iter()
			.next()
			.and_then(|step| step.items.into_iter().next())
			.and_then(|item| item.data)
			.ok_or_else(|| AdapterError::invalid_response("No data found"))?;

		let tx_request = TxRequest {
			to: tx_data.to,
			data: tx_data.data.unwrap_or_else(|| "0x".to_string()),
			value: tx_data.value.map(LooseAmount::into_inner).filter(|v| !v.is_zero()),
		};
		let gas_estimate = self.estimate_gas(request, &tx_request).await;
		let (estimated_time, estimated_amount) = match data.details {
			Some(details) => (
				details.time_estimate,
				details
					.currency_out
					.and_then(|c| c.amount)
					.map(LooseAmount::into_inner)
					.unwrap_or_default(),
			),
			None => (0, U256::zero()),
		};

		Ok(Quote {
			adapter_id: RELAY_ADAPTER_ID.to_string(),
			// smart accounts batch the approval into the deposit target
			token_spender_address: if kind.is_eoa() {
				None
			} else {
				Some(tx_request.to.clone())
			},
			estimated_time,
			estimated_amount,
			gas_estimate,
			tx_request,
			extra_data: None,
		})
	}

	fn route_filter(&self) -> Option<&dyn RouteFilter> {
		Some(self)
	}
}

#[async_trait]
impl RouteFilter for RelayAdapter {
	async fn supports_route(&self, request: &QuoteRequest, _ctx: &AdapterContext) -> AdapterResult<bool> {
		Ok(SUPPORTED_CHAINS.contains(&request.src_chain_id)
			&& SUPPORTED_CHAINS.contains(&request.dst_chain_id))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_support::serve;
	use axum::{routing::post, Json, Router};
	use bridge_types::test_utils::sample_request;
	use bridge_types::ChainError;
	use serde_json::Value;

	#[derive(Debug)]
	struct StubChain {
		kind: Option<AccountKind>,
		gas: Option<&'static str>,
	}

	#[async_trait]
	impl ChainClient for StubChain {
		async fn estimate_gas(&self, _request: &GasRequest) -> Result<U256, ChainError> {
			self.gas.map(U256::from).ok_or(ChainError::Rpc {
				code: 3,
				message: "execution reverted".to_string(),
			})
		}

		async fn account_kind(&self, chain_id: u64, _address: &str) -> Result<AccountKind, ChainError> {
			self.kind.ok_or(ChainError::NoRpcForChain { chain_id })
		}
	}

	async fn relay_server() -> String {
		let router = Router::new().route(
			"/quote/v2",
			post(|Json(body): Json<Value>| async move {
				Json(json!({
					"steps": [{"items": [{"data": {"to": "0xreceiver", "data": "0xfeed", "value": "0"}}]}],
					"details": {
						"timeEstimate": 2,
						"currencyOut": {"amount": "999700"},
						"echo": body
					}
				}))
			}),
		);
		serve(router).await
	}

	#[tokio::test]
	async fn test_eoa_sender_gets_plain_deposit_and_gas() {
		let endpoint = relay_server().await;
		let adapter = RelayAdapter::with_cache(ProviderConfig::new(endpoint), ClientCache::new())
			.with_chain_client(Arc::new(StubChain {
				kind: Some(AccountKind::Eoa),
				gas: Some("85000"),
			}));

		let quote = adapter
			.get_quote(&sample_request(), &AdapterContext::default())
			.await
			.unwrap();
		assert_eq!(quote.estimated_amount.as_str(), "999700");
		assert_eq!(quote.gas_estimate.as_str(), "85000");
		assert_eq!(quote.estimated_time, 2);
		assert!(quote.token_spender_address.is_none());
	}

	#[tokio::test]
	async fn test_contract_sender_and_failed_gas_estimate() {
		let endpoint = relay_server().await;
		let adapter = RelayAdapter::with_cache(ProviderConfig::new(endpoint), ClientCache::new())
			.with_chain_client(Arc::new(StubChain {
				kind: Some(AccountKind::Contract),
				gas: None,
			}));

		let quote = adapter
			.get_quote(&sample_request(), &AdapterContext::default())
			.await
			.unwrap();
		assert_eq!(quote.token_spender_address.as_deref(), Some("0xreceiver"));
		assert!(quote.gas_estimate.is_zero());
	}

	#[tokio::test]
	async fn test_request_body_units() {
		let router = Router::new().route(
			"/quote/v2",
			post(|Json(body): Json<Value>| async move {
				assert_eq!(body["slippageTolerance"], "50");
				assert_eq!(body["explicitDeposit"], true);
				assert_eq!(body["amount"], "1000000");
				Json(json!({"steps": [{"items": [{"data": {"to": "0xreceiver"}}]}]}))
			}),
		);
		let endpoint = serve(router).await;
		let adapter = RelayAdapter::with_cache(ProviderConfig::new(endpoint), ClientCache::new())
			.with_chain_client(Arc::new(StubChain {
				kind: Some(AccountKind::Eip7702Delegated),
				gas: None,
			}));

		let quote = adapter
			.get_quote(&sample_request(), &AdapterContext::default())
			.await
			.unwrap();
		assert!(quote.estimated_amount.is_zero());
	}

	#[tokio::test]
	async fn test_missing_step_data_is_invalid() {
		let router = Router::new().route("/quote/v2", post(|| async { Json(json!({"steps": []})) }));
		let endpoint = serve(router).await;
		let adapter = RelayAdapter::with_cache(ProviderConfig::new(endpoint), ClientCache::new());

		let result = adapter
			.get_quote(&sample_request(), &AdapterContext::default())
			.await;
		assert!(matches!(result, Err(AdapterError::InvalidResponse { .. })));
	}

	#[tokio::test]
	async fn test_route_check_is_chain_only() {
		let adapter = RelayAdapter::with_default_config();
		let mut request = sample_request();
		assert!(adapter
			.supports_route(&request, &AdapterContext::default())
			.await
			.unwrap());
		request.dst_chain_id = 31337;
		assert!(!adapter
			.supports_route(&request, &AdapterContext::default())
			.await
			.unwrap());
	}
}
