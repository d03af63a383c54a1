//! Adapter contract and its optional capabilities

use async_trait::async_trait;
use std::fmt::Debug;

use super::{AdapterCapabilities, AdapterContext, AdapterInfo, AdapterResult, SettlementError};
use crate::quotes::{Quote, QuoteRequest};
use crate::token_list::TokenListData;

/// Core trait for bridge provider adapters
///
/// Only `adapter_info` and `get_quote` are required. Optional behaviour is
/// exposed through the capability accessors, which return `Some(self)` when
/// the adapter also implements the matching capability trait. The engine
/// checks those accessors rather than probing for methods.
#[async_trait]
pub trait BridgeAdapter: Send + Sync + Debug {
	/// Get adapter metadata
	fn adapter_info(&self) -> &AdapterInfo;

	/// Get adapter ID (registry key)
	fn id(&self) -> &str {
		&self.adapter_info().adapter_id
	}

	/// Get human-readable name for this adapter
	fn name(&self) -> &str {
		&self.adapter_info().name
	}

	/// Ask the provider for a quote
	///
	/// Performs the provider's HTTP call(s) and maps the response onto the
	/// canonical [`Quote`]. Fails when the call errors, the response is
	/// malformed, or the provider reports its own simulation failed.
	async fn get_quote(&self, request: &QuoteRequest, ctx: &AdapterContext)
		-> AdapterResult<Quote>;

	fn route_filter(&self) -> Option<&dyn RouteFilter> {
		None
	}

	fn settlement_hook(&self) -> Option<&dyn SettlementHook> {
		None
	}

	fn token_list_source(&self) -> Option<&dyn TokenListSource> {
		None
	}

	fn capabilities(&self) -> AdapterCapabilities {
		AdapterCapabilities {
			supports_route_check: self.route_filter().is_some(),
			has_settlement_hook: self.settlement_hook().is_some(),
			has_generated_token_list: self.token_list_source().is_some(),
		}
	}
}

/// Cheap route pre-filter
///
/// Must not do the work of `get_quote`. `Ok(false)` silently excludes the
/// adapter from a request; an error is treated the same way by the engine.
#[async_trait]
pub trait RouteFilter: Send + Sync {
	async fn supports_route(&self, request: &QuoteRequest, ctx: &AdapterContext)
		-> AdapterResult<bool>;
}

/// Off-chain registration step run after the source transaction confirms
///
/// Callers may retry, so implementations must tolerate duplicate delivery.
#[async_trait]
pub trait SettlementHook: Send + Sync {
	async fn post_bridge(&self, quote: &Quote, source_tx_hash: &str)
		-> Result<(), SettlementError>;
}

/// Provider endpoint listing the tokens an adapter can route
#[async_trait]
pub trait TokenListSource: Send + Sync {
	async fn fetch_token_list(&self) -> AdapterResult<TokenListData>;
}
