//! On-chain reads adapters use for advisory data

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::U256;

/// A call to estimate on the source chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasRequest {
	pub chain_id: u64,
	pub from: String,
	pub to: String,
	pub data: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub value: Option<U256>,
}

/// What sits at an address, as far as bridging is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AccountKind {
	/// Plain externally owned account, no code
	Eoa,
	/// EOA delegating to code through an EIP-7702 designator
	Eip7702Delegated,
	/// Smart contract account
	Contract,
}

impl AccountKind {
	/// Prefix of an EIP-7702 delegation designator in account code
	pub const DELEGATION_PREFIX: &'static str = "0xef0100";

	/// Classify the result of `eth_getCode`
	pub fn from_code(code: &str) -> Self {
		let code = code.trim().to_lowercase();
		if code.is_empty() || code == "0x" {
			AccountKind::Eoa
		} else if code.starts_with(Self::DELEGATION_PREFIX) {
			AccountKind::Eip7702Delegated
		} else {
			AccountKind::Contract
		}
	}

	pub fn is_eoa(&self) -> bool {
		matches!(self, AccountKind::Eoa)
	}
}

#[derive(Error, Debug)]
pub enum ChainError {
	#[error("No RPC endpoint configured for chain {chain_id}")]
	NoRpcForChain { chain_id: u64 },

	#[error("RPC transport error: {0}")]
	Transport(#[from] reqwest::Error),

	#[error("RPC error {code}: {message}")]
	Rpc { code: i64, message: String },

	#[error("Invalid RPC response: {reason}")]
	InvalidResponse { reason: String },
}

/// Source-chain access used for gas estimation and wallet detection
///
/// Every caller treats failures as advisory: gas falls back to `"0"` and
/// account detection falls back to [`AccountKind::Eoa`].
#[async_trait]
pub trait ChainClient: Send + Sync + std::fmt::Debug {
	async fn estimate_gas(&self, request: &GasRequest) -> Result<U256, ChainError>;

	async fn account_kind(&self, chain_id: u64, address: &str) -> Result<AccountKind, ChainError>;
}
