//! Token model shared by requests, token lists and ranking

use serde::{Deserialize, Serialize};

/// Sentinel address used for a chain's native gas asset
pub const NATIVE_TOKEN_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Lowercase an address for case-insensitive comparisons
///
/// EVM addresses arrive both checksummed and lowercased depending on the
/// provider, so every token-list lookup compares normalised forms.
pub fn normalize_address(address: &str) -> String {
	address.trim().to_lowercase()
}

/// Check that a string looks like a 20-byte hex EVM address
pub fn is_evm_address(address: &str) -> bool {
	address
		.strip_prefix("0x")
		.map(|hex| hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()))
		.unwrap_or(false)
}

/// A token on a specific chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
	pub chain_id: u64,
	pub symbol: String,
	pub address: String,
	pub decimals: u8,
	#[serde(default, rename = "logoURI", skip_serializing_if = "Option::is_none")]
	pub logo_uri: Option<String>,
}

impl Token {
	pub fn new(chain_id: u64, symbol: impl Into<String>, address: impl Into<String>, decimals: u8) -> Self {
		Self {
			chain_id,
			symbol: symbol.into(),
			address: address.into(),
			decimals,
			logo_uri: None,
		}
	}

	/// Native gas token of a chain (ETH, BNB, ...)
	pub fn native(chain_id: u64, symbol: impl Into<String>, decimals: u8) -> Self {
		Self::new(chain_id, symbol, NATIVE_TOKEN_ADDRESS, decimals)
	}

	pub fn with_logo(mut self, logo_uri: impl Into<String>) -> Self {
		self.logo_uri = Some(logo_uri.into());
		self
	}

	pub fn is_native(&self) -> bool {
		normalize_address(&self.address) == NATIVE_TOKEN_ADDRESS
	}

	pub fn normalized_address(&self) -> String {
		normalize_address(&self.address)
	}
}
