//! Per-adapter token universes used by route pre-filters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::models::normalize_address;

/// One asset in a provider's asset-id based token list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetDescriptor {
	/// Provider-specific asset identifier sent back in quote requests
	pub asset_id: String,
	/// Provider's chain name, e.g. `"arb"`
	pub blockchain: String,
	/// Lowercased contract address; the zero address for native assets
	pub contract_address: String,
	/// EVM chain id resolved from `blockchain`, when the adapter knows it
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub chain_id: Option<u64>,
}

/// A provider's supported-token universe
///
/// Providers publish either a flat chain-to-addresses map or a list of asset
/// descriptors. Both are queried through [`TokenListData::is_address_supported`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenListData {
	/// Lowercased token addresses keyed by chain id
	ChainTokens(BTreeMap<u64, Vec<String>>),
	Assets(Vec<AssetDescriptor>),
}

impl TokenListData {
	pub fn is_empty(&self) -> bool {
		match self {
			TokenListData::ChainTokens(map) => map.values().all(|tokens| tokens.is_empty()),
			TokenListData::Assets(assets) => assets.is_empty(),
		}
	}

	/// Total number of tokens across all chains
	pub fn len(&self) -> usize {
		match self {
			TokenListData::ChainTokens(map) => map.values().map(Vec::len).sum(),
			TokenListData::Assets(assets) => assets.len(),
		}
	}

	/// Whether `address` on `chain_id` appears in this list (case-insensitive)
	pub fn is_address_supported(&self, chain_id: u64, address: &str) -> bool {
		let address = normalize_address(address);
		match self {
			TokenListData::ChainTokens(map) => map
				.get(&chain_id)
				.map(|tokens| tokens.iter().any(|token| *token == address))
				.unwrap_or(false),
			TokenListData::Assets(_) => self.find_asset(chain_id, &address).is_some(),
		}
	}

	/// Provider asset id for an address, for asset-descriptor lists
	pub fn asset_id_for(&self, chain_id: u64, address: &str) -> Option<&str> {
		self.find_asset(chain_id, &normalize_address(address))
			.map(|asset| asset.asset_id.as_str())
	}

	fn find_asset(&self, chain_id: u64, normalized: &str) -> Option<&AssetDescriptor> {
		match self {
			TokenListData::Assets(assets) => assets.iter().find(|asset| {
				asset.chain_id == Some(chain_id) && asset.contract_address == normalized
			}),
			TokenListData::ChainTokens(_) => None,
		}
	}
}

/// Cached token list for one adapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenListEntry {
	pub adapter_id: String,
	pub data: TokenListData,
	pub fetched_at: DateTime<Utc>,
}

impl TokenListEntry {
	pub fn new(adapter_id: impl Into<String>, data: TokenListData) -> Self {
		Self {
			adapter_id: adapter_id.into(),
			data,
			fetched_at: Utc::now(),
		}
	}

	/// Whether the entry is younger than `ttl` at `now`
	pub fn is_fresh_at(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
		match (now - self.fetched_at).to_std() {
			Ok(age) => age < ttl,
			// fetched_at in the future (clock skew): treat as fresh
			Err(_) => true,
		}
	}

	pub fn is_fresh(&self, ttl: Duration) -> bool {
		self.is_fresh_at(ttl, Utc::now())
	}
}
