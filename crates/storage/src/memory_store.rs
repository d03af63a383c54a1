//! In-memory token-list storage using DashMap

use async_trait::async_trait;
use bridge_types::{StorageResult, TokenListEntry, TokenListStorage};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

/// In-memory storage for token-list entries
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
	entries: Arc<DashMap<String, TokenListEntry>>,
}

impl MemoryStore {
	/// Create a new memory store instance
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Drop the entry for an adapter, returning whether one existed
	pub fn remove(&self, adapter_id: &str) -> bool {
		self.entries.remove(adapter_id).is_some()
	}
}

#[async_trait]
impl TokenListStorage for MemoryStore {
	async fn get(&self, adapter_id: &str) -> StorageResult<Option<TokenListEntry>> {
		Ok(self.entries.get(adapter_id).map(|entry| entry.clone()))
	}

	async fn put(&self, entry: &TokenListEntry) -> StorageResult<()> {
		debug!(
			"Storing token list for {} ({} tokens)",
			entry.adapter_id,
			entry.data.len()
		);
		self.entries.insert(entry.adapter_id.clone(), entry.clone());
		Ok(())
	}

	async fn list(&self) -> StorageResult<Vec<String>> {
		let mut ids: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
		ids.sort();
		Ok(ids)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use bridge_types::TokenListData;
	use std::collections::BTreeMap;

	fn entry(adapter_id: &str, tokens: &[&str]) -> TokenListEntry {
		let mut map = BTreeMap::new();
		map.insert(1u64, tokens.iter().map(|t| t.to_string()).collect());
		TokenListEntry::new(adapter_id, TokenListData::ChainTokens(map))
	}

	#[tokio::test]
	async fn test_put_get_and_replace() {
		let store = MemoryStore::new();
		assert!(store.get("across").await.unwrap().is_none());

		store.put(&entry("across", &["0xa"])).await.unwrap();
		store.put(&entry("across", &["0xa", "0xb"])).await.unwrap();
		store.put(&entry("li.fi", &["0xc"])).await.unwrap();

		let stored = store.get("across").await.unwrap().unwrap();
		assert_eq!(stored.data.len(), 2);
		assert_eq!(store.list().await.unwrap(), vec!["across", "li.fi"]);
		assert!(store.health_check().await.unwrap());
	}

	#[tokio::test]
	async fn test_clones_share_entries() {
		let store = MemoryStore::new();
		let clone = store.clone();
		clone.put(&entry("near", &["0xa"])).await.unwrap();

		assert_eq!(store.len(), 1);
		assert!(store.remove("near"));
		assert!(clone.is_empty());
	}
}
