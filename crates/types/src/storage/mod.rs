//! Storage trait for durable token-list persistence

use async_trait::async_trait;
use thiserror::Error;

use crate::token_list::TokenListEntry;

/// Storage error type
#[derive(Debug, Error)]
pub enum StorageError {
	#[error("I/O error at {path}: {message}")]
	Io { path: String, message: String },
	#[error("Serialization error: {message}")]
	Serialization { message: String },
	#[error("Storage operation failed: {message}")]
	Operation { message: String },
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Persistence for token-list cache entries, keyed by adapter id
///
/// Lets a fresh process reuse lists generated by an earlier run (or by the
/// offline generation job) instead of fetching every provider on cold start.
#[async_trait]
pub trait TokenListStorage: Send + Sync + std::fmt::Debug {
	/// Load the stored entry for an adapter
	async fn get(&self, adapter_id: &str) -> StorageResult<Option<TokenListEntry>>;

	/// Replace the stored entry for `entry.adapter_id`
	async fn put(&self, entry: &TokenListEntry) -> StorageResult<()>;

	/// Adapter ids with a stored entry
	async fn list(&self) -> StorageResult<Vec<String>>;

	async fn health_check(&self) -> StorageResult<bool> {
		Ok(true)
	}
}
