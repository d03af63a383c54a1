//! Bridge Storage
//!
//! Persistence backends for token-list cache entries. The in-memory store
//! suits tests and single-process deployments; the file store lets lists
//! generated offline survive restarts.

pub mod file_store;
pub mod memory_store;

pub use bridge_types::{StorageError, StorageResult, TokenListStorage};
pub use file_store::FileStore;
pub use memory_store::MemoryStore;
