//! Bridge Types
//!
//! Shared models and traits for the cross-chain bridge quote aggregator.
//! Adapters, the aggregation service and the HTTP API all speak these types.

pub mod adapters;
pub mod chain;
pub mod models;
pub mod quotes;
pub mod storage;
pub mod test_utils;
pub mod token_list;

// Re-export chrono and serde_json for convenience
pub use chrono;
pub use serde_json;

pub use adapters::{
	AdapterCapabilities, AdapterContext, AdapterError, AdapterInfo, AdapterResult, BridgeAdapter,
	ProviderConfig, RouteFilter, SettlementError, SettlementHook, TokenListSource,
};
pub use chain::{AccountKind, ChainClient, ChainError, GasRequest};
pub use models::{
	is_evm_address, normalize_address, SecretString, SlippageBps, Token, NATIVE_TOKEN_ADDRESS,
	U256,
};
pub use quotes::{
	Quote, QuoteRequest, QuoteValidationError, QuoteValidationResult, RankedQuote, TxRequest,
};
pub use storage::{StorageError, StorageResult, TokenListStorage};
pub use token_list::{AssetDescriptor, TokenListData, TokenListEntry};
