//! Bridge Service
//!
//! Quote aggregation engine, token-list cache, ranking and settlement.

pub mod aggregator;
pub mod jobs;
pub mod ranking;
pub mod settlement;
pub mod token_cache;

#[cfg(test)]
mod test_mocks;

pub use aggregator::{
	AdapterOutcome, AggregationReport, AggregatorResult, AggregatorService,
	AggregatorServiceError, OutcomeKind, QuoteFailure, TokenListGenerationReport,
	TokenListGenerationResult, DEFAULT_AGGREGATION_TIMEOUT,
};
pub use jobs::{JobError, JobResult, TokenListRefreshJob};
pub use ranking::{quote_warnings, token_units, MarketData, QuoteRanker, QuoteWarning};
pub use settlement::{
	BridgeExecution, ExecutionError, ExecutionState, SettlementConfig, SettlementNotifier,
	SettlementOutcome,
};
pub use token_cache::{
	CacheError, CacheResult, TokenListCache, TokenListCacheConfig, DEFAULT_FETCH_TIMEOUT,
	DEFAULT_TOKEN_LIST_TTL,
};
