//! Error types for quote requests

use thiserror::Error;

/// Request-level validation failures
///
/// This is the only error `get_quotes` surfaces to its caller; per-adapter
/// failures are absorbed by the engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuoteValidationError {
	#[error("Missing required field: {field}")]
	MissingRequiredField { field: String },

	#[error("Invalid amount: {field} - {reason}")]
	InvalidAmount { field: String, reason: String },

	#[error("Invalid chain ID for {field}: {chain_id}")]
	InvalidChainId { field: String, chain_id: u64 },

	#[error("Invalid address for {field}: {address}")]
	InvalidAddress { field: String, address: String },

	#[error("Invalid slippage tolerance: {value}% (must be greater than 0 and at most {max}%)")]
	InvalidSlippage { value: f64, max: f64 },
}
