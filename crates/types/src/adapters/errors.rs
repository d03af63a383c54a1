//! Error types for adapter operations

use thiserror::Error;

/// Failure of a single adapter call
///
/// Every variant is recovered at the per-adapter boundary inside the engine;
/// none of them fail an aggregation.
#[derive(Error, Debug)]
pub enum AdapterError {
	#[error("HTTP request failed: {0}")]
	HttpError(#[from] reqwest::Error),

	#[error("HTTP {status_code}: {reason}")]
	HttpStatusError { status_code: u16, reason: String },

	#[error("Invalid response format: {reason}")]
	InvalidResponse { reason: String },

	#[error("Provider {adapter_id} rejected the route: {reason}")]
	ProviderRejected { adapter_id: String, reason: String },

	#[error("Chain not supported: {chain_id} by adapter {adapter_id}")]
	ChainNotSupported { chain_id: u64, adapter_id: String },

	#[error("Asset not found for chain {chain_id} and address {address}")]
	AssetNotFound { chain_id: u64, address: String },

	#[error("Timeout occurred after {timeout_ms}ms")]
	Timeout { timeout_ms: u64 },

	#[error("Configuration error: {reason}")]
	ConfigError { reason: String },

	#[error("Unsupported operation: {operation} for adapter {adapter_id}")]
	UnsupportedOperation {
		operation: String,
		adapter_id: String,
	},

	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

impl AdapterError {
	/// Extract HTTP status code from the error if available
	pub fn status_code(&self) -> Option<u16> {
		match self {
			AdapterError::HttpStatusError { status_code, .. } => Some(*status_code),
			AdapterError::HttpError(reqwest_error) => {
				reqwest_error.status().map(|status| status.as_u16())
			},
			_ => None,
		}
	}

	/// Create an HTTP failure error with the given status code and reason
	pub fn http_failure(status_code: u16, reason: impl Into<String>) -> Self {
		Self::HttpStatusError {
			status_code,
			reason: reason.into(),
		}
	}

	/// Create an HTTP failure error from a status code using its reason phrase
	pub fn from_http_failure(status_code: u16) -> Self {
		let reason = match status_code {
			400 => "Bad Request".to_string(),
			401 => "Unauthorized".to_string(),
			403 => "Forbidden".to_string(),
			404 => "Not Found".to_string(),
			408 => "Request Timeout".to_string(),
			422 => "Unprocessable Entity".to_string(),
			429 => "Too Many Requests".to_string(),
			500 => "Internal Server Error".to_string(),
			502 => "Bad Gateway".to_string(),
			503 => "Service Unavailable".to_string(),
			504 => "Gateway Timeout".to_string(),
			_ => format!("HTTP Error {}", status_code),
		};

		Self::HttpStatusError {
			status_code,
			reason,
		}
	}

	pub fn rejected(adapter_id: impl Into<String>, reason: impl Into<String>) -> Self {
		Self::ProviderRejected {
			adapter_id: adapter_id.into(),
			reason: reason.into(),
		}
	}

	pub fn invalid_response(reason: impl Into<String>) -> Self {
		Self::InvalidResponse {
			reason: reason.into(),
		}
	}

	pub fn chain_not_supported(adapter_id: impl Into<String>, chain_id: u64) -> Self {
		Self::ChainNotSupported {
			chain_id,
			adapter_id: adapter_id.into(),
		}
	}
}

/// Failure of a post-bridge settlement notification
///
/// Reported to operators as a warning; the on-chain transfer has already
/// succeeded when this happens.
#[derive(Error, Debug)]
pub enum SettlementError {
	#[error("Settlement request failed: {0}")]
	Http(#[from] reqwest::Error),

	#[error("Settlement endpoint returned HTTP {status_code}: {reason}")]
	HttpStatus { status_code: u16, reason: String },

	#[error("Quote is missing settlement data: {field}")]
	MissingExtraData { field: String },

	#[error("Settlement timed out after {timeout_ms}ms")]
	Timeout { timeout_ms: u64 },

	#[error("Adapter {adapter_id} has no settlement hook")]
	NotSupported { adapter_id: String },

	#[error("Unknown adapter: {adapter_id}")]
	UnknownAdapter { adapter_id: String },
}
