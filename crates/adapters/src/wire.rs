//! Helpers for reading provider HTTP responses
//!
//! Providers disagree on whether amounts and durations are JSON numbers or
//! strings, so response models use the lenient types here instead of
//! committing to one encoding.

use bridge_types::{AdapterError, AdapterResult, U256};
use reqwest::Response;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Integer amount accepted as a string, number, or hex quantity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LooseAmount(pub U256);

impl LooseAmount {
	pub fn into_inner(self) -> U256 {
		self.0
	}
}

impl<'de> Deserialize<'de> for LooseAmount {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let value = Value::deserialize(deserializer)?;
		Ok(LooseAmount(amount_from_value(&value)))
	}
}

/// Read an integer amount out of an arbitrary JSON value, zero when unreadable
pub fn amount_from_value(value: &Value) -> U256 {
	match value {
		Value::String(s) => U256::lenient(s),
		Value::Number(n) => match n.as_u64() {
			Some(v) => U256::from(v),
			None => n
				.as_f64()
				.filter(|f| f.is_finite() && *f >= 0.0 && *f < u128::MAX as f64)
				.map(|f| U256::from(f.trunc() as u128))
				.unwrap_or_default(),
		},
		_ => U256::zero(),
	}
}

/// Deserialize a duration in seconds from a number or numeric string
pub fn seconds<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
	D: Deserializer<'de>,
{
	let value = Option::<Value>::deserialize(deserializer)?;
	Ok(match value {
		Some(Value::Number(n)) => n
			.as_u64()
			.or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
			.unwrap_or(0),
		Some(Value::String(s)) => s.trim().parse::<f64>().map(|f| f.max(0.0).round() as u64).unwrap_or(0),
		_ => 0,
	})
}

/// Pass successful responses through; turn failures into `HttpStatusError`
///
/// Uses the provider's `message` or `error` field as the reason when the body
/// carries one, otherwise the status' reason phrase.
pub async fn ensure_success(response: Response) -> AdapterResult<Response> {
	let status = response.status();
	if status.is_success() {
		return Ok(response);
	}

	let body = response.text().await.unwrap_or_default();
	Err(match provider_error_message(&body) {
		Some(message) => AdapterError::http_failure(status.as_u16(), message),
		None => AdapterError::from_http_failure(status.as_u16()),
	})
}

/// Parse a successful response body into `T`
pub async fn read_json<T: DeserializeOwned>(response: Response) -> AdapterResult<T> {
	let body = response.text().await?;
	serde_json::from_str(&body).map_err(|e| AdapterError::InvalidResponse {
		reason: format!("failed to parse provider response: {}", e),
	})
}

fn provider_error_message(body: &str) -> Option<String> {
	let value: Value = serde_json::from_str(body).ok()?;
	["message", "error"].iter().find_map(|field| match value.get(*field) {
		Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
		_ => None,
	})
}
