//! Integer amounts carried as decimal strings
//!
//! Provider APIs exchange token amounts and gas figures as base-10 strings in
//! the token's smallest unit. `U256` keeps that representation on the wire and
//! only parses into a fixed-width integer when arithmetic is needed.

use alloy_primitives::U256 as RawU256;
use std::fmt;
use std::str::FromStr;

/// Non-negative integer represented as a string of ASCII digits
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct U256(String);

impl U256 {
	/// Create a new value without validating it
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// The canonical zero value, used for unknown gas estimates
	pub fn zero() -> Self {
		Self("0".to_string())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Check if the value is zero (an empty string counts as zero)
	pub fn is_zero(&self) -> bool {
		self.0.chars().all(|c| c == '0')
	}

	/// Validate that the string is a non-empty run of digits
	pub fn validate(&self) -> Result<(), String> {
		if self.0.is_empty() {
			return Err("amount cannot be empty".to_string());
		}

		if !self.0.chars().all(|c| c.is_ascii_digit()) {
			return Err(format!("amount '{}' must contain only digits", self.0));
		}

		if self.0.len() > 78 {
			return Err(format!("amount '{}' exceeds 256 bits", self.0));
		}

		Ok(())
	}

	/// Parse into a 256-bit integer for arithmetic
	pub fn to_raw(&self) -> Result<RawU256, String> {
		self.validate()?;
		RawU256::from_str_radix(&self.0, 10).map_err(|e| format!("invalid amount '{}': {}", self.0, e))
	}

	/// Parse a `0x`-prefixed hex quantity as returned by JSON-RPC nodes
	pub fn from_hex_quantity(hex: &str) -> Result<Self, String> {
		let digits = hex.strip_prefix("0x").unwrap_or(hex);
		if digits.is_empty() {
			return Ok(Self::zero());
		}
		RawU256::from_str_radix(digits, 16)
			.map(Self::from)
			.map_err(|e| format!("invalid hex quantity '{}': {}", hex, e))
	}

	/// Normalise loosely formatted provider values ("", "0x1a", "21000") into digits
	///
	/// Returns zero for anything that cannot be read as an integer.
	pub fn lenient(value: &str) -> Self {
		let trimmed = value.trim();
		if trimmed.starts_with("0x") {
			return Self::from_hex_quantity(trimmed).unwrap_or_else(|_| Self::zero());
		}
		let candidate = Self(trimmed.to_string());
		match candidate.to_raw() {
			Ok(raw) => Self::from(raw),
			Err(_) => Self::zero(),
		}
	}
}

impl Default for U256 {
	fn default() -> Self {
		Self::zero()
	}
}

impl fmt::Display for U256 {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl FromStr for U256 {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let value = Self(s.to_string());
		value.validate()?;
		Ok(value)
	}
}

impl From<String> for U256 {
	fn from(value: String) -> Self {
		Self(value)
	}
}

impl From<&str> for U256 {
	fn from(value: &str) -> Self {
		Self(value.to_string())
	}
}

impl From<u64> for U256 {
	fn from(value: u64) -> Self {
		Self(value.to_string())
	}
}

impl From<u128> for U256 {
	fn from(value: u128) -> Self {
		Self(value.to_string())
	}
}

impl From<RawU256> for U256 {
	fn from(value: RawU256) -> Self {
		Self(value.to_string())
	}
}

// Always a JSON string, never a number, so large values survive JavaScript clients
impl serde::Serialize for U256 {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		serializer.serialize_str(&self.0)
	}
}

impl<'de> serde::Deserialize<'de> for U256 {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		let value = String::deserialize(deserializer)?;
		let amount = Self(value);
		amount.validate().map_err(serde::de::Error::custom)?;
		Ok(amount)
	}
}
