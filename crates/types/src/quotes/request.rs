//! Quote request model and validation

use serde::{Deserialize, Serialize};

use super::{QuoteValidationError, QuoteValidationResult};
use crate::models::{is_evm_address, SlippageBps, Token, U256};

/// Upper bound on slippage a request may ask for, in percent
pub const MAX_SLIPPAGE_PERCENT: f64 = 50.0;

/// A single "move `amount` of `input_token` to `output_token`" request
///
/// Built once per aggregation call and shared read-only by every adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
	/// Slippage tolerance as a percentage, e.g. `0.5` for 0.5%
	pub slippage_percent: f64,
	pub src_chain_id: u64,
	pub dst_chain_id: u64,
	pub input_token: Token,
	pub output_token: Token,
	pub sender: String,
	pub recipient: String,
	/// Input amount in the input token's smallest unit
	pub amount: U256,
}

impl QuoteRequest {
	/// Canonical slippage in basis points
	pub fn slippage(&self) -> SlippageBps {
		SlippageBps::from_percent(self.slippage_percent)
	}

	/// Validate the request before it is fanned out to adapters
	///
	/// Checks field presence and shape only. Whether a route is actually
	/// supported is for each adapter to decide.
	pub fn validate(&self) -> QuoteValidationResult<()> {
		if self.src_chain_id == 0 {
			return Err(QuoteValidationError::InvalidChainId {
				field: "srcChainId".to_string(),
				chain_id: self.src_chain_id,
			});
		}
		if self.dst_chain_id == 0 {
			return Err(QuoteValidationError::InvalidChainId {
				field: "dstChainId".to_string(),
				chain_id: self.dst_chain_id,
			});
		}

		validate_token("inputToken", &self.input_token, self.src_chain_id)?;
		validate_token("outputToken", &self.output_token, self.dst_chain_id)?;

		if self.sender.trim().is_empty() {
			return Err(QuoteValidationError::MissingRequiredField {
				field: "sender".to_string(),
			});
		}
		if !is_evm_address(&self.sender) {
			return Err(QuoteValidationError::InvalidAddress {
				field: "sender".to_string(),
				address: self.sender.clone(),
			});
		}
		// non-EVM destinations (Solana, Tron, ...) are allowed, so only presence is checked
		if self.recipient.trim().is_empty() {
			return Err(QuoteValidationError::MissingRequiredField {
				field: "recipient".to_string(),
			});
		}

		self.amount
			.validate()
			.map_err(|reason| QuoteValidationError::InvalidAmount {
				field: "amount".to_string(),
				reason,
			})?;
		if self.amount.is_zero() {
			return Err(QuoteValidationError::InvalidAmount {
				field: "amount".to_string(),
				reason: "amount must be greater than zero".to_string(),
			});
		}

		if !self.slippage_percent.is_finite()
			|| self.slippage_percent <= 0.0
			|| self.slippage_percent > MAX_SLIPPAGE_PERCENT
		{
			return Err(QuoteValidationError::InvalidSlippage {
				value: self.slippage_percent,
				max: MAX_SLIPPAGE_PERCENT,
			});
		}

		Ok(())
	}
}

fn validate_token(field: &str, token: &Token, chain_id: u64) -> QuoteValidationResult<()> {
	if token.address.trim().is_empty() {
		return Err(QuoteValidationError::MissingRequiredField {
			field: format!("{}.address", field),
		});
	}
	if token.chain_id != chain_id {
		return Err(QuoteValidationError::InvalidChainId {
			field: format!("{}.chainId", field),
			chain_id: token.chain_id,
		});
	}
	Ok(())
}
