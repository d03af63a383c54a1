//! Minimal ERC-20 calldata encoding and decoding

use alloy_primitives::{Address, U256 as RawU256};
use bridge_types::{AdapterError, AdapterResult, U256};
use std::str::FromStr;

/// `transfer(address,uint256)`
pub const TRANSFER_SELECTOR: [u8; 4] = [0xa9, 0x05, 0x9c, 0xbb];
/// `approve(address,uint256)`
pub const APPROVE_SELECTOR: [u8; 4] = [0x09, 0x5e, 0xa7, 0xb3];

/// Encode `transfer(to, amount)` as `0x`-prefixed hex calldata
pub fn encode_transfer(to: &str, amount: &U256) -> AdapterResult<String> {
	let recipient = Address::from_str(to).map_err(|e| AdapterError::InvalidResponse {
		reason: format!("invalid transfer recipient '{}': {}", to, e),
	})?;
	let amount = amount
		.to_raw()
		.map_err(|reason| AdapterError::InvalidResponse { reason })?;

	let mut calldata = Vec::with_capacity(4 + 64);
	calldata.extend_from_slice(&TRANSFER_SELECTOR);
	calldata.extend_from_slice(&[0u8; 12]);
	calldata.extend_from_slice(recipient.as_slice());
	calldata.extend_from_slice(&amount.to_be_bytes::<32>());
	Ok(format!("0x{}", hex::encode(calldata)))
}

/// Decoded `approve` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApproveCall {
	pub spender: String,
	pub amount: U256,
}

/// Decode `approve(spender, amount)` calldata, `None` for any other call
pub fn decode_approve(calldata: &str) -> Option<ApproveCall> {
	let bytes = hex::decode(calldata.trim().trim_start_matches("0x")).ok()?;
	if bytes.len() < 4 + 64 || bytes[..4] != APPROVE_SELECTOR {
		return None;
	}

	let spender_word = &bytes[4..36];
	if spender_word[..12].iter().any(|b| *b != 0) {
		return None;
	}
	let spender = Address::from_slice(&spender_word[12..]);
	let amount = RawU256::from_be_slice(&bytes[36..68]);

	Some(ApproveCall {
		spender: spender.to_checksum(None),
		amount: U256::from(amount),
	})
}
