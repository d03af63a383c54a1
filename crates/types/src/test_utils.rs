//! Fixtures shared by unit and integration tests

use crate::models::{Token, U256};
use crate::quotes::{Quote, QuoteRequest, TxRequest};

pub const TEST_SENDER: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
pub const USDC_ETHEREUM: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";
pub const USDC_ARBITRUM: &str = "0xaf88d065e77c8cC2239327C5EDb3A432268e5831";

/// 1 USDC from Ethereum to Arbitrum
pub fn sample_request() -> QuoteRequest {
	QuoteRequest {
		slippage_percent: 0.5,
		src_chain_id: 1,
		dst_chain_id: 42161,
		input_token: Token::new(1, "USDC", USDC_ETHEREUM, 6),
		output_token: Token::new(42161, "USDC", USDC_ARBITRUM, 6),
		sender: TEST_SENDER.to_string(),
		recipient: TEST_SENDER.to_string(),
		amount: U256::from(1_000_000u64),
	}
}

/// 0.1 ETH from Ethereum to native ETH on Base
pub fn sample_native_request() -> QuoteRequest {
	QuoteRequest {
		slippage_percent: 1.0,
		src_chain_id: 1,
		dst_chain_id: 8453,
		input_token: Token::native(1, "ETH", 18),
		output_token: Token::native(8453, "ETH", 18),
		sender: TEST_SENDER.to_string(),
		recipient: TEST_SENDER.to_string(),
		amount: U256::from(100_000_000_000_000_000u64),
	}
}

/// Minimal quote for `adapter_id` with the given output amount and gas
pub fn sample_quote(adapter_id: &str, estimated_amount: &str, gas_estimate: &str) -> Quote {
	Quote {
		adapter_id: adapter_id.to_string(),
		token_spender_address: None,
		estimated_time: 60,
		estimated_amount: U256::new(estimated_amount),
		gas_estimate: U256::new(gas_estimate),
		tx_request: TxRequest {
			to: "0x5c7BCd6E7De5423a257D81B442095A1a6ced35C5".to_string(),
			data: "0x".to_string(),
			value: None,
		},
		extra_data: None,
	}
}
