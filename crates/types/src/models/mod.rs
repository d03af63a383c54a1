//! Value types shared by requests, quotes and adapters

pub mod secret_string;
pub mod slippage;
pub mod token;
pub mod u256;

pub use secret_string::SecretString;
pub use slippage::SlippageBps;
pub use token::{is_evm_address, normalize_address, Token, NATIVE_TOKEN_ADDRESS};
pub use u256::U256;
