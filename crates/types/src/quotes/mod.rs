//! Quote request and response models

pub mod errors;
pub mod request;
pub mod response;

pub use errors::QuoteValidationError;
pub use request::{QuoteRequest, MAX_SLIPPAGE_PERCENT};
pub use response::{Quote, RankedQuote, TxRequest};

/// Result type for quote validation operations
pub type QuoteValidationResult<T> = Result<T, QuoteValidationError>;
