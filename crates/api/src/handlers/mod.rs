pub mod adapters;
pub mod common;
pub mod health;
pub mod quotes;
pub mod settlements;

pub use adapters::{get_adapter_tokens, get_adapters, post_refresh_token_lists};
pub use health::health;
pub use quotes::post_quotes;
pub use settlements::post_settlements;
