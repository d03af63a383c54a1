//! Bridge API
//!
//! Axum routes exposing the quote aggregation engine over HTTP.

pub mod handlers;
pub mod models;
pub mod router;
pub mod state;

pub use handlers::common::ErrorResponse;
pub use router::create_router;
pub use state::AppState;
