//! Centralized mocks and fixtures for integration tests

pub mod adapters;
pub mod api_fixtures;
pub mod test_server;

#[allow(unused_imports)]
pub use adapters::{mock_token_list, TimingControlledAdapter};
#[allow(unused_imports)]
pub use api_fixtures::ApiFixtures;
#[allow(unused_imports)]
pub use test_server::TestServer;
