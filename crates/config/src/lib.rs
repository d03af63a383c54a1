//! Bridge Configuration
//!
//! Configuration management and startup utilities for the bridge quote aggregator.

pub mod configurable_value;
pub mod loader;
pub mod settings;
pub mod startup_logger;

pub use configurable_value::{ConfigurableValue, ConfigurableValueError, ValueType};
pub use loader::{load_config, load_config_from, load_validated_config, ConfigLoadError};
pub use settings::{
	AdapterSettings, AggregationSettings, ConfigValidationError, LogFormat, LoggingSettings,
	ServerSettings, Settings, SettlementSettings, StorageBackend, StorageSettings,
	TokenListSettings,
};
pub use startup_logger::{
	log_service_info, log_service_shutdown, log_settings_summary, log_startup_complete,
};
