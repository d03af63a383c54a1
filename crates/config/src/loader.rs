//! Configuration loading utilities
//!
//! Sources, later ones winning:
//! 1. `config/config.{toml,json,yaml}` (optional)
//! 2. `BRIDGE__`-prefixed environment variables, `__` between sections,
//!    e.g. `BRIDGE__AGGREGATION__TIMEOUT_MS=5000`

use crate::settings::{ConfigValidationError, Settings};
use config::{Config, ConfigError, Environment, File};
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "config/config";
pub const ENV_PREFIX: &str = "BRIDGE";

#[derive(Debug, Error)]
pub enum ConfigLoadError {
	#[error("Failed to load configuration: {0}")]
	Config(#[from] ConfigError),

	#[error("Invalid configuration: {0}")]
	Validation(#[from] ConfigValidationError),
}

/// Load configuration from the default file and the environment
pub fn load_config() -> Result<Settings, ConfigLoadError> {
	load_config_from(DEFAULT_CONFIG_PATH)
}

/// Load configuration from `path` (extension optional) and the environment
pub fn load_config_from(path: impl AsRef<Path>) -> Result<Settings, ConfigLoadError> {
	let s = Config::builder()
		.add_source(File::from(path.as_ref()).required(false))
		.add_source(
			Environment::with_prefix(ENV_PREFIX)
				.prefix_separator("__")
				.separator("__")
				.try_parsing(true),
		)
		.build()?;

	Ok(s.try_deserialize()?)
}

/// Load and validate against the adapters this build can construct
pub fn load_validated_config(known_adapters: &[&str]) -> Result<Settings, ConfigLoadError> {
	let settings = load_config()?;
	settings.validate(known_adapters)?;
	Ok(settings)
}
