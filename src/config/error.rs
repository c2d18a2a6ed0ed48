//! Configuration error types.

use thiserror::Error;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors returned while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration source could not be read or deserialised.
    #[error("failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    /// The configuration was read but is not usable.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
