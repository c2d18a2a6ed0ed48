//! Configuration for the direct-connect resource manager.
//!
//! Settings are read from an optional file and overridden by environment
//! variables prefixed with `DIRECT_CONNECT_`, using `__` to separate nested
//! keys:
//!
//! ```text
//! DIRECT_CONNECT_KEEPER__INTERVAL_SECS=30
//! DIRECT_CONNECT_KEEPER__RECONNECT_ATTEMPTS=5
//! DIRECT_CONNECT_TRANSPORT__CA_CERTIFICATE=/etc/cluster/ca.pem
//! ```

mod error;

pub use error::{ConfigError, ConfigResult};

use crate::resource_manager::{domain::TransportSecurityConfig, services::ReconnectPolicy};
use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Prefix of environment variable overrides.
pub const ENV_PREFIX: &str = "DIRECT_CONNECT";

/// Top-level resource manager configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Keeper scheduling and reconnect settings.
    pub keeper: KeeperConfig,
    /// Transport-security material handed to the broker on connect.
    pub transport: TransportSecurityConfig,
    /// `tracing-subscriber` filter directive.
    pub log_filter: LogFilter,
}

/// Filter directive used when initialising logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogFilter(pub String);

impl Default for LogFilter {
    fn default() -> Self {
        Self("info".to_owned())
    }
}

impl LogFilter {
    /// Returns the directive.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Keeper settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeeperConfig {
    /// Seconds between keeper passes.
    pub interval_secs: u64,
    /// Reconnect attempts per unhealthy resource and pass; zero disables
    /// reconnecting.
    pub reconnect_attempts: u32,
    /// Milliseconds between reconnect attempts.
    pub reconnect_backoff_ms: u64,
    /// Milliseconds allowed for each broker call.
    pub broker_call_timeout_ms: u64,
}

impl Default for KeeperConfig {
    fn default() -> Self {
        Self {
            interval_secs: 60,
            reconnect_attempts: 3,
            reconnect_backoff_ms: 500,
            broker_call_timeout_ms: 5_000,
        }
    }
}

impl KeeperConfig {
    /// Returns the interval between keeper passes.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Returns the per-call broker timeout.
    #[must_use]
    pub const fn broker_call_timeout(&self) -> Duration {
        Duration::from_millis(self.broker_call_timeout_ms)
    }

    /// Returns the reconnect policy these settings describe.
    #[must_use]
    pub const fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy::new(
            self.reconnect_attempts,
            Duration::from_millis(self.reconnect_backoff_ms),
        )
    }
}

impl ManagerConfig {
    /// Loads configuration from `path` (when given and present) and
    /// `DIRECT_CONNECT_*` environment variables, then validates it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] when a source cannot be read or
    /// deserialised and [`ConfigError::Invalid`] when validation fails.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        Self::load_with(path, Self::environment())
    }

    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    fn load_with(path: Option<&Path>, environment: Environment) -> ConfigResult<Self> {
        let mut builder = Config::builder();
        if let Some(file) = path {
            debug!(path = %file.display(), "reading resource manager configuration file");
            builder = builder.add_source(File::from(file).required(false));
        }
        let loaded: Self = builder
            .add_source(environment)
            .build()?
            .try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Checks invariants serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending setting.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.keeper.interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "keeper.interval_secs must be greater than zero".to_owned(),
            ));
        }
        if self.keeper.broker_call_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "keeper.broker_call_timeout_ms must be greater than zero".to_owned(),
            ));
        }
        if self.transport.certificate.is_some() != self.transport.private_key.is_some() {
            return Err(ConfigError::Invalid(
                "transport.certificate and transport.private_key must be set together".to_owned(),
            ));
        }
        Ok(())
    }
}
