//! Structured logging setup.
//!
//! The resource manager logs through `tracing` under the span it was built
//! with; this module installs a global subscriber for binaries that do not
//! bring their own.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable that overrides the configured filter.
pub const LOG_FILTER_ENV: &str = "DIRECT_CONNECT_LOG";

/// Installs a console subscriber filtered by `RUST_LOG`-style `directive`.
///
/// The `DIRECT_CONNECT_LOG` environment variable takes precedence over
/// `directive`, and an unparsable directive falls back to `info`. Returns
/// `false` when a global subscriber was already installed, in which case the
/// existing one keeps receiving events.
pub fn init_tracing(directive: &str) -> bool {
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .or_else(|_| EnvFilter::try_new(directive))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true),
        )
        .with(filter)
        .try_init()
        .is_ok();

    if !installed {
        tracing::debug!("global tracing subscriber already initialised, keeping it");
    }
    installed
}
