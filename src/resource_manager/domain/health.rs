//! Connection health as observed by the keeper.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Locally tracked connection health of a managed resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceHealth {
    /// No keeper pass has inspected the resource yet.
    #[default]
    Unknown,
    /// The last health check or reconnect succeeded.
    Connected,
    /// The last health check failed and no reconnect has succeeded since.
    Unreachable,
    /// Every reconnect attempt of the last pass failed.
    Degraded,
}

impl ResourceHealth {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Connected => "connected",
            Self::Unreachable => "unreachable",
            Self::Degraded => "degraded",
        }
    }

    /// Returns whether the resource is currently believed reachable.
    #[must_use]
    pub const fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl fmt::Display for ResourceHealth {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
