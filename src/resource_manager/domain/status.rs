//! Broker-side resource status and host-requested status changes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a resource as reported by the broker.
///
/// The broker owns this vocabulary. Values outside the known set are carried
/// verbatim in [`ResourceStatus::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceStatus {
    /// The resource is connected and accepting work.
    Running,
    /// The resource is connected but not accepting work.
    Paused,
    /// The resource is registered but has no live connection.
    Disconnected,
    /// Any other broker-defined status.
    Other(String),
}

impl ResourceStatus {
    /// Returns the canonical string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Disconnected => "disconnected",
            Self::Other(value) => value,
        }
    }

    /// Returns whether the resource is paused.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        matches!(self, Self::Paused)
    }
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl From<&str> for ResourceStatus {
    fn from(value: &str) -> Self {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "running" => Self::Running,
            "paused" => Self::Paused,
            "disconnected" => Self::Disconnected,
            _ => Self::Other(value.to_owned()),
        }
    }
}

/// Status change requested by the host through an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestedStatus {
    /// Resume a paused resource.
    Resume,
    /// Pause a running resource.
    Pause,
    /// A value with no broker operation attached; updates ignore it.
    Unrecognized(String),
}

impl RequestedStatus {
    /// Parses a host status string. Matching is trimmed and case-insensitive.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "resume" => Self::Resume,
            "pause" => Self::Pause,
            _ => Self::Unrecognized(value.to_owned()),
        }
    }

    /// Returns whether `current` already reflects this request, in which
    /// case no broker call is needed.
    #[must_use]
    pub fn is_satisfied_by(&self, current: &ResourceStatus) -> bool {
        match self {
            Self::Resume => matches!(current, ResourceStatus::Running),
            Self::Pause => matches!(current, ResourceStatus::Paused),
            Self::Unrecognized(value) => current.as_str() == value.as_str(),
        }
    }
}

impl fmt::Display for RequestedStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resume => formatter.write_str("resume"),
            Self::Pause => formatter.write_str("pause"),
            Self::Unrecognized(value) => formatter.write_str(value),
        }
    }
}
