//! Locally owned per-resource metadata.

use super::ResourceHealth;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata the resource manager keeps for each resource it added.
///
/// `notes` and `address` come from host parameters; an update rebuilds the
/// whole entry from them. The health fields are maintained by the keeper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceMetadata {
    notes: String,
    address: String,
    last_good_check: Option<DateTime<Utc>>,
    health: ResourceHealth,
    consecutive_failures: u32,
}

impl ResourceMetadata {
    /// Creates metadata for a freshly connected resource that has never been
    /// checked.
    #[must_use]
    pub fn new(notes: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            notes: notes.into(),
            address: address.into(),
            last_good_check: None,
            health: ResourceHealth::Unknown,
            consecutive_failures: 0,
        }
    }

    /// Returns the operator notes.
    #[must_use]
    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Returns the address the resource was connected at.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Returns when a health check last succeeded, if ever.
    #[must_use]
    pub const fn last_good_check(&self) -> Option<DateTime<Utc>> {
        self.last_good_check
    }

    /// Returns the locally tracked health.
    #[must_use]
    pub const fn health(&self) -> ResourceHealth {
        self.health
    }

    /// Returns the number of failed health checks since the last good one.
    #[must_use]
    pub const fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Records a successful health check at `checked_at`.
    pub const fn record_healthy_check(&mut self, checked_at: DateTime<Utc>) {
        self.last_good_check = Some(checked_at);
        self.health = ResourceHealth::Connected;
        self.consecutive_failures = 0;
    }

    /// Records a failed health check. `last_good_check` is left untouched.
    pub const fn record_failed_check(&mut self) {
        self.health = ResourceHealth::Unreachable;
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
    }

    /// Records a successful reconnect following a failed check.
    ///
    /// Only a health check advances `last_good_check`, so the timestamp stays
    /// where it was until the next pass confirms the connection.
    pub const fn record_reconnected(&mut self) {
        self.health = ResourceHealth::Connected;
    }

    /// Records that every reconnect attempt failed.
    pub const fn mark_degraded(&mut self) {
        self.health = ResourceHealth::Degraded;
    }

    /// Copies the keeper-owned fields of `observed` into `self`, leaving the
    /// host-owned notes untouched.
    pub fn apply_health_from(&mut self, observed: &Self) {
        self.last_good_check = observed.last_good_check;
        self.health = observed.health;
        self.consecutive_failures = observed.consecutive_failures;
    }
}
