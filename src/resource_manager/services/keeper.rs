//! Keeper pass results, reconnect policy and the periodic scheduler.

use super::plugin::ResourceManager;
use crate::resource_manager::{domain::ResourceId, ports::BrokerError};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{Instrument, debug, error, info, info_span};

/// Smallest interval the scheduler accepts.
const MIN_KEEPER_INTERVAL: Duration = Duration::from_millis(10);

/// Bounded reconnect attempts made when a health check fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    max_attempts: u32,
    backoff: Duration,
}

impl ReconnectPolicy {
    /// Creates a policy making up to `max_attempts` attempts, sleeping
    /// `backoff` between consecutive attempts.
    #[must_use]
    pub const fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }

    /// A policy that never reconnects; failed checks only mark the resource
    /// unreachable.
    #[must_use]
    pub const fn disabled() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Returns the maximum number of attempts per pass.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the pause between attempts.
    #[must_use]
    pub const fn backoff(&self) -> Duration {
        self.backoff
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::disabled()
    }
}

/// Problem recorded for one resource during a keeper pass.
#[derive(Debug, Clone)]
pub enum KeeperIssue {
    /// The registry holds a resource the broker no longer knows. The entry
    /// is left in place.
    MissingFromBroker(ResourceId),
    /// The broker lookup failed.
    LookupFailed {
        /// Resource identifier.
        id: ResourceId,
        /// Broker failure.
        error: BrokerError,
    },
    /// Every reconnect attempt failed and the resource is now degraded.
    ReconnectFailed {
        /// Resource identifier.
        id: ResourceId,
        /// Attempts made.
        attempts: u32,
    },
    /// The resource was deleted while the pass was checking it.
    Vanished(ResourceId),
}

impl KeeperIssue {
    /// Returns the resource the issue concerns.
    #[must_use]
    pub const fn resource_id(&self) -> &ResourceId {
        match self {
            Self::MissingFromBroker(id)
            | Self::Vanished(id)
            | Self::LookupFailed { id, .. }
            | Self::ReconnectFailed { id, .. } => id,
        }
    }
}

/// Result of keeping a single resource.
#[derive(Debug, Clone)]
pub enum KeeperOutcome {
    /// The connection was healthy.
    Healthy,
    /// The connection was unhealthy and no reconnect was attempted.
    Unhealthy,
    /// The connection was unhealthy and a reconnect succeeded.
    Reconnected {
        /// Attempt that succeeded.
        attempts: u32,
    },
    /// The resource could not be kept.
    Issue(KeeperIssue),
}

/// Summary of one keeper pass.
#[derive(Debug, Clone)]
pub struct KeeperReport {
    started_at: DateTime<Utc>,
    processed: usize,
    healthy: usize,
    unhealthy: usize,
    reconnected: usize,
    issues: Vec<KeeperIssue>,
}

impl KeeperReport {
    pub(crate) const fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            processed: 0,
            healthy: 0,
            unhealthy: 0,
            reconnected: 0,
            issues: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, outcome: KeeperOutcome) {
        self.processed += 1;
        match outcome {
            KeeperOutcome::Healthy => self.healthy += 1,
            KeeperOutcome::Unhealthy => self.unhealthy += 1,
            KeeperOutcome::Reconnected { .. } => self.reconnected += 1,
            KeeperOutcome::Issue(issue) => self.issues.push(issue),
        }
    }

    /// Returns when the pass started.
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Returns how many registry entries the pass visited.
    #[must_use]
    pub const fn processed(&self) -> usize {
        self.processed
    }

    /// Returns how many resources passed their health check.
    #[must_use]
    pub const fn healthy(&self) -> usize {
        self.healthy
    }

    /// Returns how many resources failed their health check without a
    /// reconnect attempt.
    #[must_use]
    pub const fn unhealthy(&self) -> usize {
        self.unhealthy
    }

    /// Returns how many resources were reconnected.
    #[must_use]
    pub const fn reconnected(&self) -> usize {
        self.reconnected
    }

    /// Returns the recorded issues.
    #[must_use]
    pub fn issues(&self) -> &[KeeperIssue] {
        &self.issues
    }

    /// Returns whether the pass recorded no issues.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Handle to a running keeper task.
#[derive(Debug)]
pub struct KeeperHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl KeeperHandle {
    /// Returns whether the keeper task has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Signals the keeper to stop and waits for the task to exit. A pass in
    /// progress runs to completion first.
    pub async fn shutdown(self) {
        if self.shutdown.send(true).is_err() {
            debug!("keeper task already stopped");
        }
        if let Err(err) = self.task.await {
            error!(error = %err, "keeper task ended abnormally");
        }
    }
}

/// Spawns a task that calls [`ResourceManager::keep`] every `every`.
///
/// Ticks that fall due while a pass is running are skipped rather than
/// queued, so passes never overlap. Intervals shorter than 10ms are raised
/// to 10ms.
pub fn spawn_keeper<M>(manager: Arc<M>, every: Duration) -> KeeperHandle
where
    M: ResourceManager + ?Sized + 'static,
{
    let period = every.max(MIN_KEEPER_INTERVAL);
    let (shutdown, mut stop) = watch::channel(false);
    let span = info_span!("resource_keeper", system = manager.system_name());

    let task = tokio::spawn(
        async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            info!(interval = ?period, "starting resource keeper");

            loop {
                tokio::select! {
                    _ = ticker.tick() => manager.keep().await,
                    changed = stop.changed() => {
                        if changed.is_err() || *stop.borrow() {
                            break;
                        }
                    }
                }
            }

            info!("resource keeper stopped");
        }
        .instrument(span),
    );

    KeeperHandle { shutdown, task }
}
