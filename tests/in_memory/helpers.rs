//! Shared test helpers for in-memory resource manager integration tests.

use chrono::{DateTime, Local, TimeZone, Utc};
use direct_connect::{
    config::ManagerConfig,
    resource_manager::{
        adapters::memory::InMemoryResourceBroker,
        domain::{ADDRESS_PARAM, NAME_PARAM, ResourceParams, TransportSecurityConfig},
        services::{DirectConnectManager, ReconnectPolicy, ResourceManager, setup},
    },
};
use eyre::eyre;
use mockable::Clock;
use parking_lot::Mutex;
use rstest::fixture;
use std::sync::Arc;
use std::time::Duration;

/// Clock advanced explicitly by tests.
#[derive(Debug)]
pub struct SteppedClock {
    now: Mutex<DateTime<Utc>>,
}

impl SteppedClock {
    /// Creates a clock reading `seconds` after the Unix epoch.
    ///
    /// # Errors
    ///
    /// Returns an error when `seconds` is out of range.
    pub fn starting_at(seconds: i64) -> eyre::Result<Arc<Self>> {
        Ok(Arc::new(Self {
            now: Mutex::new(at(seconds)?),
        }))
    }

    /// Moves the clock to `seconds` after the Unix epoch.
    ///
    /// # Errors
    ///
    /// Returns an error when `seconds` is out of range.
    pub fn set(&self, seconds: i64) -> eyre::Result<()> {
        *self.now.lock() = at(seconds)?;
        Ok(())
    }
}

impl Clock for SteppedClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Returns the UTC instant `seconds` after the Unix epoch.
///
/// # Errors
///
/// Returns an error when `seconds` is out of range.
pub fn at(seconds: i64) -> eyre::Result<DateTime<Utc>> {
    Utc.timestamp_opt(seconds, 0)
        .single()
        .ok_or_else(|| eyre!("timestamp {seconds} out of range"))
}

/// Manager wired to an in-memory broker and a stepped clock.
pub type SteppedManager = DirectConnectManager<InMemoryResourceBroker, SteppedClock>;

/// Manager, broker and clock for keeper scenarios.
pub struct KeeperRig {
    /// Broker shared with the manager.
    pub broker: Arc<InMemoryResourceBroker>,
    /// Clock shared with the manager.
    pub clock: Arc<SteppedClock>,
    /// Manager under test.
    pub manager: SteppedManager,
}

/// Builds a keeper rig reconnecting up to three times without backoff.
///
/// # Errors
///
/// Returns an error when the clock cannot be created.
pub fn keeper_rig() -> eyre::Result<KeeperRig> {
    let broker = Arc::new(InMemoryResourceBroker::new());
    let clock = SteppedClock::starting_at(0)?;
    let manager = DirectConnectManager::new(
        Arc::clone(&broker),
        Arc::new(TransportSecurityConfig::default()),
        Arc::clone(&clock),
    )
    .with_reconnect_policy(ReconnectPolicy::new(3, Duration::ZERO));
    Ok(KeeperRig {
        broker,
        clock,
        manager,
    })
}

/// Provides a fresh in-memory broker for each test.
#[fixture]
pub fn broker() -> Arc<InMemoryResourceBroker> {
    Arc::new(InMemoryResourceBroker::new())
}

/// Builds the host-facing manager the way a host would.
pub fn host_manager(broker: &Arc<InMemoryResourceBroker>) -> Arc<dyn ResourceManager> {
    setup(Arc::clone(broker), &ManagerConfig::default())
}

/// Returns add parameters for a node.
pub fn node(name: &str, address: &str) -> ResourceParams {
    ResourceParams::new()
        .with(NAME_PARAM, name)
        .with(ADDRESS_PARAM, address)
}
