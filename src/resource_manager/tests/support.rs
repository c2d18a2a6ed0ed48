//! Shared fixtures for resource manager unit tests.

use crate::resource_manager::{
    adapters::memory::InMemoryResourceRegistry,
    domain::{
        ADDRESS_PARAM, BrokerResource, NAME_PARAM, ResourceId, ResourceMetadata, ResourceParams,
        ResourceStatus, TransportSecurityConfig,
    },
    ports::ResourceBroker,
    services::DirectConnectManager,
};
use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use parking_lot::Mutex;
use std::sync::Arc;

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn at(seconds: i64) -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(timestamp(seconds)),
        })
    }

    pub fn set(&self, seconds: i64) {
        *self.now.lock() = timestamp(seconds);
    }
}

impl Clock for ManualClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

pub fn timestamp(seconds: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(seconds, 0)
        .single()
        .expect("timestamp should be valid")
}

pub fn manager<B: ResourceBroker>(
    broker: Arc<B>,
    clock: Arc<ManualClock>,
) -> DirectConnectManager<B, ManualClock> {
    DirectConnectManager::new(broker, Arc::new(TransportSecurityConfig::default()), clock)
}

pub fn node_params(name: &str, address: &str) -> ResourceParams {
    ResourceParams::new()
        .with(NAME_PARAM, name)
        .with(ADDRESS_PARAM, address)
}

pub fn broker_resource(id: &str, status: ResourceStatus) -> BrokerResource {
    BrokerResource {
        id: ResourceId::new(id),
        name: format!("{id}-name"),
        address: Some("10.0.0.5".to_owned()),
        status,
    }
}

pub fn seeded_registry(ids: &[&str]) -> InMemoryResourceRegistry {
    let registry = InMemoryResourceRegistry::new();
    for id in ids {
        registry.set(
            ResourceId::new(*id),
            ResourceMetadata::new("seeded", "10.0.0.5"),
        );
    }
    registry
}
