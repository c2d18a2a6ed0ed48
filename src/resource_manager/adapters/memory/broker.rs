//! In-memory broker adapter for resource manager tests and simulations.

use crate::resource_manager::{
    domain::{BrokerResource, ResourceId, ResourceStatus, TransportSecurityConfig},
    ports::{BrokerError, BrokerOperation, BrokerResult, ResourceBroker},
};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

/// In-memory broker adapter.
///
/// This adapter models resource registration, connections and pause/resume
/// without any network traffic. Failure knobs let tests drop connections,
/// refuse addresses and make individual operations fail. Every call is
/// counted per [`BrokerOperation`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryResourceBroker {
    state: Arc<RwLock<InMemoryBrokerState>>,
}

#[derive(Debug, Default)]
struct InMemoryBrokerState {
    resources: HashMap<ResourceId, BrokerResource>,
    dropped_connections: HashSet<ResourceId>,
    unreachable_addresses: HashSet<String>,
    failing_operations: HashSet<BrokerOperation>,
    calls: HashMap<BrokerOperation, usize>,
}

impl InMemoryBrokerState {
    fn record(&mut self, operation: BrokerOperation) -> BrokerResult<()> {
        *self.calls.entry(operation).or_default() += 1;
        if self.failing_operations.contains(&operation) {
            return Err(BrokerError::rejected(operation, "injected failure"));
        }
        Ok(())
    }

    fn resource_mut(
        &mut self,
        operation: BrokerOperation,
        id: &ResourceId,
    ) -> BrokerResult<&mut BrokerResource> {
        self.resources
            .get_mut(id)
            .ok_or_else(|| BrokerError::rejected(operation, format!("unknown resource {id}")))
    }

    fn is_healthy(&self, resource: &BrokerResource) -> bool {
        let Some(stored) = self.resources.get(&resource.id) else {
            return false;
        };
        let Some(address) = stored.address.as_deref() else {
            return false;
        };
        stored.status != ResourceStatus::Disconnected
            && !self.dropped_connections.contains(&stored.id)
            && !self.unreachable_addresses.contains(address)
    }
}

impl InMemoryResourceBroker {
    /// Creates an empty in-memory broker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops the live connection of a resource. Health checks fail until the
    /// resource is reconnected.
    pub fn drop_connection(&self, id: &ResourceId) {
        self.state.write().dropped_connections.insert(id.clone());
    }

    /// Marks an address as refusing connections. Resources connected at an
    /// unreachable address fail health checks and cannot be reconnected.
    pub fn set_address_reachable(&self, address: &str, reachable: bool) {
        let mut state = self.state.write();
        if reachable {
            state.unreachable_addresses.remove(address);
        } else {
            state.unreachable_addresses.insert(address.to_owned());
        }
    }

    /// Makes every subsequent call of `operation` fail until restored.
    pub fn fail_operation(&self, operation: BrokerOperation) {
        self.state.write().failing_operations.insert(operation);
    }

    /// Clears an injected failure for `operation`.
    pub fn restore_operation(&self, operation: BrokerOperation) {
        self.state.write().failing_operations.remove(&operation);
    }

    /// Removes a resource behind the resource manager's back.
    pub fn forget_resource(&self, id: &ResourceId) {
        self.state.write().resources.remove(id);
    }

    /// Returns how many times `operation` was called.
    #[must_use]
    pub fn call_count(&self, operation: BrokerOperation) -> usize {
        self.state.read().calls.get(&operation).copied().unwrap_or_default()
    }

    /// Returns the number of resources the broker knows.
    #[must_use]
    pub fn resource_count(&self) -> usize {
        self.state.read().resources.len()
    }
}

#[async_trait]
impl ResourceBroker for InMemoryResourceBroker {
    async fn add_resource(&self, name: &str) -> BrokerResult<ResourceId> {
        let mut state = self.state.write();
        state.record(BrokerOperation::Add)?;
        let id = ResourceId::new(Uuid::new_v4().to_string());
        state.resources.insert(
            id.clone(),
            BrokerResource {
                id: id.clone(),
                name: name.to_owned(),
                address: None,
                status: ResourceStatus::Disconnected,
            },
        );
        Ok(id)
    }

    async fn remove_resource(&self, id: &ResourceId) -> BrokerResult<()> {
        let mut state = self.state.write();
        state.record(BrokerOperation::Remove)?;
        state
            .resources
            .remove(id)
            .ok_or_else(|| BrokerError::rejected(BrokerOperation::Remove, "unknown resource"))?;
        state.dropped_connections.remove(id);
        Ok(())
    }

    async fn connect_resource(
        &self,
        id: &ResourceId,
        address: &str,
        _transport: &TransportSecurityConfig,
    ) -> BrokerResult<()> {
        let mut state = self.state.write();
        state.record(BrokerOperation::Connect)?;
        if state.unreachable_addresses.contains(address) {
            return Err(BrokerError::rejected(
                BrokerOperation::Connect,
                format!("connection refused by {address}"),
            ));
        }
        let resource = state.resource_mut(BrokerOperation::Connect, id)?;
        resource.address = Some(address.to_owned());
        if !resource.status.is_paused() {
            resource.status = ResourceStatus::Running;
        }
        state.dropped_connections.remove(id);
        Ok(())
    }

    async fn get_resource(&self, id: &ResourceId) -> BrokerResult<Option<BrokerResource>> {
        let mut state = self.state.write();
        state.record(BrokerOperation::Get)?;
        Ok(state.resources.get(id).cloned())
    }

    async fn pause_resource(&self, id: &ResourceId) -> BrokerResult<()> {
        let mut state = self.state.write();
        state.record(BrokerOperation::Pause)?;
        state.resource_mut(BrokerOperation::Pause, id)?.status = ResourceStatus::Paused;
        Ok(())
    }

    async fn resume_resource(&self, id: &ResourceId) -> BrokerResult<()> {
        let mut state = self.state.write();
        state.record(BrokerOperation::Resume)?;
        state.resource_mut(BrokerOperation::Resume, id)?.status = ResourceStatus::Running;
        Ok(())
    }

    async fn check_resource_connection_status(&self, resource: &BrokerResource) -> bool {
        let mut state = self.state.write();
        if state.record(BrokerOperation::CheckStatus).is_err() {
            return false;
        }
        state.is_healthy(resource)
    }
}
