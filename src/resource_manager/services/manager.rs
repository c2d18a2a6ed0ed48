//! Resource manager facade and keeper pass.

use super::keeper::{KeeperIssue, KeeperOutcome, KeeperReport, ReconnectPolicy};
use crate::resource_manager::{
    adapters::memory::InMemoryResourceRegistry,
    domain::{
        AddResourceRequest, BrokerResource, ManagedResource, RequestedStatus, ResourceId,
        ResourceMetadata, ResourceParams, ResourceParamsError, TransportSecurityConfig,
    },
    ports::{BrokerError, ResourceBroker},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{Instrument, Span, debug, debug_span, error, info, info_span, warn};

/// Service-level errors for resource manager operations.
#[derive(Debug, Error)]
pub enum ResourceManagerError {
    /// Host-supplied parameters failed validation.
    #[error(transparent)]
    Validation(#[from] ResourceParamsError),

    /// The broker does not know the resource.
    #[error("resource {0} not found in the broker")]
    NotFoundInBroker(ResourceId),

    /// The resource manager holds no metadata for the resource.
    #[error("resource {0} could not be found in the direct connect resource manager")]
    NotFoundInRegistry(ResourceId),

    /// A broker call failed.
    #[error(transparent)]
    Broker(#[from] BrokerError),
}

impl ResourceManagerError {
    /// Returns whether the error reports a missing resource on either side.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFoundInBroker(_) | Self::NotFoundInRegistry(_))
    }
}

/// Result type for resource manager operations.
pub type ResourceManagerResult<T> = Result<T, ResourceManagerError>;

/// Resource manager that connects directly to resource servers.
///
/// Facade operations mutate the broker and the local registry together; the
/// keeper pass reads the registry, asks the broker for connection health and
/// writes health back. Broker calls never run while the registry lock is held.
pub struct DirectConnectManager<B, C>
where
    B: ResourceBroker,
    C: Clock + Send + Sync,
{
    registry: InMemoryResourceRegistry,
    broker: Arc<B>,
    transport: Arc<TransportSecurityConfig>,
    clock: Arc<C>,
    reconnect: ReconnectPolicy,
    keeper_gate: Mutex<()>,
    span: Span,
}

impl<B, C> DirectConnectManager<B, C>
where
    B: ResourceBroker,
    C: Clock + Send + Sync,
{
    /// Creates a manager with an empty registry, no reconnect attempts and a
    /// `resource_manager` span as its logger.
    #[must_use]
    pub fn new(broker: Arc<B>, transport: Arc<TransportSecurityConfig>, clock: Arc<C>) -> Self {
        Self {
            registry: InMemoryResourceRegistry::new(),
            broker,
            transport,
            clock,
            reconnect: ReconnectPolicy::disabled(),
            keeper_gate: Mutex::new(()),
            span: info_span!("resource_manager", system = super::plugin::SYSTEM_NAME),
        }
    }

    /// Sets the keeper's reconnect policy.
    #[must_use]
    pub const fn with_reconnect_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.reconnect = policy;
        self
    }

    /// Replaces the span every operation logs under.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Uses `registry` instead of a private one. Clones of a registry share
    /// state, so callers can keep a handle for inspection.
    #[must_use]
    pub fn with_registry(mut self, registry: InMemoryResourceRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Returns the local metadata registry.
    #[must_use]
    pub const fn registry(&self) -> &InMemoryResourceRegistry {
        &self.registry
    }

    /// Returns the keeper's reconnect policy.
    #[must_use]
    pub const fn reconnect_policy(&self) -> ReconnectPolicy {
        self.reconnect
    }

    /// Adds a resource: registers it with the broker, connects it, then
    /// records its metadata locally.
    ///
    /// When the connect fails the broker keeps the registered but
    /// unconnected resource and no local entry is written.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceManagerError::Validation`] when `address` or `name`
    /// is missing (nothing is mutated in that case) and
    /// [`ResourceManagerError::Broker`] when a broker call fails.
    pub async fn add_resource(&self, params: &ResourceParams) -> ResourceManagerResult<ResourceId> {
        let span = debug_span!(parent: &self.span, "add_resource");
        self.add_resource_inner(params).instrument(span).await
    }

    async fn add_resource_inner(&self, params: &ResourceParams) -> ResourceManagerResult<ResourceId> {
        let request = AddResourceRequest::try_from(params)?;
        let id = self.broker.add_resource(&request.name).await?;

        if let Err(err) = self
            .broker
            .connect_resource(&id, &request.address, &self.transport)
            .await
        {
            warn!(
                resource_id = %id,
                address = %request.address,
                error = %err,
                "resource registered with the broker but not connected, no local entry written"
            );
            return Err(err.into());
        }

        info!(
            resource_id = %id,
            name = %request.name,
            address = %request.address,
            "resource added"
        );
        self.registry.set(
            id.clone(),
            ResourceMetadata::new(request.notes, request.address),
        );
        Ok(id)
    }

    /// Removes a resource from the broker, then drops its local metadata.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceManagerError::Broker`] when the broker refuses the
    /// removal; the local entry is kept in that case.
    pub async fn delete_resource(&self, id: &ResourceId) -> ResourceManagerResult<()> {
        let span = debug_span!(parent: &self.span, "delete_resource", resource_id = %id);
        self.delete_resource_inner(id).instrument(span).await
    }

    async fn delete_resource_inner(&self, id: &ResourceId) -> ResourceManagerResult<()> {
        if let Err(err) = self.broker.remove_resource(id).await {
            debug!(error = %err, "unable to remove resource through direct connect manager");
            return Err(err.into());
        }

        if self.registry.delete(id).is_none() {
            debug!("removed resource had no local metadata");
        }
        info!("resource deleted");
        Ok(())
    }

    /// Returns the broker resource merged with its local parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceManagerError::NotFoundInBroker`] or
    /// [`ResourceManagerError::NotFoundInRegistry`] depending on which side
    /// lacks the resource, and [`ResourceManagerError::Broker`] when the
    /// lookup itself fails.
    pub async fn get_resource(&self, id: &ResourceId) -> ResourceManagerResult<ManagedResource> {
        let span = debug_span!(parent: &self.span, "get_resource", resource_id = %id);
        self.get_resource_inner(id).instrument(span).await
    }

    async fn get_resource_inner(&self, id: &ResourceId) -> ResourceManagerResult<ManagedResource> {
        let resource = self
            .broker
            .get_resource(id)
            .await?
            .ok_or_else(|| ResourceManagerError::NotFoundInBroker(id.clone()))?;
        let metadata = self
            .registry
            .get(id)
            .ok_or_else(|| ResourceManagerError::NotFoundInRegistry(id.clone()))?;

        Ok(ManagedResource {
            resource,
            parameters: ResourceParams::from_metadata(&metadata),
        })
    }

    /// Overwrites a resource's metadata with values derived from
    /// `new_params` and applies a status change.
    ///
    /// The overwrite starts the keeper state over: `last_good_check` is
    /// cleared and health returns to unknown. The stored address is kept
    /// unless `new_params` supplies one.
    ///
    /// `pause` and `resume` dispatch one broker call when the current status
    /// differs; any other status is ignored.
    ///
    /// # Errors
    ///
    /// Returns the not-found errors of [`Self::get_resource`] and
    /// [`ResourceManagerError::Broker`] when the pause or resume call fails.
    pub async fn update_resource(
        &self,
        id: &ResourceId,
        new_status: &str,
        new_params: &ResourceParams,
    ) -> ResourceManagerResult<()> {
        let span = debug_span!(
            parent: &self.span,
            "update_resource",
            resource_id = %id,
            requested_status = %new_status
        );
        self.update_resource_inner(id, new_status, new_params)
            .instrument(span)
            .await
    }

    async fn update_resource_inner(
        &self,
        id: &ResourceId,
        new_status: &str,
        new_params: &ResourceParams,
    ) -> ResourceManagerResult<()> {
        let current = self.get_resource_inner(id).await?;

        if !self.registry.modify(id, |metadata| {
            *metadata = new_params.to_metadata(metadata.address());
        }) {
            return Err(ResourceManagerError::NotFoundInRegistry(id.clone()));
        }

        let requested = RequestedStatus::parse(new_status);
        if requested.is_satisfied_by(current.status()) {
            debug!(status = %current.status(), "status unchanged");
            return Ok(());
        }

        match requested {
            RequestedStatus::Resume => {
                self.broker.resume_resource(id).await?;
                info!("resource resumed");
            }
            RequestedStatus::Pause => {
                self.broker.pause_resource(id).await?;
                info!("resource paused");
            }
            RequestedStatus::Unrecognized(value) => {
                warn!(requested_status = %value, "ignoring unrecognised status");
            }
        }
        Ok(())
    }

    /// Returns the identifiers of every resource this manager added, in no
    /// defined order.
    #[must_use]
    pub fn list_managed_resources(&self) -> Vec<ResourceId> {
        self.registry.ids()
    }

    /// Runs one keeper pass over every registered resource.
    ///
    /// Returns `None` without doing anything when another pass is still in
    /// progress.
    pub async fn run_keeper_pass(&self) -> Option<KeeperReport> {
        let Ok(_pass) = self.keeper_gate.try_lock() else {
            debug!(parent: &self.span, "keeper pass already running, skipping");
            return None;
        };
        let span = info_span!(parent: &self.span, "keeper_pass");
        Some(self.sweep().instrument(span).await)
    }

    async fn sweep(&self) -> KeeperReport {
        debug!("direct connect keeper starting up");
        let mut report = KeeperReport::new(self.clock.utc());

        for (id, snapshot) in self.registry.iterate() {
            let outcome = self
                .keep_resource(&id, snapshot)
                .instrument(debug_span!("keep_resource", resource_id = %id))
                .await;
            report.record(outcome);
        }

        info!(
            processed = report.processed(),
            healthy = report.healthy(),
            reconnected = report.reconnected(),
            issues = report.issues().len(),
            "direct connect resource manager has updated resources"
        );
        report
    }

    async fn keep_resource(&self, id: &ResourceId, mut observed: ResourceMetadata) -> KeeperOutcome {
        let resource = match self.broker.get_resource(id).await {
            Ok(Some(resource)) => resource,
            Ok(None) => {
                error!(
                    "unable to find a resource in the broker that the direct connect manager is responsible for"
                );
                return KeeperOutcome::Issue(KeeperIssue::MissingFromBroker(id.clone()));
            }
            Err(err) => {
                error!(error = %err, "broker lookup failed during keeper pass");
                return KeeperOutcome::Issue(KeeperIssue::LookupFailed {
                    id: id.clone(),
                    error: err,
                });
            }
        };

        let healthy = self.broker.check_resource_connection_status(&resource).await;
        debug!(
            status = %resource.status,
            healthy,
            notes = observed.notes(),
            last_good_check = ?observed.last_good_check(),
            "checked resource connection status"
        );

        let outcome = if healthy {
            observed.record_healthy_check(self.clock.utc());
            KeeperOutcome::Healthy
        } else {
            observed.record_failed_check();
            self.reconnect(&resource, &mut observed).await
        };

        if !self
            .registry
            .modify(id, |stored| stored.apply_health_from(&observed))
        {
            warn!("resource was deleted during the keeper pass, leaving it removed");
            return KeeperOutcome::Issue(KeeperIssue::Vanished(id.clone()));
        }
        outcome
    }

    async fn reconnect(
        &self,
        resource: &BrokerResource,
        observed: &mut ResourceMetadata,
    ) -> KeeperOutcome {
        if resource.status.is_paused() {
            debug!("paused resource is unhealthy, not reconnecting");
            return KeeperOutcome::Unhealthy;
        }

        let max_attempts = self.reconnect.max_attempts();
        if max_attempts == 0 {
            return KeeperOutcome::Unhealthy;
        }

        for attempt in 1..=max_attempts {
            match self
                .broker
                .connect_resource(&resource.id, observed.address(), &self.transport)
                .await
            {
                Ok(()) => {
                    info!(attempt, address = observed.address(), "resource reconnected");
                    observed.record_reconnected();
                    return KeeperOutcome::Reconnected { attempts: attempt };
                }
                Err(err) => {
                    warn!(attempt, max_attempts, error = %err, "reconnect attempt failed");
                }
            }

            if attempt < max_attempts && !self.reconnect.backoff().is_zero() {
                tokio::time::sleep(self.reconnect.backoff()).await;
            }
        }

        observed.mark_degraded();
        error!(
            attempts = max_attempts,
            address = observed.address(),
            "giving up on resource after exhausting reconnect attempts"
        );
        KeeperOutcome::Issue(KeeperIssue::ReconnectFailed {
            id: resource.id.clone(),
            attempts: max_attempts,
        })
    }
}
