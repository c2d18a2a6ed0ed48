//! Broker decorator that bounds every call with a timeout.

use crate::resource_manager::{
    domain::{BrokerResource, ResourceId, TransportSecurityConfig},
    ports::{BrokerError, BrokerOperation, BrokerResult, ResourceBroker},
};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::warn;

/// Wraps a broker so that no call blocks longer than a fixed limit.
///
/// A call that exceeds the limit fails with [`BrokerError::Timeout`]; a
/// health check that exceeds it reports the connection as unhealthy.
#[derive(Debug)]
pub struct TimedResourceBroker<B> {
    inner: Arc<B>,
    limit: Duration,
}

impl<B> Clone for TimedResourceBroker<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            limit: self.limit,
        }
    }
}

impl<B: ResourceBroker> TimedResourceBroker<B> {
    /// Wraps `inner`, allowing each call at most `limit`.
    #[must_use]
    pub const fn new(inner: Arc<B>, limit: Duration) -> Self {
        Self { inner, limit }
    }

    /// Returns the per-call limit.
    #[must_use]
    pub const fn limit(&self) -> Duration {
        self.limit
    }

    async fn bounded<T>(
        &self,
        operation: BrokerOperation,
        call: impl Future<Output = BrokerResult<T>> + Send,
    ) -> BrokerResult<T> {
        timeout(self.limit, call).await.unwrap_or_else(|_| {
            warn!(operation = %operation, limit = ?self.limit, "broker call timed out");
            Err(BrokerError::Timeout {
                operation,
                elapsed: self.limit,
            })
        })
    }
}

#[async_trait]
impl<B: ResourceBroker> ResourceBroker for TimedResourceBroker<B> {
    async fn add_resource(&self, name: &str) -> BrokerResult<ResourceId> {
        self.bounded(BrokerOperation::Add, self.inner.add_resource(name))
            .await
    }

    async fn remove_resource(&self, id: &ResourceId) -> BrokerResult<()> {
        self.bounded(BrokerOperation::Remove, self.inner.remove_resource(id))
            .await
    }

    async fn connect_resource(
        &self,
        id: &ResourceId,
        address: &str,
        transport: &TransportSecurityConfig,
    ) -> BrokerResult<()> {
        self.bounded(
            BrokerOperation::Connect,
            self.inner.connect_resource(id, address, transport),
        )
        .await
    }

    async fn get_resource(&self, id: &ResourceId) -> BrokerResult<Option<BrokerResource>> {
        self.bounded(BrokerOperation::Get, self.inner.get_resource(id))
            .await
    }

    async fn pause_resource(&self, id: &ResourceId) -> BrokerResult<()> {
        self.bounded(BrokerOperation::Pause, self.inner.pause_resource(id))
            .await
    }

    async fn resume_resource(&self, id: &ResourceId) -> BrokerResult<()> {
        self.bounded(BrokerOperation::Resume, self.inner.resume_resource(id))
            .await
    }

    async fn check_resource_connection_status(&self, resource: &BrokerResource) -> bool {
        if let Ok(healthy) = timeout(
            self.limit,
            self.inner.check_resource_connection_status(resource),
        )
        .await
        {
            return healthy;
        }
        warn!(
            resource_id = %resource.id,
            limit = ?self.limit,
            "connection status check timed out, treating resource as unhealthy"
        );
        false
    }
}
