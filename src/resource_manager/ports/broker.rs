//! Broker port: authoritative resource state and connections.

use crate::resource_manager::domain::{BrokerResource, ResourceId, TransportSecurityConfig};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result type for broker operations.
pub type BrokerResult<T> = Result<T, BrokerError>;

/// Resource CRUD and connection contract offered by the broker.
///
/// Implementations must be safe for concurrent use; the resource manager
/// calls them from host request handlers and the keeper at the same time.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResourceBroker: Send + Sync {
    /// Registers a new resource under `name` and returns its identifier.
    async fn add_resource(&self, name: &str) -> BrokerResult<ResourceId>;

    /// Removes a resource.
    async fn remove_resource(&self, id: &ResourceId) -> BrokerResult<()>;

    /// Connects a registered resource at `address`.
    async fn connect_resource(
        &self,
        id: &ResourceId,
        address: &str,
        transport: &TransportSecurityConfig,
    ) -> BrokerResult<()>;

    /// Looks up a resource; `Ok(None)` when the broker does not know it.
    async fn get_resource(&self, id: &ResourceId) -> BrokerResult<Option<BrokerResource>>;

    /// Pauses a resource.
    async fn pause_resource(&self, id: &ResourceId) -> BrokerResult<()>;

    /// Resumes a paused resource.
    async fn resume_resource(&self, id: &ResourceId) -> BrokerResult<()>;

    /// Reports whether the connection to `resource` is currently healthy.
    async fn check_resource_connection_status(&self, resource: &BrokerResource) -> bool;
}

/// Broker call that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrokerOperation {
    /// `add_resource`.
    Add,
    /// `remove_resource`.
    Remove,
    /// `connect_resource`.
    Connect,
    /// `get_resource`.
    Get,
    /// `pause_resource`.
    Pause,
    /// `resume_resource`.
    Resume,
    /// `check_resource_connection_status`.
    CheckStatus,
}

impl BrokerOperation {
    /// Returns the operation name used in logs and errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Connect => "connect",
            Self::Get => "get",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::CheckStatus => "check_status",
        }
    }
}

impl fmt::Display for BrokerOperation {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Errors returned by broker adapters.
#[derive(Debug, Clone, Error)]
pub enum BrokerError {
    /// The broker refused the operation.
    #[error("broker rejected {operation}: {reason}")]
    Rejected {
        /// Operation that was refused.
        operation: BrokerOperation,
        /// Reason reported by the broker.
        reason: String,
    },

    /// The call did not complete in time.
    #[error("broker {operation} call timed out after {elapsed:?}")]
    Timeout {
        /// Operation that timed out.
        operation: BrokerOperation,
        /// Time allowed for the call.
        elapsed: Duration,
    },

    /// Transport or runtime failure inside the broker client.
    #[error("broker runtime error: {0}")]
    Runtime(Arc<dyn std::error::Error + Send + Sync>),
}

impl BrokerError {
    /// Creates a rejection for `operation`.
    pub fn rejected(operation: BrokerOperation, reason: impl Into<String>) -> Self {
        Self::Rejected {
            operation,
            reason: reason.into(),
        }
    }

    /// Wraps a runtime error from the broker client.
    pub fn runtime(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Runtime(Arc::new(err))
    }

    /// Returns whether the error is a timeout.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
