//! Broker-side resource view and the merged view returned to the host.

use super::{ResourceId, ResourceParams, ResourceStatus};
use serde::{Deserialize, Serialize};

/// Resource as reported by the broker. The resource manager never constructs
/// these itself outside of broker adapters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerResource {
    /// Broker-assigned identifier.
    pub id: ResourceId,
    /// Name the resource was registered under.
    pub name: String,
    /// Address of the live connection, if one was established.
    pub address: Option<String>,
    /// Broker-reported status.
    pub status: ResourceStatus,
}

/// Broker resource merged with locally owned parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedResource {
    /// Broker-side view of the resource.
    pub resource: BrokerResource,
    /// Local parameters; always contains `notes`.
    pub parameters: ResourceParams,
}

impl ManagedResource {
    /// Returns the resource identifier.
    #[must_use]
    pub const fn id(&self) -> &ResourceId {
        &self.resource.id
    }

    /// Returns the broker-reported status.
    #[must_use]
    pub const fn status(&self) -> &ResourceStatus {
        &self.resource.status
    }
}
