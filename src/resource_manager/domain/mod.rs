//! Domain model for direct-connect resource management.
//!
//! The domain covers broker-assigned resource identity, the parameter
//! mapping exchanged with the host, broker-side status values and the
//! locally owned metadata the keeper maintains. Broker and scheduling
//! concerns remain outside this boundary.

mod error;
mod health;
mod ids;
mod metadata;
mod params;
mod resource;
mod status;
mod transport;

pub use error::ResourceParamsError;
pub use health::ResourceHealth;
pub use ids::ResourceId;
pub use metadata::ResourceMetadata;
pub use params::{
    ADDRESS_PARAM, AddResourceRequest, HEALTH_PARAM, LAST_GOOD_CHECK_PARAM, NAME_PARAM,
    NOTES_PARAM, ResourceParams,
};
pub use resource::{BrokerResource, ManagedResource};
pub use status::{RequestedStatus, ResourceStatus};
pub use transport::TransportSecurityConfig;
