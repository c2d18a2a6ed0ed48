//! Port contracts for direct-connect resource management.

mod broker;

#[cfg(test)]
pub use broker::MockResourceBroker;
pub use broker::{BrokerError, BrokerOperation, BrokerResult, ResourceBroker};
