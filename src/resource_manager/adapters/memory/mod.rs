//! In-memory adapters: the resource registry and a deterministic broker.

mod broker;
mod registry;

pub use broker::InMemoryResourceBroker;
pub use registry::InMemoryResourceRegistry;
