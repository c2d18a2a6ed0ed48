//! Direct-connect resource management for cluster worker nodes.
//!
//! The module keeps a local registry of per-resource metadata in step with
//! the broker that owns authoritative resource state, and runs a periodic
//! keeper pass that refreshes connection health and reconnects dropped
//! resources. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
