//! Direct Connect: resource lifecycle management for cluster worker nodes.
//!
//! This crate keeps a local registry of metadata for remotely addressed
//! worker nodes ("resources") in step with the broker that owns
//! authoritative resource and task state, and periodically reconciles
//! connection health.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure resource model with no infrastructure dependencies
//! - **Ports**: The broker contract the resource manager consumes
//! - **Adapters**: The metadata registry, an in-memory broker and a
//!   timeout decorator
//! - **Services**: The resource manager facade, keeper pass and scheduler
//!
//! # Modules
//!
//! - [`resource_manager`]: Resource registry, facade and keeper
//! - [`config`]: File and environment configuration
//! - [`telemetry`]: Logging setup for binaries

pub mod config;
pub mod resource_manager;
pub mod telemetry;
