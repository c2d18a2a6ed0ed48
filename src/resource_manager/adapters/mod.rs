//! Adapter implementations for the resource manager.

pub mod memory;

mod timed;

pub use timed::TimedResourceBroker;
