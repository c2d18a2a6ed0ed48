//! Application services for direct-connect resource management.

mod keeper;
mod manager;
mod plugin;

pub use keeper::{
    KeeperHandle, KeeperIssue, KeeperOutcome, KeeperReport, ReconnectPolicy, spawn_keeper,
};
pub use manager::{DirectConnectManager, ResourceManagerError, ResourceManagerResult};
pub use plugin::{
    DESCRIPTION, DISPLAY_NAME, ResourceManager, SYSTEM_NAME, parameters_form, parameters_schema,
    setup,
};
