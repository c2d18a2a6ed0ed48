//! Host-facing resource manager contract and the direct-connect factory.

use super::manager::{DirectConnectManager, ResourceManagerResult};
use crate::config::ManagerConfig;
use crate::resource_manager::{
    adapters::TimedResourceBroker,
    domain::{
        ADDRESS_PARAM, ManagedResource, NAME_PARAM, NOTES_PARAM, ResourceId, ResourceParams,
    },
    ports::ResourceBroker,
};
use async_trait::async_trait;
use mockable::{Clock, DefaultClock};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;

/// Machine name the host registers this resource manager under.
pub const SYSTEM_NAME: &str = "directconnect";
/// Name shown to operators.
pub const DISPLAY_NAME: &str = "Direct Connect";
/// One-line description shown to operators.
pub const DESCRIPTION: &str = "Directly connect to resource servers.";

/// Contract a resource manager exposes to the host process.
///
/// The host renders configuration forms from [`Self::parameters_form`] and
/// [`Self::parameters_schema`], forwards operator requests to the lifecycle
/// operations and calls [`Self::keep`] on its own schedule.
#[async_trait]
pub trait ResourceManager: Send + Sync {
    /// Returns the machine name.
    fn system_name(&self) -> &'static str;

    /// Returns the operator-facing name.
    fn display_name(&self) -> &'static str;

    /// Returns the operator-facing description.
    fn description(&self) -> &'static str;

    /// Returns the form-field descriptor list for the add/update form.
    fn parameters_form(&self) -> Value;

    /// Returns the JSON schema of accepted parameters.
    fn parameters_schema(&self) -> Value;

    /// Adds a resource from host parameters and returns its identifier.
    async fn add_resource(&self, params: &ResourceParams) -> ResourceManagerResult<ResourceId>;

    /// Deletes a resource.
    async fn delete_resource(&self, id: &ResourceId) -> ResourceManagerResult<()>;

    /// Returns a resource merged with its local parameters.
    async fn get_resource(&self, id: &ResourceId) -> ResourceManagerResult<ManagedResource>;

    /// Updates parameters and applies a status change.
    async fn update_resource(
        &self,
        id: &ResourceId,
        new_status: &str,
        new_params: &ResourceParams,
    ) -> ResourceManagerResult<()>;

    /// Returns the identifiers of all managed resources.
    fn managed_resources(&self) -> Vec<ResourceId>;

    /// Runs one reconciliation pass. Failures are logged, never returned.
    async fn keep(&self);
}

/// Form-field descriptor list for the direct-connect parameters.
#[must_use]
pub fn parameters_form() -> Value {
    json!([
        NAME_PARAM,
        ADDRESS_PARAM,
        {
            "key": NOTES_PARAM,
            "type": "textarea",
            "placeholder": "OPTIONAL: Any notes you would like to include (location, primary contact, etc.)"
        }
    ])
}

/// JSON schema for the direct-connect parameters.
#[must_use]
pub fn parameters_schema() -> Value {
    json!({
        "type": "object",
        "title": DISPLAY_NAME,
        "properties": {
            NAME_PARAM: {
                "title": "Name",
                "type": "string",
                "description": "The name you would like to reference this resource as."
            },
            ADDRESS_PARAM: {
                "title": "Address",
                "type": "string",
                "default": "localhost",
                "description": "The full DNS name or IP address of the resource."
            },
            NOTES_PARAM: {
                "title": "Notes",
                "type": "string"
            }
        },
        "required": [NAME_PARAM, ADDRESS_PARAM]
    })
}

#[async_trait]
impl<B, C> ResourceManager for DirectConnectManager<B, C>
where
    B: ResourceBroker,
    C: Clock + Send + Sync,
{
    fn system_name(&self) -> &'static str {
        SYSTEM_NAME
    }

    fn display_name(&self) -> &'static str {
        DISPLAY_NAME
    }

    fn description(&self) -> &'static str {
        DESCRIPTION
    }

    fn parameters_form(&self) -> Value {
        parameters_form()
    }

    fn parameters_schema(&self) -> Value {
        parameters_schema()
    }

    async fn add_resource(&self, params: &ResourceParams) -> ResourceManagerResult<ResourceId> {
        Self::add_resource(self, params).await
    }

    async fn delete_resource(&self, id: &ResourceId) -> ResourceManagerResult<()> {
        Self::delete_resource(self, id).await
    }

    async fn get_resource(&self, id: &ResourceId) -> ResourceManagerResult<ManagedResource> {
        Self::get_resource(self, id).await
    }

    async fn update_resource(
        &self,
        id: &ResourceId,
        new_status: &str,
        new_params: &ResourceParams,
    ) -> ResourceManagerResult<()> {
        Self::update_resource(self, id, new_status, new_params).await
    }

    fn managed_resources(&self) -> Vec<ResourceId> {
        self.list_managed_resources()
    }

    async fn keep(&self) {
        self.run_keeper_pass().await;
    }
}

/// Builds the direct-connect resource manager for the host.
///
/// Every broker call is bounded by the configured timeout, the keeper uses
/// the configured reconnect policy and timestamps come from the system clock.
pub fn setup<B>(broker: Arc<B>, config: &ManagerConfig) -> Arc<dyn ResourceManager>
where
    B: ResourceBroker + 'static,
{
    let timed = TimedResourceBroker::new(broker, config.keeper.broker_call_timeout());
    let manager = DirectConnectManager::new(
        Arc::new(timed),
        Arc::new(config.transport.clone()),
        Arc::new(DefaultClock),
    )
    .with_reconnect_policy(config.keeper.reconnect_policy());

    info!(
        system = SYSTEM_NAME,
        broker_call_timeout = ?config.keeper.broker_call_timeout(),
        reconnect_attempts = config.keeper.reconnect_attempts,
        client_identity = config.transport.has_client_identity(),
        "direct connect resource manager ready"
    );
    Arc::new(manager)
}
