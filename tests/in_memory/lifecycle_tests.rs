//! Lifecycle tests for the direct-connect manager built through `setup`.
//!
//! Covers validation, the merged resource view, pause/resume dispatch and
//! removal, observing broker traffic through the in-memory adapter.

use crate::in_memory::helpers::{broker, host_manager, node};
use direct_connect::resource_manager::{
    adapters::memory::InMemoryResourceBroker,
    domain::{ADDRESS_PARAM, NOTES_PARAM, ResourceId, ResourceParams, ResourceParamsError, ResourceStatus},
    ports::BrokerOperation,
    services::ResourceManagerError,
};
use rstest::rstest;
use std::sync::Arc;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn added_resource_is_listed_and_viewable(broker: Arc<InMemoryResourceBroker>) {
    let manager = host_manager(&broker);

    let id = manager
        .add_resource(&node("node1", "10.0.0.5").with(NOTES_PARAM, "rack 4"))
        .await
        .expect("add should succeed");

    assert_eq!(manager.managed_resources(), vec![id.clone()]);
    let view = manager.get_resource(&id).await.expect("view should exist");
    assert_eq!(view.resource.name, "node1");
    assert_eq!(view.resource.status, ResourceStatus::Running);
    assert_eq!(view.parameters.notes(), "rack 4");
    assert_eq!(view.parameters.get(ADDRESS_PARAM), Some("10.0.0.5"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn add_without_notes_views_empty_notes(broker: Arc<InMemoryResourceBroker>) {
    let manager = host_manager(&broker);

    let id = manager
        .add_resource(&node("node1", "10.0.0.5"))
        .await
        .expect("add should succeed");

    let view = manager.get_resource(&id).await.expect("view should exist");
    assert_eq!(view.parameters.get(NOTES_PARAM), Some(""));
}

#[rstest]
#[case(ResourceParams::new().with("name", "node1"), "address")]
#[case(ResourceParams::new().with("address", "10.0.0.5"), "name")]
#[tokio::test(flavor = "multi_thread")]
async fn invalid_add_reaches_neither_broker_nor_registry(
    broker: Arc<InMemoryResourceBroker>,
    #[case] params: ResourceParams,
    #[case] field: &str,
) {
    let manager = host_manager(&broker);

    let err = manager
        .add_resource(&params)
        .await
        .expect_err("add should be rejected");

    assert!(matches!(
        err,
        ResourceManagerError::Validation(ResourceParamsError::MissingParameter(missing))
            if missing == field
    ));
    assert_eq!(broker.call_count(BrokerOperation::Add), 0);
    assert!(manager.managed_resources().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn refused_connect_leaves_broker_resource_without_local_entry(
    broker: Arc<InMemoryResourceBroker>,
) {
    broker.set_address_reachable("10.0.0.9", false);
    let manager = host_manager(&broker);

    let result = manager.add_resource(&node("node1", "10.0.0.9")).await;

    assert!(matches!(result, Err(ResourceManagerError::Broker(_))));
    assert_eq!(broker.resource_count(), 1);
    assert!(manager.managed_resources().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn pause_and_resume_dispatch_once_per_change(broker: Arc<InMemoryResourceBroker>) {
    let manager = host_manager(&broker);
    let id = manager
        .add_resource(&node("node1", "10.0.0.5"))
        .await
        .expect("add should succeed");

    for status in ["pause", "PAUSE", " pause "] {
        manager
            .update_resource(&id, status, &ResourceParams::new())
            .await
            .expect("pause should succeed");
    }
    assert_eq!(broker.call_count(BrokerOperation::Pause), 1);

    manager
        .update_resource(&id, "resume", &ResourceParams::new())
        .await
        .expect("resume should succeed");
    manager
        .update_resource(&id, "resume", &ResourceParams::new())
        .await
        .expect("resume should succeed");
    assert_eq!(broker.call_count(BrokerOperation::Resume), 1);

    let view = manager.get_resource(&id).await.expect("view should exist");
    assert_eq!(view.resource.status, ResourceStatus::Running);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_with_unknown_status_makes_no_broker_call(broker: Arc<InMemoryResourceBroker>) {
    let manager = host_manager(&broker);
    let id = manager
        .add_resource(&node("node1", "10.0.0.5").with(NOTES_PARAM, "old"))
        .await
        .expect("add should succeed");

    manager
        .update_resource(&id, "reboot", &ResourceParams::new().with(NOTES_PARAM, "new"))
        .await
        .expect("update should succeed");

    let view = manager.get_resource(&id).await.expect("view should exist");
    assert_eq!(view.parameters.notes(), "new");
    assert_eq!(broker.call_count(BrokerOperation::Pause), 0);
    assert_eq!(broker.call_count(BrokerOperation::Resume), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_delete_keeps_resource_listed(broker: Arc<InMemoryResourceBroker>) {
    let manager = host_manager(&broker);
    let id = manager
        .add_resource(&node("node1", "10.0.0.5"))
        .await
        .expect("add should succeed");
    broker.fail_operation(BrokerOperation::Remove);

    let result = manager.delete_resource(&id).await;

    assert!(matches!(result, Err(ResourceManagerError::Broker(_))));
    assert_eq!(manager.managed_resources(), vec![id.clone()]);

    broker.restore_operation(BrokerOperation::Remove);
    manager.delete_resource(&id).await.expect("delete should succeed");
    assert!(manager.managed_resources().is_empty());
    let err = manager
        .get_resource(&id)
        .await
        .expect_err("deleted resource should be gone");
    assert!(matches!(err, ResourceManagerError::NotFoundInBroker(_)));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_resource_is_not_found(broker: Arc<InMemoryResourceBroker>) {
    let manager = host_manager(&broker);
    let ghost = ResourceId::new("ghost");

    let get = manager.get_resource(&ghost).await;
    let update = manager
        .update_resource(&ghost, "pause", &ResourceParams::new())
        .await;

    assert!(get.is_err_and(|err| err.is_not_found()));
    assert!(update.is_err_and(|err| err.is_not_found()));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_adds_are_all_recorded(broker: Arc<InMemoryResourceBroker>) {
    let manager = host_manager(&broker);

    let mut tasks = Vec::new();
    for index in 0..16 {
        let host = Arc::clone(&manager);
        tasks.push(tokio::spawn(async move {
            host.add_resource(&node(&format!("node{index}"), &format!("10.0.1.{index}")))
                .await
        }));
    }
    for task in tasks {
        task.await
            .expect("task should join")
            .expect("add should succeed");
    }

    assert_eq!(manager.managed_resources().len(), 16);
}
