//! Keeper integration tests over the in-memory broker.

use crate::in_memory::helpers::{at, broker, host_manager, keeper_rig, node};
use direct_connect::resource_manager::{
    adapters::memory::InMemoryResourceBroker,
    domain::{ResourceHealth, ResourceId, ResourceParams},
    ports::BrokerOperation,
    services::{KeeperIssue, spawn_keeper},
};
use rstest::rstest;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test(flavor = "multi_thread")]
async fn keeper_tracks_the_last_good_check() -> eyre::Result<()> {
    let rig = keeper_rig()?;
    let id = rig.manager.add_resource(&node("node1", "10.0.0.5")).await?;

    rig.clock.set(100)?;
    rig.manager.run_keeper_pass().await;
    rig.clock.set(105)?;
    rig.broker.set_address_reachable("10.0.0.5", false);
    let report = rig
        .manager
        .run_keeper_pass()
        .await
        .ok_or_else(|| eyre::eyre!("pass should run"))?;

    let metadata = rig
        .manager
        .registry()
        .get(&id)
        .ok_or_else(|| eyre::eyre!("metadata missing"))?;
    assert_eq!(metadata.last_good_check(), Some(at(100)?));
    assert_eq!(metadata.health(), ResourceHealth::Degraded);
    assert_eq!(report.issues().len(), 1);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn keeper_recovers_a_dropped_connection() -> eyre::Result<()> {
    let rig = keeper_rig()?;
    let id = rig.manager.add_resource(&node("node1", "10.0.0.5")).await?;
    rig.broker.drop_connection(&id);

    rig.clock.set(10)?;
    rig.manager.run_keeper_pass().await;
    rig.clock.set(20)?;
    rig.manager.run_keeper_pass().await;

    let metadata = rig
        .manager
        .registry()
        .get(&id)
        .ok_or_else(|| eyre::eyre!("metadata missing"))?;
    assert_eq!(metadata.health(), ResourceHealth::Connected);
    assert_eq!(metadata.last_good_check(), Some(at(20)?));
    assert_eq!(metadata.consecutive_failures(), 0);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn keeper_reports_resources_the_broker_forgot() -> eyre::Result<()> {
    let rig = keeper_rig()?;
    let forgotten = rig.manager.add_resource(&node("node1", "10.0.0.5")).await?;
    rig.manager.add_resource(&node("node2", "10.0.0.6")).await?;
    rig.broker.forget_resource(&forgotten);

    let report = rig
        .manager
        .run_keeper_pass()
        .await
        .ok_or_else(|| eyre::eyre!("pass should run"))?;

    assert_eq!(report.processed(), 2);
    assert_eq!(report.healthy(), 1);
    assert!(matches!(
        report.issues(),
        [KeeperIssue::MissingFromBroker(id)] if *id == forgotten
    ));
    assert!(rig.manager.list_managed_resources().contains(&forgotten));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn keeper_leaves_deleted_resources_alone() -> eyre::Result<()> {
    let rig = keeper_rig()?;
    let id = rig.manager.add_resource(&node("node1", "10.0.0.5")).await?;
    rig.manager.delete_resource(&id).await?;

    let report = rig
        .manager
        .run_keeper_pass()
        .await
        .ok_or_else(|| eyre::eyre!("pass should run"))?;

    assert_eq!(report.processed(), 0);
    assert!(!rig.manager.registry().contains(&id));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn paused_resource_keeps_its_status_through_passes() -> eyre::Result<()> {
    let rig = keeper_rig()?;
    let id = rig.manager.add_resource(&node("node1", "10.0.0.5")).await?;
    rig.manager
        .update_resource(&id, "pause", &ResourceParams::new())
        .await?;
    rig.broker.drop_connection(&id);
    let connects = rig.broker.call_count(BrokerOperation::Connect);

    rig.manager.run_keeper_pass().await;

    assert_eq!(rig.broker.call_count(BrokerOperation::Connect), connects);
    let view = rig.manager.get_resource(&id).await?;
    assert!(view.status().is_paused());
    Ok(())
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn scheduled_keeper_runs_through_the_host_contract(broker: Arc<InMemoryResourceBroker>) {
    let manager = host_manager(&broker);
    let ids: Vec<ResourceId> = vec![
        manager
            .add_resource(&node("node1", "10.0.0.5"))
            .await
            .expect("add should succeed"),
        manager
            .add_resource(&node("node2", "10.0.0.6"))
            .await
            .expect("add should succeed"),
    ];

    let handle = spawn_keeper(Arc::clone(&manager), Duration::from_secs(30));
    tokio::time::sleep(Duration::from_secs(45)).await;
    handle.shutdown().await;

    assert_eq!(
        broker.call_count(BrokerOperation::CheckStatus),
        2 * ids.len()
    );
}
