//! Runs the direct-connect resource manager against an in-memory broker.
//!
//! Usage:
//!
//! ```text
//! keeper_sim [config-path]
//! ```
//!
//! The simulation adds a handful of resources, drops one connection and makes
//! one address unreachable, then lets the keeper run for a few ticks so the
//! reconnect and degradation paths show up in the logs. Settings come from the
//! optional TOML file and `DIRECT_CONNECT_*` environment variables.
//!
//! The simulation lasts three keeper intervals, a little over three minutes
//! with the default 60 second interval. Shorten it for a quick run:
//!
//! ```text
//! DIRECT_CONNECT_KEEPER__INTERVAL_SECS=1 keeper_sim
//! ```

use direct_connect::config::{ConfigError, ManagerConfig};
use direct_connect::resource_manager::{
    adapters::memory::InMemoryResourceBroker,
    domain::{ADDRESS_PARAM, NAME_PARAM, NOTES_PARAM, ResourceParams},
    services::{ResourceManagerError, setup, spawn_keeper},
};
use direct_connect::telemetry::init_tracing;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};

/// Number of keeper intervals the simulation lets elapse.
const SIMULATED_TICKS: u32 = 3;

#[derive(Debug, Error)]
enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Manager(#[from] ResourceManagerError),
    #[error("failed to start tokio runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

fn main() {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    if let Err(err) = run(config_path) {
        init_tracing("info");
        error!(error = %err, "keeper simulation failed");
        std::process::exit(1);
    }
}

fn run(config_path: Option<PathBuf>) -> Result<(), SimulationError> {
    let config = ManagerConfig::load(config_path.as_deref())?;
    init_tracing(config.log_filter.as_str());

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(simulate(config))
}

async fn simulate(config: ManagerConfig) -> Result<(), SimulationError> {
    let broker = Arc::new(InMemoryResourceBroker::new());
    let manager = setup(Arc::clone(&broker), &config);

    let mut ids = Vec::new();
    for (name, address) in [
        ("node1", "10.0.0.5"),
        ("node2", "10.0.0.6"),
        ("node3", "10.0.0.7"),
    ] {
        let params = ResourceParams::new()
            .with(NAME_PARAM, name)
            .with(ADDRESS_PARAM, address)
            .with(NOTES_PARAM, format!("simulated {name}"));
        ids.push(manager.add_resource(&params).await?);
    }

    if let Some(dropped) = ids.first() {
        broker.drop_connection(dropped);
    }
    broker.set_address_reachable("10.0.0.7", false);

    let interval = config.keeper.interval();
    info!(
        interval = ?interval,
        ticks = SIMULATED_TICKS,
        "running keeper simulation, set DIRECT_CONNECT_KEEPER__INTERVAL_SECS to shorten it"
    );
    let keeper = spawn_keeper(Arc::clone(&manager), interval);
    tokio::time::sleep(interval * SIMULATED_TICKS + Duration::from_millis(100)).await;
    keeper.shutdown().await;

    for id in manager.managed_resources() {
        let view = manager.get_resource(&id).await?;
        info!(
            resource_id = %id,
            name = %view.resource.name,
            status = %view.resource.status,
            parameters = ?view.parameters,
            "final resource state"
        );
    }
    Ok(())
}
