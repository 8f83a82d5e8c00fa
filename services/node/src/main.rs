//! Cardloom node: cluster bus + WebSocket gateway for one cluster member.

use cardloom_core::{logging, Config};
use cardloom_gateway::{GatewayServer, SubscriptionRegistry};
use cardloom_propagation::{run_listener, spawn_peer_writer, ClusterBus};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let config = match config_path()? {
        Some(path) => {
            info!(path = %path.display(), "loading configuration");
            Config::from_file(&path)?
        }
        None => {
            info!("no configuration given, using defaults");
            Config::default_config()
        }
    };

    let mut bus = ClusterBus::new(&config.node.node_id, config.cluster.event_capacity);
    for peer in &config.cluster.peers {
        info!(%peer, "attaching peer writer");
        bus.add_peer(spawn_peer_writer(*peer));
    }
    let bus = Arc::new(bus);

    let listener_bus = Arc::clone(&bus);
    let cluster_addr = config.cluster.listen_addr;
    tokio::spawn(async move {
        if let Err(e) = run_listener(listener_bus, cluster_addr).await {
            error!(error = %e, "cluster listener failed");
        }
    });

    let registry = Arc::new(SubscriptionRegistry::new());
    let gateway = Arc::new(GatewayServer::new(
        config.gateway.listen_addr,
        registry,
        Arc::clone(&bus),
    ));
    let gateway_task = tokio::spawn(gateway.run());

    info!(node = %bus.node_id(), "cardloom node running");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
        }
        result = gateway_task => {
            match result {
                Ok(Ok(())) => info!("gateway stopped"),
                Ok(Err(e)) => error!(error = %e, "gateway failed"),
                Err(e) => error!(error = %e, "gateway task panicked"),
            }
        }
    }
    Ok(())
}

fn config_path() -> anyhow::Result<Option<PathBuf>> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return match args.next() {
                Some(path) => Ok(Some(PathBuf::from(path))),
                None => Err(anyhow::anyhow!("--config was provided without a path")),
            };
        }
    }
    Ok(std::env::var("CARDLOOM_CONFIG").ok().map(PathBuf::from))
}
