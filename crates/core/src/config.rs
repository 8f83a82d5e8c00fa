//! Configuration management for Cardloom.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub node: NodeConfig,
    pub gateway: GatewayConfig,
    pub cluster: ClusterConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    pub node_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub listen_addr: SocketAddr,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    pub listen_addr: SocketAddr,
    pub peers: Vec<SocketAddr>,
    pub event_capacity: usize,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            node: NodeConfig {
                node_id: "node-001".to_string(),
            },
            gateway: GatewayConfig {
                listen_addr: "127.0.0.1:8420".parse().unwrap(),
            },
            cluster: ClusterConfig {
                listen_addr: "127.0.0.1:8421".parse().unwrap(),
                peers: Vec::new(),
                event_capacity: 1024,
            },
        }
    }
}
