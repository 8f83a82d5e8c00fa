//! Core functionality for the Cardloom collaboration backbone.
//!
//! This crate provides the fundamental types, traits, and utilities used
//! across the Cardloom ecosystem: typed identifiers, resource references,
//! the relational-snapshot read interface, configuration, and logging.

pub mod config;
pub mod error;
pub mod logging;
pub mod snapshot;
pub mod types;

pub use config::{ClusterConfig, Config, GatewayConfig, NodeConfig};
pub use error::{CoreError, Result};
pub use snapshot::RelationSnapshot;
pub use types::{BlockId, ProjectId, ResourceId, ResourceKind, ResourceRef, Role, UserId};
