//! Cardloom Propagation - from committed mutation to delivered update
//!
//! This crate carries a mutation from its unit of work to every cluster node:
//! - [`PropagationBag`] accumulates updated and deleted resources during one
//!   transaction (idempotent, last state wins)
//! - [`Dispatcher`] runs at successful commit: it computes each entry's
//!   audience, groups the batch per channel, and publishes
//! - [`ClusterBus`] distributes one event per affected channel, delivering to
//!   the local node through the exact same path used for remote ingress
//!
//! Nothing here ever runs for an uncommitted unit of work, and nothing here
//! can roll a committed mutation back: audience-computation failures degrade
//! to "no delivery" and are logged.

#![warn(missing_docs)]

pub mod bag;
pub mod cluster;
pub mod dispatcher;
pub mod error;
pub mod message;

pub use bag::{BagState, PropagationBag};
pub use cluster::{run_listener, spawn_peer_writer, ClusterBus, ClusterEvent, PeerHandle};
pub use dispatcher::Dispatcher;
pub use error::PropagationError;
pub use message::UpdateBatch;
