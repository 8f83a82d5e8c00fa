//! Cardloom Gateway - live connections and local delivery
//!
//! WebSocket endpoint for collaborating clients:
//! - [`SubscriptionRegistry`] tracks which channels each live connection
//!   listens to (in-memory, per node, rebuilt on reconnect)
//! - [`GatewayServer`] accepts connections, auto-subscribes every client to
//!   its own user channel and the broadcast channel, and handles explicit
//!   subscribe/unsubscribe frames
//! - A single delivery task consumes the cluster bus and fans each event out
//!   to the locally-subscribed connections, FIFO per connection

#![warn(missing_docs)]

pub mod error;
pub mod messages;
pub mod registry;
pub mod server;

pub use error::GatewayError;
pub use messages::{ClientMessage, ServerMessage};
pub use registry::{ConnectionId, SubscriptionRegistry};
pub use server::GatewayServer;
