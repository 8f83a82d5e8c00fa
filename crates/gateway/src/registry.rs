//! Per-node subscription bookkeeping.

use cardloom_channels::Channel;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// Identifier of one live connection on this node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

#[derive(Default)]
struct Maps {
    forward: HashMap<ConnectionId, HashSet<Channel>>,
    reverse: HashMap<Channel, HashSet<ConnectionId>>,
}

/// Tracks which channels each live connection is subscribed to.
///
/// Entirely in-memory and per node: after a reconnect the client re-declares
/// its interests. Both directions are kept under one lock so they can never
/// disagree; reads are concurrent, mutation is safe under concurrent
/// subscribe/unsubscribe from many connection tasks.
#[derive(Default)]
pub struct SubscriptionRegistry {
    maps: RwLock<Maps>,
    next_id: AtomicU64,
}

impl SubscriptionRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an id for a freshly accepted connection.
    pub fn next_connection_id(&self) -> ConnectionId {
        ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Subscribe a connection to a channel.
    pub async fn subscribe(&self, connection: ConnectionId, channel: Channel) {
        let mut maps = self.maps.write().await;
        maps.forward.entry(connection).or_default().insert(channel);
        maps.reverse.entry(channel).or_default().insert(connection);
    }

    /// Unsubscribe a connection from a channel.
    pub async fn unsubscribe(&self, connection: ConnectionId, channel: Channel) {
        let mut maps = self.maps.write().await;
        if let Some(channels) = maps.forward.get_mut(&connection) {
            channels.remove(&channel);
        }
        if let Some(connections) = maps.reverse.get_mut(&channel) {
            connections.remove(&connection);
            if connections.is_empty() {
                maps.reverse.remove(&channel);
            }
        }
    }

    /// Channels a connection currently listens to.
    pub async fn channels_of(&self, connection: ConnectionId) -> HashSet<Channel> {
        self.maps
            .read()
            .await
            .forward
            .get(&connection)
            .cloned()
            .unwrap_or_default()
    }

    /// Connections currently listening to a channel.
    pub async fn connections_of(&self, channel: Channel) -> HashSet<ConnectionId> {
        self.maps
            .read()
            .await
            .reverse
            .get(&channel)
            .cloned()
            .unwrap_or_default()
    }

    /// Tear down all state of a disconnected connection.
    pub async fn remove_connection(&self, connection: ConnectionId) {
        let mut maps = self.maps.write().await;
        if let Some(channels) = maps.forward.remove(&connection) {
            for channel in channels {
                if let Some(connections) = maps.reverse.get_mut(&channel) {
                    connections.remove(&connection);
                    if connections.is_empty() {
                        maps.reverse.remove(&channel);
                    }
                }
            }
        }
    }
}
