//! Cluster-wide event distribution with loop-back.
//!
//! Every published event takes exactly one delivery path: into the local
//! broadcast channel that the gateway's delivery task consumes. Remote
//! ingress feeds the same channel, so the originating node and its peers
//! drive their subscription registries through identical code.
//!
//! Peer fan-out is fire-and-forget: an unreachable peer is logged and
//! skipped, the committing transaction is never blocked and never fails
//! because of delivery.

use crate::message::UpdateBatch;
use cardloom_channels::Channel;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Upper bound on the remembered event ids used for remote dedup.
const MAX_SEEN_EVENTS: usize = 4096;

/// One per-channel batch travelling the cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterEvent {
    /// Unique event id, used to deduplicate remote deliveries.
    pub event_id: Uuid,
    /// Node that served the originating mutation.
    pub origin: String,
    /// Wire key of the target channel (`user/1`, `project/2`, `block/3`,
    /// `broadcast`).
    pub channel: String,
    /// The payload delivered to every subscriber of the channel.
    pub batch: UpdateBatch,
}

impl ClusterEvent {
    /// Parse the target channel key.
    pub fn parsed_channel(&self) -> Option<Channel> {
        Channel::parse_key(&self.channel)
    }
}

/// Handle to one peer's outbound writer task.
#[derive(Debug, Clone)]
pub struct PeerHandle {
    addr: SocketAddr,
    tx: mpsc::Sender<ClusterEvent>,
}

impl PeerHandle {
    /// Queue an event for this peer, dropping it if the peer is backlogged.
    fn forward(&self, event: ClusterEvent) {
        if self.tx.try_send(event).is_err() {
            warn!(peer = %self.addr, "peer backlogged or gone, dropping event");
        }
    }
}

/// The intra-cluster event bus.
pub struct ClusterBus {
    node_id: String,
    local: broadcast::Sender<ClusterEvent>,
    peers: Vec<PeerHandle>,
    seen: Mutex<HashSet<Uuid>>,
}

impl ClusterBus {
    /// Create a bus for this node with the given local fan-in capacity.
    pub fn new(node_id: impl Into<String>, capacity: usize) -> Self {
        let (local, _) = broadcast::channel(capacity.max(1));
        Self {
            node_id: node_id.into(),
            local,
            peers: Vec::new(),
            seen: Mutex::new(HashSet::new()),
        }
    }

    /// This node's id.
    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Attach a peer writer.
    pub fn add_peer(&mut self, peer: PeerHandle) {
        self.peers.push(peer);
    }

    /// Subscribe to locally-delivered events (gateway delivery task).
    pub fn subscribe(&self) -> broadcast::Receiver<ClusterEvent> {
        self.local.subscribe()
    }

    /// Publish one per-channel batch cluster-wide.
    ///
    /// Loop-back is unconditional: local subscribers receive the event
    /// through the same broadcast channel remote ingress uses.
    pub fn publish(&self, channel: &Channel, batch: UpdateBatch) {
        let event = ClusterEvent {
            event_id: Uuid::new_v4(),
            origin: self.node_id.clone(),
            channel: channel.key(),
            batch,
        };
        for peer in &self.peers {
            peer.forward(event.clone());
        }
        self.deliver_local(event);
    }

    /// Ingest an event received from a peer node.
    ///
    /// Our own events come back only through the internal loop-back, so an
    /// event carrying our origin id, or one already seen, is dropped.
    pub fn ingest_remote(&self, event: ClusterEvent) {
        if event.origin == self.node_id {
            return;
        }
        {
            let mut seen = self.seen.lock().unwrap_or_else(|e| e.into_inner());
            if !seen.insert(event.event_id) {
                return;
            }
            if seen.len() > MAX_SEEN_EVENTS {
                seen.clear();
            }
        }
        debug!(origin = %event.origin, channel = %event.channel, "remote event ingested");
        self.deliver_local(event);
    }

    fn deliver_local(&self, event: ClusterEvent) {
        // No local subscriber is fine (gateway not started yet).
        let _ = self.local.send(event);
    }
}

/// Spawn the writer task for one peer and return its handle.
///
/// The task lazily (re)connects and writes one JSON line per event. Failures
/// are transient delivery failures: logged, never retried for the failed
/// event, never surfaced to the committing request.
pub fn spawn_peer_writer(addr: SocketAddr) -> PeerHandle {
    let (tx, mut rx) = mpsc::channel::<ClusterEvent>(256);
    tokio::spawn(async move {
        let mut stream: Option<TcpStream> = None;
        while let Some(event) = rx.recv().await {
            if stream.is_none() {
                match TcpStream::connect(addr).await {
                    Ok(s) => stream = Some(s),
                    Err(e) => {
                        warn!(peer = %addr, error = %e, "peer unreachable, dropping event");
                        continue;
                    }
                }
            }
            let line = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(e) => {
                    warn!(error = %e, "unencodable cluster event dropped");
                    continue;
                }
            };
            let conn = stream.as_mut().unwrap();
            if let Err(e) = write_line(conn, &line).await {
                warn!(peer = %addr, error = %e, "peer write failed, dropping event");
                stream = None;
            }
        }
    });
    PeerHandle { addr, tx }
}

async fn write_line(stream: &mut TcpStream, line: &str) -> std::io::Result<()> {
    stream.write_all(line.as_bytes()).await?;
    stream.write_all(b"\n").await?;
    Ok(())
}

/// Accept peer connections and feed their events into the bus.
pub async fn run_listener(bus: Arc<ClusterBus>, addr: SocketAddr) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "cluster listener up");
    loop {
        let (stream, peer_addr) = listener.accept().await?;
        let bus = Arc::clone(&bus);
        tokio::spawn(async move {
            let mut lines = BufReader::new(stream).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => match serde_json::from_str::<ClusterEvent>(&line) {
                        Ok(event) => bus.ingest_remote(event),
                        Err(e) => {
                            warn!(peer = %peer_addr, error = %e, "malformed cluster event")
                        }
                    },
                    Ok(None) => break,
                    Err(e) => {
                        warn!(peer = %peer_addr, error = %e, "peer read failed");
                        break;
                    }
                }
            }
        });
    }
}
