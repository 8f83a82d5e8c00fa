//! WebSocket server for live change delivery.
//!
//! One accept loop, one task per connection, and a single delivery task that
//! consumes the cluster bus. Because locally-published events loop back
//! through the bus, delivery behaves identically whether the mutation was
//! served by this node or by a peer.

use crate::error::GatewayError;
use crate::messages::{ClientMessage, ServerMessage};
use crate::registry::{ConnectionId, SubscriptionRegistry};
use cardloom_channels::Channel;
use cardloom_core::UserId;
use cardloom_propagation::{ClusterBus, ClusterEvent};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc, RwLock};
use tokio_tungstenite::{accept_async, tungstenite::Message, WebSocketStream};
use tracing::{debug, error, info, warn};

/// Outbound queue depth per connection.
const OUTBOUND_CAPACITY: usize = 256;

type WsSink = SplitSink<WebSocketStream<TcpStream>, Message>;
type WsSource = SplitStream<WebSocketStream<TcpStream>>;

/// The live-connection endpoint of one node.
pub struct GatewayServer {
    addr: SocketAddr,
    registry: Arc<SubscriptionRegistry>,
    bus: Arc<ClusterBus>,
    senders: RwLock<HashMap<ConnectionId, mpsc::Sender<ServerMessage>>>,
}

impl GatewayServer {
    /// Create a server delivering bus events to connections on `addr`.
    pub fn new(addr: SocketAddr, registry: Arc<SubscriptionRegistry>, bus: Arc<ClusterBus>) -> Self {
        Self {
            addr,
            registry,
            bus,
            senders: RwLock::new(HashMap::new()),
        }
    }

    /// The subscription registry of this node.
    pub fn registry(&self) -> &Arc<SubscriptionRegistry> {
        &self.registry
    }

    /// Run the accept loop and the delivery task until the listener fails.
    pub async fn run(self: Arc<Self>) -> Result<(), GatewayError> {
        let listener = TcpListener::bind(self.addr).await?;
        info!(addr = %self.addr, "gateway listening");

        // Subscribe before accepting so no event published from now on can
        // slip past the delivery task.
        let rx = self.bus.subscribe();
        let delivery = Arc::clone(&self);
        tokio::spawn(async move { delivery.run_delivery(rx).await });

        loop {
            match listener.accept().await {
                Ok((stream, peer_addr)) => {
                    let server = Arc::clone(&self);
                    tokio::spawn(async move {
                        if let Err(e) = server.handle_connection(stream, peer_addr).await {
                            error!(peer = %peer_addr, error = %e, "connection error");
                        }
                    });
                }
                Err(e) => {
                    error!(error = %e, "failed to accept connection");
                }
            }
        }
    }

    /// Consume the cluster bus and fan events out to local subscribers.
    async fn run_delivery(self: Arc<Self>, mut rx: broadcast::Receiver<ClusterEvent>) {
        loop {
            match rx.recv().await {
                Ok(event) => self.deliver(event).await,
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(missed, "delivery task lagged, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    async fn deliver(&self, event: ClusterEvent) {
        let Some(channel) = event.parsed_channel() else {
            warn!(channel = %event.channel, "event for unknown channel key dropped");
            return;
        };
        let connections = self.registry.connections_of(channel).await;
        if connections.is_empty() {
            return;
        }
        let message = ServerMessage::WsUpdateMessage(event.batch);
        let senders = self.senders.read().await;
        for connection in connections {
            if let Some(tx) = senders.get(&connection) {
                // Per-connection queues preserve FIFO relative to local
                // commit order; a full queue drops for that connection only.
                if tx.try_send(message.clone()).is_err() {
                    warn!(%connection, "outbound queue full, dropping update");
                }
            }
        }
    }

    async fn handle_connection(
        &self,
        stream: TcpStream,
        peer_addr: SocketAddr,
    ) -> Result<(), GatewayError> {
        let ws_stream = accept_async(stream).await?;
        let (mut sink, mut source) = ws_stream.split();

        // The first frame must identify the user; everything else is dropped
        // until it arrives.
        let Some(user) = self.await_hello(&mut source).await? else {
            debug!(peer = %peer_addr, "closed before hello");
            return Ok(());
        };

        let connection = self.registry.next_connection_id();
        let (tx, mut rx) = mpsc::channel(OUTBOUND_CAPACITY);
        self.senders.write().await.insert(connection, tx);

        // Every client hears about itself and about installation-wide
        // broadcasts without asking.
        self.registry.subscribe(connection, Channel::User(user)).await;
        self.registry.subscribe(connection, Channel::Broadcast).await;
        info!(%connection, %user, peer = %peer_addr, "connection established");

        // Teardown must run on every exit, including a failed write to a
        // client that vanished mid-session, or the sender map and registry
        // keep the dead connection forever.
        let result = self
            .run_session(connection, user, &mut sink, &mut source, &mut rx)
            .await;

        self.senders.write().await.remove(&connection);
        self.registry.remove_connection(connection).await;
        info!(%connection, "connection closed");
        result
    }

    async fn run_session(
        &self,
        connection: ConnectionId,
        user: UserId,
        sink: &mut WsSink,
        source: &mut WsSource,
        rx: &mut mpsc::Receiver<ServerMessage>,
    ) -> Result<(), GatewayError> {
        send_frame(
            sink,
            &ServerMessage::AckMessage {
                message: format!("connected as user/{user}"),
            },
        )
        .await?;

        loop {
            tokio::select! {
                outbound = rx.recv() => match outbound {
                    Some(message) => send_frame(sink, &message).await?,
                    None => return Ok(()),
                },
                inbound = source.next() => match inbound {
                    Some(Ok(Message::Text(text))) => {
                        self.handle_client_frame(connection, &text).await;
                    }
                    Some(Ok(Message::Close(_))) | None => return Ok(()),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(%connection, error = %e, "receive failed");
                        return Ok(());
                    }
                },
            }
        }
    }

    async fn await_hello(&self, source: &mut WsSource) -> Result<Option<UserId>, GatewayError> {
        while let Some(frame) = source.next().await {
            match frame? {
                Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(ClientMessage::HelloMessage { user }) => {
                        return Ok(Some(UserId::new(user)))
                    }
                    Ok(_) => warn!("frame before hello ignored"),
                    Err(e) => warn!(error = %e, "malformed frame before hello"),
                },
                Message::Close(_) => return Ok(None),
                _ => {}
            }
        }
        Ok(None)
    }

    async fn handle_client_frame(&self, connection: ConnectionId, text: &str) {
        let frame = match serde_json::from_str::<ClientMessage>(text) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(%connection, error = %e, "malformed client frame");
                return;
            }
        };
        match frame {
            ClientMessage::HelloMessage { .. } => {
                debug!(%connection, "duplicate hello ignored");
            }
            ClientMessage::SubscribeMessage { channel } => match Channel::parse_key(&channel) {
                Some(channel) => {
                    debug!(%connection, %channel, "subscribed");
                    self.registry.subscribe(connection, channel).await;
                }
                None => warn!(%connection, key = %channel, "unknown channel key"),
            },
            ClientMessage::UnsubscribeMessage { channel } => {
                if let Some(channel) = Channel::parse_key(&channel) {
                    debug!(%connection, %channel, "unsubscribed");
                    self.registry.unsubscribe(connection, channel).await;
                }
            }
        }
    }
}

async fn send_frame(sink: &mut WsSink, message: &ServerMessage) -> Result<(), GatewayError> {
    let json = serde_json::to_string(message)?;
    sink.send(Message::Text(json)).await?;
    Ok(())
}
