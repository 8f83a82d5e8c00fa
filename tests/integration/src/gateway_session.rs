//! Live WebSocket sessions against a running gateway.

use cardloom_channels::Channel;
use cardloom_core::{ProjectId, ResourceId, UserId};
use cardloom_domain::{Card, Resource};
use cardloom_gateway::{GatewayServer, ServerMessage, SubscriptionRegistry};
use cardloom_propagation::{ClusterBus, UpdateBatch};
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

type ClientSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn start_gateway(port: u16) -> (Arc<ClusterBus>, Arc<GatewayServer>) {
    let addr: SocketAddr = format!("127.0.0.1:{port}").parse().unwrap();
    let bus = Arc::new(ClusterBus::new("node-a", 64));
    let registry = Arc::new(SubscriptionRegistry::new());
    let server = Arc::new(GatewayServer::new(addr, registry, Arc::clone(&bus)));
    tokio::spawn(Arc::clone(&server).run());
    (bus, server)
}

/// Connect with a short retry loop; the listener binds asynchronously.
async fn connect(port: u16) -> ClientSocket {
    let url = format!("ws://127.0.0.1:{port}");
    for _ in 0..50 {
        if let Ok((socket, _)) = connect_async(&url).await {
            return socket;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("gateway did not come up on port {port}");
}

async fn send(socket: &mut ClientSocket, frame: &str) {
    socket.send(Message::Text(frame.to_string())).await.unwrap();
}

/// Next text frame, decoded.
async fn next_message(socket: &mut ClientSocket) -> ServerMessage {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), socket.next())
            .await
            .expect("no frame from gateway")
            .expect("connection closed")
            .unwrap();
        if let Message::Text(text) = frame {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

fn card_batch(id: u64) -> UpdateBatch {
    let card = Card {
        id: ResourceId::new(id),
        project: ProjectId::new(1),
        card_type: None,
        title: "card".to_string(),
    };
    UpdateBatch {
        updated: vec![card.to_dto()],
        deleted: Vec::new(),
    }
}

#[tokio::test]
async fn test_hello_auto_subscribes_user_and_broadcast() {
    let (bus, _server) = start_gateway(19520).await;
    let mut socket = connect(19520).await;

    send(&mut socket, r#"{"@class":"HelloMessage","user":5}"#).await;
    assert!(matches!(
        next_message(&mut socket).await,
        ServerMessage::AckMessage { .. }
    ));

    bus.publish(&Channel::User(UserId::new(5)), card_batch(1));
    let ServerMessage::WsUpdateMessage(batch) = next_message(&mut socket).await else {
        panic!("expected update");
    };
    assert_eq!(batch.updated.len(), 1);

    bus.publish(&Channel::Broadcast, card_batch(2));
    assert!(matches!(
        next_message(&mut socket).await,
        ServerMessage::WsUpdateMessage(_)
    ));
}

#[tokio::test]
async fn test_explicit_subscription_and_fifo_delivery() {
    let (bus, _server) = start_gateway(19521).await;
    let mut socket = connect(19521).await;

    send(&mut socket, r#"{"@class":"HelloMessage","user":6}"#).await;
    next_message(&mut socket).await; // ack

    send(&mut socket, r#"{"@class":"SubscribeMessage","channel":"project/1"}"#).await;
    // Subscription handling races the publishes below; give the gateway a
    // beat to register it.
    tokio::time::sleep(Duration::from_millis(100)).await;

    bus.publish(&Channel::ProjectContent(ProjectId::new(1)), card_batch(1));
    bus.publish(&Channel::ProjectContent(ProjectId::new(1)), card_batch(2));

    for expected in [1u64, 2] {
        let ServerMessage::WsUpdateMessage(batch) = next_message(&mut socket).await else {
            panic!("expected update");
        };
        let json = serde_json::to_value(&batch.updated[0]).unwrap();
        assert_eq!(json["id"], expected);
    }
}

#[tokio::test]
async fn test_foreign_channels_are_not_delivered() {
    let (bus, _server) = start_gateway(19522).await;
    let mut socket = connect(19522).await;

    send(&mut socket, r#"{"@class":"HelloMessage","user":7}"#).await;
    next_message(&mut socket).await; // ack

    // Another user's channel and an unsubscribed project.
    bus.publish(&Channel::User(UserId::new(8)), card_batch(1));
    bus.publish(&Channel::ProjectContent(ProjectId::new(4)), card_batch(2));
    // A frame the client does hear, proving the silent ones stayed silent.
    bus.publish(&Channel::User(UserId::new(7)), card_batch(3));

    let ServerMessage::WsUpdateMessage(batch) = next_message(&mut socket).await else {
        panic!("expected update");
    };
    let json = serde_json::to_value(&batch.updated[0]).unwrap();
    assert_eq!(json["id"], 3);
}

#[tokio::test]
async fn test_vanished_client_is_torn_down() {
    let (bus, server) = start_gateway(19524).await;
    let mut socket = connect(19524).await;

    send(&mut socket, r#"{"@class":"HelloMessage","user":11}"#).await;
    next_message(&mut socket).await; // ack

    let user_channel = Channel::User(UserId::new(11));
    assert_eq!(
        server.registry().connections_of(user_channel).await.len(),
        1
    );

    // Drop the socket without a close handshake, then keep publishing so the
    // gateway hits the dead connection while writing. Whether the session
    // ends on the read or the write side, the registry and sender map must
    // be cleaned up.
    drop(socket);
    for id in 0..100u64 {
        bus.publish(&user_channel, card_batch(id));
        if server.registry().connections_of(user_channel).await.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(server.registry().connections_of(user_channel).await.is_empty());
    assert!(server.registry().connections_of(Channel::Broadcast).await.is_empty());
}

#[tokio::test]
async fn test_unsubscribe_stops_delivery() {
    let (bus, _server) = start_gateway(19523).await;
    let mut socket = connect(19523).await;

    send(&mut socket, r#"{"@class":"HelloMessage","user":9}"#).await;
    next_message(&mut socket).await; // ack

    send(&mut socket, r#"{"@class":"SubscribeMessage","channel":"project/2"}"#).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    send(&mut socket, r#"{"@class":"UnsubscribeMessage","channel":"project/2"}"#).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    bus.publish(&Channel::ProjectContent(ProjectId::new(2)), card_batch(1));
    bus.publish(&Channel::User(UserId::new(9)), card_batch(2));

    let ServerMessage::WsUpdateMessage(batch) = next_message(&mut socket).await else {
        panic!("expected update");
    };
    let json = serde_json::to_value(&batch.updated[0]).unwrap();
    assert_eq!(json["id"], 2);
}
