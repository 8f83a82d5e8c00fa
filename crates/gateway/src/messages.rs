//! Wire frames exchanged with clients, discriminated by `"@class"`.

use cardloom_propagation::UpdateBatch;
use serde::{Deserialize, Serialize};

/// Frames sent by clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "@class")]
pub enum ClientMessage {
    /// First frame after connecting: who this connection belongs to.
    HelloMessage {
        /// Authenticated user id (session validation happens upstream).
        user: u64,
    },
    /// Declare interest in a channel (e.g. "start editing project P").
    SubscribeMessage {
        /// Channel wire key.
        channel: String,
    },
    /// Withdraw interest in a channel.
    UnsubscribeMessage {
        /// Channel wire key.
        channel: String,
    },
}

/// Frames sent to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "@class")]
pub enum ServerMessage {
    /// Batched change notification for one committed unit of work.
    WsUpdateMessage(UpdateBatch),
    /// Acknowledgment of hello / subscribe handling.
    AckMessage {
        /// Human-readable status.
        message: String,
    },
}
