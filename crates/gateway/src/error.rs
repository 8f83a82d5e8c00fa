//! Gateway error types.

use thiserror::Error;

/// Socket-level gateway failures.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Listener or connection IO failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// WebSocket protocol failure.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Frame (de)serialization failure.
    #[error("Codec error: {0}")]
    Codec(#[from] serde_json::Error),
}
