//! Bridge-level error type.

use call_adapter::{CallError, MediaError};

/// Errors that abort a bridge session. Recoverable conditions (malformed
/// control frames, failed setup flows) are logged in place and never reach
/// this type.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("WebSocket error: {0}")]
    Socket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("failed to serialize outbound frame: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error(transparent)]
    Call(#[from] CallError),
    #[error(transparent)]
    Media(#[from] MediaError),
}
