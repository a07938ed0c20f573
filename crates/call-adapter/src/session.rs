//! The conferencing SDK seam: room membership, remote recording, teardown.

use crate::event::{AudioTrack, CallEvent};
use async_trait::async_trait;
use tokio::sync::broadcast;

/// Errors surfaced by a [`CallSession`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum CallError {
    #[error("failed to join room {room_url}: {reason}")]
    Join { room_url: String, reason: String },
    #[error("recording control failed: {0}")]
    Recording(String),
    #[error("call session already destroyed")]
    Destroyed,
}

/// Parameters for joining a room. Video is always declined by the bridge,
/// but the field is part of the SDK surface.
#[derive(Debug, Clone)]
pub struct JoinOptions {
    pub room_url: String,
    /// The local audio source to publish into the room.
    pub audio_source: AudioTrack,
    pub video: bool,
    /// Display name the local participant joins with.
    pub user_name: String,
}

impl JoinOptions {
    /// Audio-only join, the only mode the bridge uses.
    pub fn audio_only(
        room_url: impl Into<String>,
        audio_source: AudioTrack,
        user_name: impl Into<String>,
    ) -> Self {
        Self {
            room_url: room_url.into(),
            audio_source,
            video: false,
            user_name: user_name.into(),
        }
    }
}

/// One conferencing call session.
///
/// Implementations wrap a concrete SDK call object. `destroy` must be
/// idempotent: the bridge invokes teardown both on terminal control frames
/// and on shutdown, and the second invocation must not fail.
#[async_trait]
pub trait CallSession: Send + Sync {
    /// Join a room, publishing the given audio source and no video.
    async fn join(&self, opts: JoinOptions) -> Result<(), CallError>;

    /// Start server-side recording of the call.
    async fn start_recording(&self) -> Result<(), CallError>;

    /// Stop server-side recording of the call.
    async fn stop_recording(&self) -> Result<(), CallError>;

    /// Leave the room and release all SDK resources. Idempotent.
    async fn destroy(&self) -> Result<(), CallError>;

    /// Subscribe to lifecycle events. Each subscriber gets every event
    /// emitted after the subscription.
    fn subscribe(&self) -> broadcast::Receiver<CallEvent>;
}
