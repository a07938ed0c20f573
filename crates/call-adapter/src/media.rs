//! Media capture and playback seams (the getUserMedia / MediaRecorder /
//! audio-element analogs).

use crate::event::AudioTrack;
use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use tokio::sync::mpsc;

/// Errors surfaced by capture or playback.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("microphone permission denied")]
    PermissionDenied,
    #[error("no capture device available")]
    NoDevice,
    #[error("playback failed: {0}")]
    Playback(String),
}

/// A granted microphone: the publishable track plus the chunked recording
/// stream. The producer paces `chunks` at the interval requested from
/// [`MediaDevices::open_microphone`]; the channel closes when capture stops.
#[derive(Debug)]
pub struct Microphone {
    pub track: AudioTrack,
    pub chunks: mpsc::Receiver<Bytes>,
}

/// Device access seam. Resolving the future models the permission prompt:
/// implementations may never resolve if the user never answers it.
#[async_trait]
pub trait MediaDevices: Send + Sync {
    /// Request microphone-only capture, recording in chunks of
    /// `chunk_interval` duration.
    async fn open_microphone(&self, chunk_interval: Duration) -> Result<Microphone, MediaError>;
}

/// Local audio output seam. At most one track plays at a time; callers are
/// expected to `stop` before `play`ing a replacement.
#[async_trait]
pub trait PlaybackSink: Send {
    /// Begin playing a remote track.
    async fn play(&mut self, track: AudioTrack) -> Result<(), MediaError>;

    /// Stop playback and drop the current source. No-op when idle.
    async fn stop(&mut self);
}
