//! In-process implementations of the three seams.
//!
//! These stand in for a real conferencing stack during development and in
//! tests: the call session records every operation it is asked to perform
//! and lets the caller inject lifecycle events, the media device produces
//! silence (or caller-supplied chunks) at the requested pace, and the
//! playback sink records what it was told to play.

use crate::event::{AudioTrack, CallEvent};
use crate::media::{MediaDevices, MediaError, Microphone, PlaybackSink};
use crate::session::{CallError, CallSession, JoinOptions};
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tracing::debug;

/// Shared chronological log of seam operations, for assertions and tracing.
pub type OpLog = Arc<Mutex<Vec<String>>>;

fn record(log: &OpLog, op: impl Into<String>) {
    log.lock().expect("op log poisoned").push(op.into());
}

/// A [`CallSession`] that records operations and broadcasts injected events.
pub struct LoopbackCall {
    ops: OpLog,
    events: broadcast::Sender<CallEvent>,
    destroyed: AtomicBool,
}

impl LoopbackCall {
    pub fn new() -> Self {
        Self::with_log(OpLog::default())
    }

    /// Share an operation log with other loopback pieces so ordering across
    /// seams can be observed.
    pub fn with_log(ops: OpLog) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            ops,
            events,
            destroyed: AtomicBool::new(false),
        }
    }

    /// Inject a lifecycle event, as the SDK would.
    pub fn emit(&self, event: CallEvent) {
        // No subscribers is fine; the session may not be running yet.
        let _ = self.events.send(event);
    }

    pub fn ops(&self) -> Vec<String> {
        self.ops.lock().expect("op log poisoned").clone()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }
}

impl Default for LoopbackCall {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CallSession for LoopbackCall {
    async fn join(&self, opts: JoinOptions) -> Result<(), CallError> {
        if self.destroyed.load(Ordering::SeqCst) {
            return Err(CallError::Destroyed);
        }
        record(&self.ops, format!("join:{}", opts.room_url));
        debug!(room_url = %opts.room_url, user_name = %opts.user_name, "loopback join");
        self.emit(CallEvent::Joined);
        Ok(())
    }

    async fn start_recording(&self) -> Result<(), CallError> {
        if self.destroyed.load(Ordering::SeqCst) {
            return Err(CallError::Destroyed);
        }
        record(&self.ops, "start_recording");
        Ok(())
    }

    async fn stop_recording(&self) -> Result<(), CallError> {
        record(&self.ops, "stop_recording");
        Ok(())
    }

    async fn destroy(&self) -> Result<(), CallError> {
        record(&self.ops, "destroy");
        self.destroyed.store(true, Ordering::SeqCst);
        self.emit(CallEvent::Left);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<CallEvent> {
        self.events.subscribe()
    }
}

/// What a [`LoopbackMedia`] microphone produces.
enum ChunkSource {
    /// Zero-filled chunks of the given size, paced at the chunk interval.
    Silence { chunk_len: usize },
    /// A receiver handed over verbatim; the caller feeds chunks manually.
    Manual(mpsc::Receiver<Bytes>),
}

/// A [`MediaDevices`] that always grants the microphone.
pub struct LoopbackMedia {
    source: Mutex<Option<ChunkSource>>,
}

impl LoopbackMedia {
    /// Silence generator, for the dev binary.
    pub fn silence(chunk_len: usize) -> Self {
        Self {
            source: Mutex::new(Some(ChunkSource::Silence { chunk_len })),
        }
    }

    /// Manually-fed microphone: chunks sent on the returned sender appear on
    /// the microphone's chunk stream. Dropping the sender ends capture.
    pub fn manual() -> (Self, mpsc::Sender<Bytes>) {
        let (tx, rx) = mpsc::channel(16);
        let media = Self {
            source: Mutex::new(Some(ChunkSource::Manual(rx))),
        };
        (media, tx)
    }
}

#[async_trait]
impl MediaDevices for LoopbackMedia {
    async fn open_microphone(&self, chunk_interval: Duration) -> Result<Microphone, MediaError> {
        let source = self
            .source
            .lock()
            .expect("media source poisoned")
            .take()
            .ok_or(MediaError::NoDevice)?;

        let chunks = match source {
            ChunkSource::Manual(rx) => rx,
            ChunkSource::Silence { chunk_len } => {
                let (tx, rx) = mpsc::channel(16);
                tokio::spawn(async move {
                    let mut ticker = tokio::time::interval(chunk_interval);
                    loop {
                        ticker.tick().await;
                        if tx.send(Bytes::from(vec![0u8; chunk_len])).await.is_err() {
                            break;
                        }
                    }
                });
                rx
            }
        };

        Ok(Microphone {
            track: AudioTrack::live("loopback-mic"),
            chunks,
        })
    }
}

/// A [`PlaybackSink`] that records play/stop calls in an [`OpLog`].
pub struct LoopbackPlayback {
    ops: OpLog,
    current: Option<AudioTrack>,
}

impl LoopbackPlayback {
    pub fn new() -> Self {
        Self::with_log(OpLog::default())
    }

    pub fn with_log(ops: OpLog) -> Self {
        Self { ops, current: None }
    }

    pub fn current(&self) -> Option<&AudioTrack> {
        self.current.as_ref()
    }

    pub fn ops(&self) -> Vec<String> {
        self.ops.lock().expect("op log poisoned").clone()
    }
}

impl Default for LoopbackPlayback {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlaybackSink for LoopbackPlayback {
    async fn play(&mut self, track: AudioTrack) -> Result<(), MediaError> {
        record(&self.ops, format!("play:{}", track.id));
        self.current = Some(track);
        Ok(())
    }

    async fn stop(&mut self) {
        if self.current.take().is_some() {
            record(&self.ops, "stop");
        }
    }
}
