//! Manages the bridge session: one WebSocket to the agent backend, one
//! conferencing call, and the event loop relaying between them.
//!
//! All control frames and call events are handled on a single task, so they
//! are processed strictly in arrival order. The only spawned worker is the
//! capture task, which forwards paced microphone chunks to the socket sink.

use crate::{
    audio,
    config::Config,
    error::BridgeError,
    protocol::{Control, OutboundFrame},
};
use bytes::Bytes;
use call_adapter::{CallEvent, CallSession, JoinOptions, MediaDevices, Participant, PlaybackSink};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::{
    sync::{broadcast, mpsc, oneshot, watch},
    task::JoinHandle,
};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};
use tracing::{Instrument, debug, error, info, warn};
use uuid::Uuid;

/// Lifecycle phase of a bridge session.
///
/// `Muted` is a side branch of `Streaming`: a clear frame silences local
/// playback but capture keeps running, and a fresh agent track resumes
/// streaming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Joined,
    Streaming,
    Muted,
    Terminated,
}

/// What the socket loop should do after a control frame was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Continue,
    CloseSocket,
}

/// State of one bridge session, owning the call handle, the active playback,
/// and the capture task.
pub struct Session<C, M, P> {
    call: Arc<C>,
    media: Arc<M>,
    playback: P,
    /// Local display name used when joining a room.
    agent_id: String,
    /// Remote participant whose audio is played back.
    agent_user_name: String,
    chunk_interval: Duration,
    phase: Phase,
    call_connected: bool,
    outbound: mpsc::Sender<OutboundFrame>,
    socket_open: watch::Receiver<bool>,
    capture: Option<JoinHandle<()>>,
}

impl<C, M, P> Session<C, M, P>
where
    C: CallSession,
    M: MediaDevices + 'static,
    P: PlaybackSink,
{
    pub fn new(
        call: Arc<C>,
        media: Arc<M>,
        playback: P,
        config: &Config,
        outbound: mpsc::Sender<OutboundFrame>,
        socket_open: watch::Receiver<bool>,
    ) -> Self {
        Self {
            call,
            media,
            playback,
            agent_id: config.agent_id.clone(),
            agent_user_name: config.agent_user_name.clone(),
            chunk_interval: config.chunk_interval,
            phase: Phase::Idle,
            call_connected: false,
            outbound,
            socket_open,
            capture: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Two-state textual status surfaced to the user.
    pub fn status(&self) -> &'static str {
        if self.call_connected {
            "connected"
        } else {
            "waiting"
        }
    }

    /// Parses one inbound text frame and handles it. Malformed JSON is
    /// logged and dropped without touching the call session.
    pub async fn handle_frame(&mut self, text: &str) -> Disposition {
        match Control::parse(text) {
            Ok(control) => self.handle_control(control).await,
            Err(e) => {
                error!(error = %e, "Dropping malformed control frame");
                Disposition::Continue
            }
        }
    }

    /// Handles one classified control instruction.
    pub async fn handle_control(&mut self, control: Control) -> Disposition {
        match control {
            Control::Setup { room_url } => {
                if self.phase != Phase::Idle {
                    warn!(phase = ?self.phase, "Ignoring setup; session is not idle");
                    return Disposition::Continue;
                }
                let Some(room_url) = room_url else {
                    warn!("Setup frame carried no room_url; ignoring");
                    return Disposition::Continue;
                };
                // Errors here leave the session in its partial state; the
                // backend decides whether to retry with a new setup.
                if let Err(e) = self.join_room(&room_url).await {
                    error!(error = %e, "Error capturing audio or joining room");
                }
                Disposition::Continue
            }
            Control::KeepAlive => {
                debug!("Connection is running");
                Disposition::Continue
            }
            Control::Clear => {
                info!("Clearing local playback");
                self.playback.stop().await;
                self.call_connected = false;
                if self.phase == Phase::Streaming {
                    self.phase = Phase::Muted;
                }
                Disposition::Continue
            }
            Control::Terminate => {
                info!("Terminal control frame received. Tearing down call session");
                self.teardown().await;
                Disposition::CloseSocket
            }
        }
    }

    /// The setup path: microphone, then join, then remote recording, then
    /// chunked capture.
    async fn join_room(&mut self, room_url: &str) -> Result<(), BridgeError> {
        let mic = self.media.open_microphone(self.chunk_interval).await?;
        self.call
            .join(JoinOptions::audio_only(
                room_url,
                mic.track.clone(),
                self.agent_id.clone(),
            ))
            .await?;
        self.call.start_recording().await?;
        self.phase = Phase::Joined;
        self.call_connected = true;

        self.capture = Some(spawn_capture(
            mic.chunks,
            self.outbound.clone(),
            self.socket_open.clone(),
        ));
        self.phase = Phase::Streaming;
        info!(room_url, "Joined room and started audio capture");
        Ok(())
    }

    /// Handles one SDK lifecycle event.
    pub async fn handle_call_event(&mut self, event: CallEvent) {
        match event {
            CallEvent::Joined => {
                self.call_connected = true;
                info!(status = self.status(), "Joined meeting");
            }
            CallEvent::Left => {
                self.call_connected = false;
                info!(status = self.status(), "Left meeting");
            }
            CallEvent::ParticipantUpdated(participant) | CallEvent::TrackStarted(participant) => {
                self.maybe_play_agent_track(participant).await;
            }
        }
    }

    /// Swaps the active playback to the agent's track. The previous source
    /// is always stopped first, on both event paths.
    async fn maybe_play_agent_track(&mut self, participant: Participant) {
        if participant.user_name != self.agent_user_name {
            return;
        }
        let Some(track) = participant.live_audio().cloned() else {
            return;
        };
        self.playback.stop().await;
        if let Err(e) = self.playback.play(track).await {
            error!(error = %e, "Failed to start agent playback");
            return;
        }
        if self.phase == Phase::Muted {
            self.phase = Phase::Streaming;
        }
        debug!("Playing agent audio track");
    }

    /// Stops capture and playback, stops remote recording, and destroys the
    /// call session, in that order. Idempotent: the second invocation
    /// performs no SDK call.
    pub async fn teardown(&mut self) {
        if self.phase == Phase::Terminated {
            return;
        }
        self.phase = Phase::Terminated;
        if let Some(handle) = self.capture.take() {
            handle.abort();
        }
        self.playback.stop().await;
        if let Err(e) = self.call.stop_recording().await {
            error!(error = %e, "Failed to stop recording during teardown");
        }
        if let Err(e) = self.call.destroy().await {
            error!(error = %e, "Failed to destroy call session during teardown");
        }
        self.call_connected = false;
        info!("Call session destroyed");
    }
}

/// Forwards captured chunks to the socket sink as base64 audio frames, but
/// only while the socket-open flag holds.
fn spawn_capture(
    mut chunks: mpsc::Receiver<Bytes>,
    outbound: mpsc::Sender<OutboundFrame>,
    socket_open: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(chunk) = chunks.recv().await {
            if chunk.is_empty() {
                continue;
            }
            if !*socket_open.borrow() {
                continue;
            }
            let frame = OutboundFrame::Audio {
                data: audio::encode_chunk(&chunk),
            };
            if outbound.send(frame).await.is_err() {
                break;
            }
        }
        debug!("Capture stream ended");
    })
}

/// Runs one bridge session to completion.
///
/// Connects the WebSocket, then relays inbound control frames, outbound
/// audio frames, and call events until a terminal frame, a socket
/// close/error, or the shutdown signal ends the loop. Every exit path
/// funnels through the same idempotent teardown before the socket is closed.
pub async fn run<C, M, P>(
    config: &Config,
    call: Arc<C>,
    media: Arc<M>,
    playback: P,
    mut shutdown: oneshot::Receiver<()>,
) -> Result<(), BridgeError>
where
    C: CallSession + 'static,
    M: MediaDevices + 'static,
    P: PlaybackSink,
{
    let session_id = Uuid::new_v4();
    let span = tracing::info_span!("bridge_session", %session_id, agent_id = %config.agent_id);

    async move {
        let url = config.websocket_url();
        let (ws_stream, _) = connect_async(url.as_str()).await?;
        info!("WebSocket connection opened");
        let (mut ws_tx, mut ws_rx) = ws_stream.split();

        let (outbound_tx, mut outbound_rx) = mpsc::channel(128);
        let (open_tx, open_rx) = watch::channel(true);
        let mut call_events = call.subscribe();
        let mut session = Session::new(call, media, playback, config, outbound_tx, open_rx);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested. Tearing down session");
                    break;
                }
                maybe_msg = ws_rx.next() => match maybe_msg {
                    Some(Ok(Message::Text(text))) => {
                        if session.handle_frame(text.as_str()).await == Disposition::CloseSocket {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        info!("WebSocket connection closed by server");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        error!(error = %e, "WebSocket error");
                        break;
                    }
                    None => {
                        info!("WebSocket stream ended");
                        break;
                    }
                },
                Some(frame) = outbound_rx.recv() => {
                    let serialized = serde_json::to_string(&frame)?;
                    if let Err(e) = ws_tx.send(Message::Text(serialized.into())).await {
                        error!(error = %e, "Failed to send audio frame");
                        break;
                    }
                }
                event = call_events.recv() => match event {
                    Ok(event) => session.handle_call_event(event).await,
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!(missed, "Lagged behind call events");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        warn!("Call event channel closed");
                        break;
                    }
                },
            }
        }

        // Late capture chunks must not race the close frame.
        let _ = open_tx.send(false);
        session.teardown().await;
        if let Err(e) = ws_tx.send(Message::Close(None)).await {
            debug!(error = %e, "Close frame not delivered");
        }
        info!("WebSocket connection closed");
        Ok(())
    }
    .instrument(span)
    .await
}
