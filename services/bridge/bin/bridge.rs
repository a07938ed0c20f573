//! Main Entrypoint for the bridge dev binary
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Initializing logging.
//! 3. Wiring the bridge to the in-process loopback adapter (a real
//!    deployment substitutes a concrete conferencing SDK binding).
//! 4. Running one bridge session with graceful Ctrl+C shutdown.

use anyhow::Context;
use call_adapter::loopback::{LoopbackCall, LoopbackMedia, LoopbackPlayback};
use callbridge::{config::Config, session};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::info;

/// Bytes of silence per chunk fed by the loopback microphone; sized for
/// roughly 200 ms of 16 kHz mono PCM16.
const SILENCE_CHUNK_LEN: usize = 6400;

/// Listens for the `Ctrl+C` signal and triggers session teardown.
async fn shutdown_signal(trigger: oneshot::Sender<()>) {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    info!("Received shutdown signal. Shutting down gracefully...");
    let _ = trigger.send(());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    info!(
        agent_id = %config.agent_id,
        "Configuration loaded. Connecting to agent backend..."
    );

    let call = Arc::new(LoopbackCall::new());
    let media = Arc::new(LoopbackMedia::silence(SILENCE_CHUNK_LEN));
    let playback = LoopbackPlayback::new();

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    tokio::spawn(shutdown_signal(shutdown_tx));

    session::run(&config, call, media, playback, shutdown_rx)
        .await
        .context("Bridge session failed")?;

    info!("Bridge has shut down.");
    Ok(())
}
