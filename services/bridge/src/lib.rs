//! Callbridge Library Crate
//!
//! Bridges a conferencing call with a voice-agent backend over a raw
//! WebSocket: microphone chunks go out as base64-in-JSON text frames, and
//! inbound JSON control frames drive the call lifecycle (setup / clear /
//! terminate). The `bridge` binary is a thin wrapper around this library
//! wired to the in-process loopback adapter.

pub mod audio;
pub mod config;
pub mod error;
pub mod protocol;
pub mod session;
