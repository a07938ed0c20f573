//! Seams around the conferencing SDK and browser-style media devices.
//!
//! The bridge never talks to a concrete conferencing stack directly. Instead
//! it consumes three traits defined here:
//!
//! - [`CallSession`]: join a room, control remote recording, tear down, and
//!   subscribe to lifecycle events.
//! - [`MediaDevices`]: acquire a microphone plus a paced chunk stream.
//! - [`PlaybackSink`]: play or stop a remote audio track locally.
//!
//! The [`loopback`] module provides in-process implementations of all three,
//! used by the dev binary and by tests.

pub mod event;
pub mod loopback;
pub mod media;
pub mod session;

pub use event::{AudioTrack, CallEvent, Participant, TrackState};
pub use media::{MediaDevices, MediaError, Microphone, PlaybackSink};
pub use session::{CallError, CallSession, JoinOptions};
