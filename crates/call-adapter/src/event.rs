//! Call lifecycle events and the participant/track shapes they carry.

/// Liveness of a media track as reported by the SDK.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackState {
    Live,
    Ended,
}

/// An opaque handle to an audio track owned by the underlying media stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioTrack {
    /// SDK-assigned track identifier.
    pub id: String,
    pub state: TrackState,
}

impl AudioTrack {
    pub fn live(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: TrackState::Live,
        }
    }

    pub fn is_live(&self) -> bool {
        self.state == TrackState::Live
    }
}

/// A remote participant as reported by a call event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    /// Display name the participant joined with.
    pub user_name: String,
    /// The participant's audio track, if the SDK has negotiated one.
    pub audio: Option<AudioTrack>,
}

impl Participant {
    /// The participant's audio track, but only while it is live.
    pub fn live_audio(&self) -> Option<&AudioTrack> {
        self.audio.as_ref().filter(|t| t.is_live())
    }
}

/// Lifecycle events emitted by a [`crate::CallSession`].
#[derive(Debug, Clone)]
pub enum CallEvent {
    /// The local participant finished joining the room.
    Joined,
    /// The local participant left the room.
    Left,
    /// A remote participant's state (including tracks) changed.
    ParticipantUpdated(Participant),
    /// A remote participant's track started producing media.
    TrackStarted(Participant),
}
