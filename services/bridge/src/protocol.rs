//! Defines the WebSocket message protocol between the bridge and the agent
//! backend.

use serde::{Deserialize, Serialize};

/// Raw shape of an inbound control frame. The backend sends plain JSON
/// objects rather than a tagged union, so classification happens after
/// deserialization (see [`Control`]).
#[derive(Deserialize, Debug, Clone)]
pub struct ControlFrame {
    /// Whether the backend considers the session live.
    #[serde(default)]
    pub connection: bool,
    /// Lifecycle phase tag; absent on pure terminate frames.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Conference room to join; only meaningful on setup frames.
    pub room_url: Option<String>,
}

/// Classified lifecycle instruction carried by a control frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    /// Join the named room and begin streaming microphone audio.
    Setup { room_url: Option<String> },
    /// Session is live; nothing to do.
    KeepAlive,
    /// Stop local playback; capture continues.
    Clear,
    /// Tear the session down: stop recording, destroy the call, close the
    /// socket.
    Terminate,
}

impl ControlFrame {
    pub fn classify(self) -> Control {
        match (self.connection, self.kind.as_deref()) {
            (true, Some("setup")) => Control::Setup {
                room_url: self.room_url,
            },
            (true, Some("clear")) => Control::Clear,
            (true, _) => Control::KeepAlive,
            (false, _) => Control::Terminate,
        }
    }
}

impl Control {
    /// Parses and classifies one inbound text frame.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<ControlFrame>(text).map(ControlFrame::classify)
    }
}

/// Messages sent from the bridge to the agent backend.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundFrame {
    /// A chunk of microphone audio, base64 encoded.
    Audio { data: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_frame_classification() {
        let ctl =
            Control::parse(r#"{"connection":true,"type":"setup","room_url":"https://x/y"}"#)
                .unwrap();
        assert_eq!(
            ctl,
            Control::Setup {
                room_url: Some("https://x/y".to_string())
            }
        );
    }

    #[test]
    fn test_setup_frame_without_room_url() {
        let ctl = Control::parse(r#"{"connection":true,"type":"setup"}"#).unwrap();
        assert_eq!(ctl, Control::Setup { room_url: None });
    }

    #[test]
    fn test_clear_frame_classification() {
        let ctl = Control::parse(r#"{"connection":true,"type":"clear"}"#).unwrap();
        assert_eq!(ctl, Control::Clear);
    }

    #[test]
    fn test_other_live_frames_are_keepalive() {
        let ctl = Control::parse(r#"{"connection":true,"type":"ack"}"#).unwrap();
        assert_eq!(ctl, Control::KeepAlive);

        let ctl = Control::parse(r#"{"connection":true}"#).unwrap();
        assert_eq!(ctl, Control::KeepAlive);
    }

    #[test]
    fn test_falsy_connection_is_terminate() {
        let ctl = Control::parse(r#"{"connection":false}"#).unwrap();
        assert_eq!(ctl, Control::Terminate);

        // A missing connection flag reads as falsy, like the source treated it.
        let ctl = Control::parse(r#"{"type":"setup","room_url":"https://x/y"}"#).unwrap();
        assert_eq!(ctl, Control::Terminate);
    }

    #[test]
    fn test_malformed_frame_is_an_error() {
        assert!(Control::parse("not json").is_err());
        assert!(Control::parse("[1,2,3]").is_err());
    }

    #[test]
    fn test_outbound_audio_frame_shape() {
        let frame = OutboundFrame::Audio {
            data: "YXVkaW8=".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&frame).unwrap(),
            r#"{"type":"audio","data":"YXVkaW8="}"#
        );
    }
}
