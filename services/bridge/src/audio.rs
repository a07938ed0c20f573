//! Base64 transport encoding for captured audio chunks.
//!
//! Chunks are opaque to the bridge: whatever container or PCM layout the
//! recorder produces goes over the wire byte-for-byte, base64 encoded inside
//! a JSON envelope.

use base64::Engine;
use bytes::Bytes;

/// Encodes a captured chunk for the `{"type":"audio","data":...}` envelope.
pub fn encode_chunk(chunk: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(chunk)
}

/// Decodes a base64 payload back into chunk bytes. Returns an empty buffer
/// on malformed input, logging instead of failing the session.
pub fn decode_chunk(data: &str) -> Bytes {
    match base64::engine::general_purpose::STANDARD.decode(data) {
        Ok(bytes) => Bytes::from(bytes),
        Err(_) => {
            tracing::error!("Failed to decode base64 audio payload");
            Bytes::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_chunk_known_value() {
        assert_eq!(encode_chunk(b"audio"), "YXVkaW8=");
        assert_eq!(encode_chunk(&[]), "");
    }

    #[test]
    fn test_decode_chunk_round_trip() {
        let chunk = vec![0x00u8, 0x40, 0xff, 0x7f, 0x01];
        let decoded = decode_chunk(&encode_chunk(&chunk));
        assert_eq!(decoded.as_ref(), chunk.as_slice());
    }

    #[test]
    fn test_decode_chunk_invalid_input() {
        assert!(decode_chunk("not base64!").is_empty());
        assert!(decode_chunk("").is_empty());
    }
}
