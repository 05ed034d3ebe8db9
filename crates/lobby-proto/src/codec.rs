//! JSON envelope codec.
//!
//! One envelope per frame. Decoding never panics: anything that is not a
//! well-formed envelope becomes [`ProtocolError::Decode`], and the receive
//! side logs and drops it.

use crate::{Envelope, ProtocolError, Result};

/// Maximum encoded frame size (64 KiB).
pub const MAX_FRAME_SIZE: usize = 64 * 1024;

/// Encode an envelope into a frame.
pub fn encode(envelope: &Envelope) -> Result<Vec<u8>> {
    let bytes = serde_json::to_vec(envelope).map_err(|e| ProtocolError::Encode(e.to_string()))?;
    if bytes.len() > MAX_FRAME_SIZE {
        return Err(ProtocolError::FrameTooLarge { size: bytes.len(), max: MAX_FRAME_SIZE });
    }
    Ok(bytes)
}

/// Decode a frame into an envelope.
pub fn decode(bytes: &[u8]) -> Result<Envelope> {
    if bytes.len() > MAX_FRAME_SIZE {
        return Err(ProtocolError::FrameTooLarge { size: bytes.len(), max: MAX_FRAME_SIZE });
    }
    serde_json::from_slice(bytes).map_err(|e| ProtocolError::Decode(e.to_string()))
}
