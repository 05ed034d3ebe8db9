//! Protocol error types.

use thiserror::Error;

/// Convenience alias for protocol results.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors produced while validating, encoding or decoding protocol data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Username failed validation.
    #[error("invalid username {name:?}: {reason}")]
    InvalidUsername {
        /// Rejected input.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// Namespace failed validation.
    #[error("invalid namespace {namespace:?}: {reason}")]
    InvalidNamespace {
        /// Rejected input.
        namespace: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// Envelope could not be serialized.
    #[error("encode failed: {0}")]
    Encode(String),

    /// Frame is not a valid envelope.
    #[error("decode failed: {0}")]
    Decode(String),

    /// Frame exceeds [`crate::MAX_FRAME_SIZE`].
    #[error("frame too large: {size} bytes (max {max})")]
    FrameTooLarge {
        /// Actual size in bytes.
        size: usize,
        /// Maximum allowed size in bytes.
        max: usize,
    },
}
