//! Client error types.

use lobby_proto::Username;
use thiserror::Error;

/// Errors returned for local operations the client refuses.
///
/// Inbound envelopes never produce errors; the router accepts or ignores
/// them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Message content was empty.
    #[error("message to {to} is empty")]
    EmptyMessage {
        /// Intended recipient.
        to: Username,
    },

    /// Friend request addressed to the local identity.
    #[error("cannot send a friend request to yourself")]
    SelfRequest,

    /// Accept called for an identity with no pending request.
    #[error("no pending friend request from {from}")]
    NoPendingRequest {
        /// Identity that was accepted.
        from: Username,
    },
}
