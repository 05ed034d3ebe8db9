//! Lobby protocol types.
//!
//! Identities, channel addressing and the JSON envelope exchanged over the
//! publish/subscribe broker. Every instance shares one namespace; each
//! identity listens on its personal channel (`<namespace>/<username>`) and on
//! the broadcast channel (`<namespace>/global`).
//!
//! # Components
//!
//! - [`Username`]: validated identity string
//! - [`Namespace`] and [`Channel`]: topic naming
//! - [`Envelope`]: closed set of message kinds with an `Unknown` fallback
//! - [`encode`] / [`decode`]: JSON codec with a frame size limit

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod channel;
mod codec;
mod envelope;
mod errors;
mod identity;

pub use channel::{Channel, Namespace};
pub use codec::{MAX_FRAME_SIZE, decode, encode};
pub use envelope::{
    DirectMessage, Envelope, EnvelopeKind, FriendAccept, FriendRequest, Presence, PresenceStatus,
};
pub use errors::{ProtocolError, Result};
pub use identity::{MAX_USERNAME_LEN, Username};
