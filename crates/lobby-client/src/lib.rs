//! Client
//!
//! Action-based client state machine for the Lobby presence protocol. Tracks
//! confirmed friends, pending incoming requests and friend presence for one
//! local identity.
//!
//! # Architecture
//!
//! The client is Sans-IO. It receives events ([`ClientEvent`]), runs them
//! through the [`router`] transition table, and returns actions
//! ([`ClientAction`]) for the caller to execute: publications to put on the
//! broker and notifications to surface to the user.
//!
//! All state lives in one owned [`Client`]; it is never shared between
//! threads. Inbound frames reach it only through the caller's consumer loop.
//!
//! # Components
//!
//! - [`Client`]: top-level state machine
//! - [`Session`]: local identity, channel policy and envelope builders
//! - [`RelationshipStore`]: friends, pending requests and presence
//! - [`router`]: classification of inbound envelopes
//!
//! # Transport (optional)
//!
//! With the `transport` feature enabled, this crate also provides:
//! - [`transport::Connection`]: MQTT connection with a background receive loop
//! - [`transport::connect`]: connect to a broker

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod client;
mod error;
mod event;
pub mod router;
mod session;
mod store;

#[cfg(feature = "transport")]
pub mod transport;

pub use client::Client;
pub use error::ClientError;
pub use event::{ClientAction, ClientEvent, InboundHandler, Notification, Publication};
pub use lobby_proto::{Channel, Envelope, Namespace, Presence, PresenceStatus, Username};
pub use session::Session;
pub use store::{PeerState, RelationshipStore};
