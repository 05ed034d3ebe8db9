//! Message envelopes.
//!
//! An [`Envelope`] is the unit of transfer: one JSON object per frame, tagged
//! by a `type` field. Envelopes are immutable once built and never persisted.
//!
//! # Wire format
//!
//! | `type`           | fields                               | channel            |
//! |------------------|--------------------------------------|--------------------|
//! | `presence`       | `username`, `status`, `activity`     | global             |
//! | `message`        | `from`, `content`                    | recipient personal |
//! | `friend_request` | `from`                               | recipient personal |
//! | `friend_accept`  | `from`                               | requester personal |
//!
//! Older peers tag requests as `new_request`/`request_accepted` and name the
//! activity field `game`; both spellings decode. Any other `type` decodes to
//! [`Envelope::Unknown`] so newer peers can add kinds without breaking us.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Username;

/// Online status carried in a presence broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    /// Connected and reachable.
    #[serde(alias = "Online")]
    Online,
    /// Left the session.
    #[serde(alias = "Offline")]
    Offline,
}

impl fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Online => f.write_str("online"),
            Self::Offline => f.write_str("offline"),
        }
    }
}

/// Presence record of one identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presence {
    /// Identity the record describes.
    pub username: Username,
    /// Online status.
    pub status: PresenceStatus,
    /// What the identity is currently doing. `None` if idle.
    #[serde(default, alias = "game")]
    pub activity: Option<String>,
}

impl Presence {
    /// Online record with no activity.
    pub fn online(username: Username) -> Self {
        Self { username, status: PresenceStatus::Online, activity: None }
    }
}

/// Direct chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectMessage {
    /// Sender.
    pub from: Username,
    /// Message text.
    pub content: String,
}

/// Request to become friends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendRequest {
    /// Requester.
    pub from: Username,
}

/// Acceptance of an earlier friend request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendAccept {
    /// Accepter.
    pub from: Username,
}

/// All envelope kinds.
///
/// Closed set: routing matches exhaustively, so adding a kind is a compile
/// error everywhere it is not yet handled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Envelope {
    /// Presence broadcast.
    Presence(Presence),
    /// Direct chat message.
    Message(DirectMessage),
    /// Friend request.
    #[serde(alias = "new_request")]
    FriendRequest(FriendRequest),
    /// Friend request accepted.
    #[serde(alias = "request_accepted")]
    FriendAccept(FriendAccept),
    /// Kind this build does not understand.
    #[serde(other)]
    Unknown,
}

/// Discriminant of an [`Envelope`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvelopeKind {
    /// [`Envelope::Presence`]
    Presence,
    /// [`Envelope::Message`]
    Message,
    /// [`Envelope::FriendRequest`]
    FriendRequest,
    /// [`Envelope::FriendAccept`]
    FriendAccept,
    /// [`Envelope::Unknown`]
    Unknown,
}

impl Envelope {
    /// Kind of this envelope.
    pub fn kind(&self) -> EnvelopeKind {
        match self {
            Self::Presence(_) => EnvelopeKind::Presence,
            Self::Message(_) => EnvelopeKind::Message,
            Self::FriendRequest(_) => EnvelopeKind::FriendRequest,
            Self::FriendAccept(_) => EnvelopeKind::FriendAccept,
            Self::Unknown => EnvelopeKind::Unknown,
        }
    }

    /// Identity that produced the envelope. `None` for unknown kinds.
    pub fn sender(&self) -> Option<&Username> {
        match self {
            Self::Presence(p) => Some(&p.username),
            Self::Message(m) => Some(&m.from),
            Self::FriendRequest(r) => Some(&r.from),
            Self::FriendAccept(a) => Some(&a.from),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for EnvelopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Presence => "presence",
            Self::Message => "message",
            Self::FriendRequest => "friend_request",
            Self::FriendAccept => "friend_accept",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}
