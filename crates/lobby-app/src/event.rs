//! Application input events.
//!
//! This module defines [`AppEvent`], the set of inputs that drive the
//! [`crate::App`] state machine.
//!
//! Events originate from two distinct sources:
//! - User commands typed into the frontend.
//! - Protocol notifications translated from the underlying client.

use lobby_client::Notification;
use lobby_proto::{Presence, Username};

use crate::Command;

/// Events processed by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// User command.
    Input(Command),

    /// Connected to the broker.
    Connected,

    /// Connection attempt failed.
    ConnectFailed {
        /// Failure description.
        reason: String,
    },

    /// Disconnected from the broker.
    Disconnected,

    /// The transport dropped the connection without being asked to.
    ConnectionLost,

    /// Direct message received.
    MessageReceived {
        /// Sender.
        from: Username,
        /// Message text.
        content: String,
    },

    /// Direct message handed to the broker.
    MessageSent {
        /// Recipient.
        to: Username,
        /// Message text.
        content: String,
    },

    /// A friend's presence changed.
    PresenceChanged(Presence),

    /// Incoming friend request.
    RequestReceived {
        /// Requester.
        from: Username,
    },

    /// A request we sent was accepted.
    RequestAccepted {
        /// Accepter.
        by: Username,
    },

    /// Friend request handed to the broker.
    RequestSent {
        /// Recipient.
        to: Username,
    },

    /// We accepted a pending request.
    FriendAdded {
        /// New friend.
        username: Username,
    },

    /// Our activity changed.
    ActivityChanged {
        /// New activity. `None` if idle.
        activity: Option<String>,
    },

    /// Error occurred.
    Error {
        /// Error description.
        message: String,
    },
}

impl From<Notification> for AppEvent {
    fn from(notification: Notification) -> Self {
        match notification {
            Notification::ChatMessage { from, content } => Self::MessageReceived { from, content },
            Notification::PresenceChanged(record) => Self::PresenceChanged(record),
            Notification::RequestReceived { from } => Self::RequestReceived { from },
            Notification::RequestAccepted { by } => Self::RequestAccepted { by },
        }
    }
}
