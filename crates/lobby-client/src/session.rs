//! Local identity and channel policy.
//!
//! The [`Session`] owns everything needed to address and build envelopes so
//! callers never hand-construct wire payloads. Point-to-point kinds go to the
//! recipient's personal channel; presence goes to the global channel, which
//! any listener can read.

use lobby_proto::{
    Channel, DirectMessage, Envelope, FriendAccept, FriendRequest, Namespace, Presence,
    PresenceStatus, Username,
};

use crate::Publication;

/// Per-process identity and channel naming.
#[derive(Debug, Clone)]
pub struct Session {
    identity: Username,
    namespace: Namespace,
    /// Activity carried by presence broadcasts. `None` if idle.
    activity: Option<String>,
}

impl Session {
    /// Create a session for `identity` under `namespace`.
    pub fn new(identity: Username, namespace: Namespace) -> Self {
        Self { identity, namespace, activity: None }
    }

    /// Local identity.
    pub fn identity(&self) -> &Username {
        &self.identity
    }

    /// Shared namespace.
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Current activity. `None` if idle.
    pub fn activity(&self) -> Option<&str> {
        self.activity.as_deref()
    }

    /// Replace the current activity.
    pub fn set_activity(&mut self, activity: Option<String>) {
        self.activity = activity;
    }

    /// Personal channel of `username`.
    pub fn personal_channel(&self, username: &Username) -> Channel {
        self.namespace.personal(username)
    }

    /// Broadcast channel.
    pub fn global_channel(&self) -> Channel {
        self.namespace.global()
    }

    /// Channels the local identity listens on: its own personal channel and
    /// the broadcast channel.
    pub fn subscriptions(&self) -> [Channel; 2] {
        [self.personal_channel(&self.identity), self.global_channel()]
    }

    /// Presence envelope for the local identity.
    pub fn presence_envelope(&self, status: PresenceStatus, activity: Option<String>) -> Envelope {
        Envelope::Presence(Presence { username: self.identity.clone(), status, activity })
    }

    /// Direct message from the local identity.
    pub fn direct_message_envelope(&self, content: String) -> Envelope {
        Envelope::Message(DirectMessage { from: self.identity.clone(), content })
    }

    /// Friend request from the local identity.
    pub fn friend_request_envelope(&self) -> Envelope {
        Envelope::FriendRequest(FriendRequest { from: self.identity.clone() })
    }

    /// Friend acceptance from the local identity.
    pub fn friend_accept_envelope(&self) -> Envelope {
        Envelope::FriendAccept(FriendAccept { from: self.identity.clone() })
    }

    /// Address an envelope to `recipient`'s personal channel.
    pub fn to_peer(&self, recipient: &Username, envelope: Envelope) -> Publication {
        Publication { channel: self.personal_channel(recipient), envelope }
    }

    /// Presence broadcast carrying the current activity.
    pub fn announce(&self, status: PresenceStatus) -> Publication {
        let activity = match status {
            PresenceStatus::Online => self.activity.clone(),
            PresenceStatus::Offline => None,
        };
        Publication {
            channel: self.global_channel(),
            envelope: self.presence_envelope(status, activity),
        }
    }
}
