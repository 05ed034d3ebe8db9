//! Inbound envelope routing.
//!
//! Routing is a pure function of the envelope kind and the sender's current
//! [`PeerState`]. Every envelope maps to exactly one [`Transition`]:
//!
//! | Peer state      | Envelope         | Transition           | Result          |
//! |-----------------|------------------|----------------------|-----------------|
//! | not pending     | `friend_request` | [`RecordRequest`]    | request-pending |
//! | request-pending | `friend_request` | [`DuplicateRequest`] | unchanged       |
//! | any             | `friend_accept`  | [`ConfirmFriend`]    | friend          |
//! | friend          | `presence`       | [`UpdatePresence`]   | friend          |
//! | non-friend      | `presence`       | [`IgnorePresence`]   | unchanged       |
//! | any             | `message`        | [`DeliverMessage`]   | unchanged       |
//! | any             | unknown          | [`Ignore`]           | unchanged       |
//!
//! Direct messages are delivered regardless of friendship; only presence is
//! gated on it. Local accepts are not inbound and are handled by the
//! [`crate::Client`].
//!
//! [`RecordRequest`]: Transition::RecordRequest
//! [`DuplicateRequest`]: Transition::DuplicateRequest
//! [`ConfirmFriend`]: Transition::ConfirmFriend
//! [`UpdatePresence`]: Transition::UpdatePresence
//! [`IgnorePresence`]: Transition::IgnorePresence
//! [`DeliverMessage`]: Transition::DeliverMessage
//! [`Ignore`]: Transition::Ignore

use lobby_proto::{Envelope, Presence, Username};

use crate::{Notification, PeerState, RelationshipStore};

/// Row of the routing table selected for one inbound envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// First request from this peer.
    RecordRequest(Username),
    /// Peer already has a pending request.
    DuplicateRequest(Username),
    /// Peer accepted our request.
    ConfirmFriend(Username),
    /// Presence from a confirmed friend.
    UpdatePresence(Presence),
    /// Presence from anyone else.
    IgnorePresence(Username),
    /// Direct chat message.
    DeliverMessage {
        /// Sender.
        from: Username,
        /// Message text.
        content: String,
    },
    /// Unrecognized kind.
    Ignore,
}

/// Select the transition for `envelope`.
pub fn route(store: &RelationshipStore, envelope: Envelope) -> Transition {
    match envelope {
        Envelope::FriendRequest(request) => match store.peer_state(&request.from) {
            PeerState::RequestPending => Transition::DuplicateRequest(request.from),
            PeerState::Stranger | PeerState::Friend => Transition::RecordRequest(request.from),
        },
        Envelope::FriendAccept(accept) => Transition::ConfirmFriend(accept.from),
        Envelope::Presence(record) => match store.peer_state(&record.username) {
            PeerState::Friend => Transition::UpdatePresence(record),
            PeerState::Stranger | PeerState::RequestPending => {
                Transition::IgnorePresence(record.username)
            },
        },
        Envelope::Message(message) => {
            Transition::DeliverMessage { from: message.from, content: message.content }
        },
        Envelope::Unknown => Transition::Ignore,
    }
}

impl Transition {
    /// Apply the transition to the store.
    ///
    /// Returns the notification to surface, if the transition changed
    /// something the user should see.
    pub fn apply(self, store: &mut RelationshipStore) -> Option<Notification> {
        match self {
            Self::RecordRequest(from) => store
                .record_incoming_request(from.clone())
                .then_some(Notification::RequestReceived { from }),
            Self::ConfirmFriend(from) => store
                .apply_friend_accept(from.clone())
                .then_some(Notification::RequestAccepted { by: from }),
            Self::UpdatePresence(record) => store
                .apply_presence(record.clone())
                .then_some(Notification::PresenceChanged(record)),
            Self::DeliverMessage { from, content } => {
                Some(Notification::ChatMessage { from, content })
            },
            Self::DuplicateRequest(_) | Self::IgnorePresence(_) | Self::Ignore => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use lobby_proto::{DirectMessage, FriendAccept, FriendRequest, PresenceStatus};

    use super::*;

    fn user(name: &str) -> Username {
        Username::new(name).unwrap()
    }

    fn request(from: &str) -> Envelope {
        Envelope::FriendRequest(FriendRequest { from: user(from) })
    }

    fn presence(from: &str, activity: Option<&str>) -> Envelope {
        Envelope::Presence(Presence {
            username: user(from),
            status: PresenceStatus::Online,
            activity: activity.map(str::to_string),
        })
    }

    #[test]
    fn stranger_request_then_duplicate() {
        let mut store = RelationshipStore::new();

        let first = route(&store, request("bob"));
        assert_eq!(first, Transition::RecordRequest(user("bob")));
        assert_eq!(
            first.apply(&mut store),
            Some(Notification::RequestReceived { from: user("bob") })
        );

        let second = route(&store, request("bob"));
        assert_eq!(second, Transition::DuplicateRequest(user("bob")));
        assert_eq!(second.apply(&mut store), None);
    }

    #[test]
    fn accept_from_stranger_confirms() {
        let mut store = RelationshipStore::new();
        let accept = Envelope::FriendAccept(FriendAccept { from: user("alice") });

        let transition = route(&store, accept.clone());
        assert_eq!(
            transition.apply(&mut store),
            Some(Notification::RequestAccepted { by: user("alice") })
        );

        // Replays are silent.
        assert_eq!(route(&store, accept).apply(&mut store), None);
        assert_eq!(store.friend_count(), 1);
    }

    #[test]
    fn presence_gated_on_friendship() {
        let mut store = RelationshipStore::new();
        assert_eq!(
            route(&store, presence("carol", None)),
            Transition::IgnorePresence(user("carol"))
        );

        store.apply_friend_accept(user("bob"));
        let transition = route(&store, presence("bob", Some("Racer X")));
        assert!(matches!(transition, Transition::UpdatePresence(_)));
        assert!(matches!(transition.apply(&mut store), Some(Notification::PresenceChanged(_))));
        assert_eq!(
            store.presence(&user("bob")).and_then(|p| p.activity.as_deref()),
            Some("Racer X")
        );
    }

    #[test]
    fn pending_requester_presence_ignored() {
        let mut store = RelationshipStore::new();
        store.record_incoming_request(user("bob"));
        assert_eq!(route(&store, presence("bob", None)), Transition::IgnorePresence(user("bob")));
    }

    #[test]
    fn messages_from_strangers_delivered() {
        let store = RelationshipStore::new();
        let message =
            Envelope::Message(DirectMessage { from: user("carol"), content: "hi".into() });
        assert_eq!(route(&store, message), Transition::DeliverMessage {
            from: user("carol"),
            content: "hi".into()
        });
    }

    #[test]
    fn unknown_kind_ignored() {
        let mut store = RelationshipStore::new();
        let transition = route(&store, Envelope::Unknown);
        assert_eq!(transition, Transition::Ignore);
        assert_eq!(transition.apply(&mut store), None);
    }
}
