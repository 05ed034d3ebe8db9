//! Relationship store.
//!
//! In-memory social graph for one local identity: confirmed friends with
//! their latest presence, and identities whose requests are pending. Nothing
//! here is persisted; a restart starts empty. Outgoing requests are not
//! tracked at all.
//!
//! # Invariants
//!
//! - An identity appears at most once among confirmed friends.
//! - An identity appears at most once among pending requests.
//! - Presence is only stored for confirmed friends.

use std::collections::{BTreeMap, BTreeSet};

use lobby_proto::{Presence, Username};

/// Relationship of a peer to the local identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerState {
    /// No relationship.
    Stranger,
    /// Peer asked to be friends and we have not accepted yet.
    RequestPending,
    /// Handshake completed.
    Friend,
}

/// Friends, pending requests and presence.
#[derive(Debug, Clone, Default)]
pub struct RelationshipStore {
    /// Confirmed friends and their latest presence.
    friends: BTreeMap<Username, Presence>,
    /// Requests received but not yet accepted.
    pending: BTreeSet<Username>,
}

impl RelationshipStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Relationship of `peer`. Friendship wins over a pending request.
    pub fn peer_state(&self, peer: &Username) -> PeerState {
        if self.friends.contains_key(peer) {
            PeerState::Friend
        } else if self.pending.contains(peer) {
            PeerState::RequestPending
        } else {
            PeerState::Stranger
        }
    }

    /// Record an incoming request.
    ///
    /// Returns `false` if `from` was already pending.
    pub fn record_incoming_request(&mut self, from: Username) -> bool {
        self.pending.insert(from)
    }

    /// Move `from` from pending to confirmed friends with an optimistic online
    /// record. The next presence broadcast from `from` refines it.
    ///
    /// Returns `false` and changes nothing if `from` was not pending.
    pub fn accept_incoming(&mut self, from: &Username) -> bool {
        if !self.pending.remove(from) {
            return false;
        }
        self.friends.entry(from.clone()).or_insert_with(|| Presence::online(from.clone()));
        true
    }

    /// Replace a friend's presence record.
    ///
    /// Returns `false` and changes nothing if the record's identity is not a
    /// confirmed friend.
    pub fn apply_presence(&mut self, record: Presence) -> bool {
        match self.friends.get_mut(&record.username) {
            Some(current) => {
                *current = record;
                true
            },
            None => false,
        }
    }

    /// Complete the handshake on the requester's side.
    ///
    /// Inserts `from` into confirmed friends if absent and clears any crossed
    /// request from them. Returns `false` if nothing changed.
    pub fn apply_friend_accept(&mut self, from: Username) -> bool {
        let cleared = self.pending.remove(&from);
        if self.friends.contains_key(&from) {
            return cleared;
        }
        self.friends.insert(from.clone(), Presence::online(from));
        true
    }

    /// Check if `peer` is a confirmed friend.
    pub fn is_friend(&self, peer: &Username) -> bool {
        self.friends.contains_key(peer)
    }

    /// Check if `peer` has a pending request.
    pub fn is_pending(&self, peer: &Username) -> bool {
        self.pending.contains(peer)
    }

    /// Latest presence of a friend. `None` if not a friend.
    pub fn presence(&self, peer: &Username) -> Option<&Presence> {
        self.friends.get(peer)
    }

    /// Confirmed friends in name order.
    pub fn friends(&self) -> impl Iterator<Item = &Presence> {
        self.friends.values()
    }

    /// Pending requesters in name order.
    pub fn pending(&self) -> impl Iterator<Item = &Username> {
        self.pending.iter()
    }

    /// Number of confirmed friends.
    pub fn friend_count(&self) -> usize {
        self.friends.len()
    }

    /// Number of pending requests.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}
