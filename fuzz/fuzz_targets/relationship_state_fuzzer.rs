//! Fuzz target for the client relationship state machine
//!
//! # Strategy
//!
//! Drive one client with an arbitrary interleaving of inbound envelopes and
//! local operations over a small set of peers so collisions are frequent.
//!
//! # Invariants
//!
//! - NEVER panic
//! - Inbound envelopes never publish
//! - An accepted identity is a friend and no longer pending
//! - Local operations that fail change nothing

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use lobby_client::{Client, ClientAction, ClientEvent, Session};
use lobby_proto::{
    DirectMessage, Envelope, FriendAccept, FriendRequest, Namespace, Presence, PresenceStatus,
    Username,
};

const PEERS: [&str; 4] = ["alice", "bob", "carol", "dave"];

#[derive(Debug, Clone, Arbitrary)]
enum Op {
    Request { from: u8 },
    Accepted { from: u8 },
    Presence { from: u8, online: bool, activity: Option<u8> },
    Message { from: u8, content: String },
    Accept { from: u8 },
    SendRequest { to: u8 },
    SendMessage { to: u8, content: String },
    Play { activity: Option<u8> },
}

fn peer(index: u8) -> Username {
    Username::new(PEERS[usize::from(index) % PEERS.len()]).unwrap()
}

fn activity(index: Option<u8>) -> Option<String> {
    index.map(|i| format!("game-{}", i % 4))
}

fuzz_target!(|ops: Vec<Op>| {
    let mut client = Client::new(Session::new(peer(0), Namespace::default()));
    let _ = client.handle(ClientEvent::Connected);

    for op in ops {
        let before = (client.store().friend_count(), client.store().pending_count());
        let accepted = match &op {
            Op::Accept { from } | Op::Accepted { from } => Some(peer(*from)),
            _ => None,
        };
        let (inbound, event) = match op {
            Op::Request { from } => (
                true,
                ClientEvent::EnvelopeReceived(Envelope::FriendRequest(FriendRequest {
                    from: peer(from),
                })),
            ),
            Op::Accepted { from } => (
                true,
                ClientEvent::EnvelopeReceived(Envelope::FriendAccept(FriendAccept {
                    from: peer(from),
                })),
            ),
            Op::Presence { from, online, activity: a } => {
                let status = if online { PresenceStatus::Online } else { PresenceStatus::Offline };
                let record = Presence { username: peer(from), status, activity: activity(a) };
                (true, ClientEvent::EnvelopeReceived(Envelope::Presence(record)))
            },
            Op::Message { from, content } => (
                true,
                ClientEvent::EnvelopeReceived(Envelope::Message(DirectMessage {
                    from: peer(from),
                    content,
                })),
            ),
            Op::Accept { from } => (false, ClientEvent::AcceptFriendRequest { from: peer(from) }),
            Op::SendRequest { to } => (false, ClientEvent::SendFriendRequest { to: peer(to) }),
            Op::SendMessage { to, content } => {
                (false, ClientEvent::SendMessage { to: peer(to), content })
            },
            Op::Play { activity: a } => {
                (false, ClientEvent::UpdatePresence { activity: activity(a) })
            },
        };

        match client.handle(event) {
            Ok(actions) => {
                if inbound {
                    assert!(actions.iter().all(|a| matches!(a, ClientAction::Notify(_))));
                }
                if let Some(who) = accepted {
                    assert!(client.store().is_friend(&who));
                    assert!(!client.store().is_pending(&who));
                }
            },
            Err(_) => {
                let after = (client.store().friend_count(), client.store().pending_count());
                assert_eq!(before, after);
            },
        }
    }
});
