//! Property-based tests for the App view model and the mailbox.
//!
//! The App keeps its own copy of friends and requests for rendering. These
//! properties check that the copy never drifts from the client's store, and
//! that inbound work scheduled through the mailbox runs in order exactly
//! once.

use std::collections::BTreeSet;

use lobby_app::{App, AppAction, AppEvent, Bridge, ConnectionState, mailbox};
use lobby_client::{Envelope, Namespace, Presence, PresenceStatus, Session, Username};
use lobby_proto::{DirectMessage, FriendAccept, FriendRequest};
use proptest::prelude::*;

const PEERS: [&str; 3] = ["bob", "carol", "dave"];

fn user(name: &str) -> Username {
    Username::new(name).unwrap()
}

#[derive(Debug, Clone)]
enum Step {
    Inbound(Envelope),
    Accept(Username),
    Play(Option<String>),
}

fn peer() -> impl Strategy<Value = Username> {
    prop::sample::select(PEERS.to_vec()).prop_map(user)
}

fn activity() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop::sample::select(vec!["Racer X", "Chess"]).prop_map(str::to_string))
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => peer().prop_map(|from| Step::Inbound(Envelope::FriendRequest(FriendRequest { from }))),
        2 => peer().prop_map(|from| Step::Inbound(Envelope::FriendAccept(FriendAccept { from }))),
        3 => (peer(), any::<bool>(), activity()).prop_map(|(username, online, activity)| {
            let status = if online { PresenceStatus::Online } else { PresenceStatus::Offline };
            Step::Inbound(Envelope::Presence(Presence { username, status, activity }))
        }),
        1 => peer().prop_map(|from| {
            Step::Inbound(Envelope::Message(DirectMessage { from, content: "hi".into() }))
        }),
        2 => peer().prop_map(Step::Accept),
        1 => activity().prop_map(Step::Play),
    ]
}

/// App and Bridge wired the way the runtime wires them, minus I/O.
struct Harness {
    app: App,
    bridge: Bridge,
}

impl Harness {
    fn connected() -> Self {
        let session = Session::new(user("alice"), Namespace::default());
        let mut harness = Self { app: App::new(user("alice")), bridge: Bridge::new(session) };
        let events = harness.bridge.handle_connected();
        harness.feed(events);
        harness
    }

    fn feed(&mut self, events: Vec<AppEvent>) {
        let mut pending = Vec::new();
        for event in events {
            pending.extend(self.app.handle(event));
        }
        while let Some(action) = pending.pop() {
            for event in self.bridge.process_app_action(action) {
                pending.extend(self.app.handle(event));
            }
        }
        self.bridge.take_outgoing();
    }

    fn apply(&mut self, step: Step) {
        let events = match step {
            Step::Inbound(envelope) => self.bridge.handle_envelope(envelope),
            Step::Accept(from) => {
                let actions = self.app.accept_request(from);
                self.execute(actions)
            },
            Step::Play(activity) => {
                let actions = self.app.set_activity(activity);
                self.execute(actions)
            },
        };
        self.feed(events);
    }

    fn execute(&mut self, actions: Vec<AppAction>) -> Vec<AppEvent> {
        actions.into_iter().flat_map(|action| self.bridge.process_app_action(action)).collect()
    }
}

proptest! {
    #[test]
    fn prop_view_matches_store(steps in prop::collection::vec(step(), 0..40)) {
        let mut harness = Harness::connected();
        prop_assert_eq!(harness.app.connection_state(), ConnectionState::Connected);

        for step in steps {
            harness.apply(step);

            let store = harness.bridge.client().store();
            let friends: Vec<&Presence> = harness.app.friends().values().collect();
            let expected: Vec<&Presence> = store.friends().collect();
            prop_assert_eq!(friends, expected);

            let requests: BTreeSet<&Username> = harness.app.requests().iter().collect();
            let pending: BTreeSet<&Username> = store.pending().collect();
            prop_assert_eq!(requests, pending);
        }
    }

    #[test]
    fn prop_protocol_actions_refused_offline(steps in prop::collection::vec(step(), 0..10)) {
        let mut app = App::new(user("alice"));
        for step in steps {
            let actions = match step {
                Step::Accept(from) => app.accept_request(from),
                Step::Play(activity) => app.set_activity(activity),
                Step::Inbound(_) => continue,
            };
            prop_assert_eq!(actions, vec![AppAction::Render]);
        }
    }

    #[test]
    fn prop_mailbox_preserves_order(values in prop::collection::vec(any::<u16>(), 0..64)) {
        let (scheduler, mut mailbox) = mailbox::mailbox::<Vec<u16>>();
        for value in values.clone() {
            scheduler.schedule(move |log| log.push(value)).unwrap();
        }

        let mut log = Vec::new();
        prop_assert_eq!(mailbox.run_pending(&mut log), values.len());
        prop_assert_eq!(mailbox.run_pending(&mut log), 0);
        prop_assert_eq!(log, values);
    }
}
