//! End-to-end friend handshake and presence scenarios.
//!
//! Several runtimes share one in-memory broker. Each step performs a user
//! operation, then [`settle`] runs queued inbound work on every consumer
//! before state is inspected.

use lobby_app::{AppEvent, Command, ConnectionState, Driver};
use lobby_client::{Envelope, Notification, Presence, PresenceStatus, Username};
use lobby_harness::{MemoryBroker, SimDriver, settle, sim_runtime};
use lobby_proto::{DirectMessage, FriendAccept};

type Runtime = lobby_app::Runtime<SimDriver>;

fn user(name: &str) -> Username {
    Username::new(name).unwrap()
}

async fn online(broker: &MemoryBroker, name: &str) -> Runtime {
    let mut runtime = sim_runtime(broker, name).unwrap();
    assert!(runtime.connect().await.unwrap());
    runtime
}

/// alice and bob connected and confirmed friends.
async fn befriended(broker: &MemoryBroker) -> (Runtime, Runtime) {
    let mut alice = online(broker, "alice").await;
    let mut bob = online(broker, "bob").await;

    bob.send_friend_request(user("alice")).await.unwrap();
    settle(&mut [&mut alice, &mut bob]).await.unwrap();
    alice.accept_friend_request(user("bob")).await.unwrap();
    settle(&mut [&mut alice, &mut bob]).await.unwrap();

    (alice, bob)
}

#[tokio::test]
async fn friend_handshake_completes_on_both_sides() {
    let broker = MemoryBroker::new();
    let mut alice = online(&broker, "alice").await;
    let mut bob = online(&broker, "bob").await;

    bob.send_friend_request(user("alice")).await.unwrap();
    settle(&mut [&mut alice, &mut bob]).await.unwrap();

    let pending: Vec<&Username> = alice.client().store().pending().collect();
    assert_eq!(pending, vec![&user("bob")]);
    assert!(alice.app().requests().contains(&user("bob")));
    assert!(
        alice
            .driver()
            .notifications()
            .contains(&Notification::RequestReceived { from: user("bob") })
    );

    alice.accept_friend_request(user("bob")).await.unwrap();
    settle(&mut [&mut alice, &mut bob]).await.unwrap();

    assert!(alice.client().store().is_friend(&user("bob")));
    assert_eq!(alice.client().store().pending_count(), 0);
    assert!(alice.app().requests().is_empty());

    assert!(bob.client().store().is_friend(&user("alice")));
    assert!(bob.app().friends().contains_key(&user("alice")));
    assert!(
        bob.driver()
            .notifications()
            .contains(&Notification::RequestAccepted { by: user("alice") })
    );
}

#[tokio::test]
async fn presence_reaches_friends_only() {
    let broker = MemoryBroker::new();
    let (mut alice, mut bob) = befriended(&broker).await;
    let mut carol = online(&broker, "carol").await;

    bob.update_presence(Some("Racer X".to_string())).await.unwrap();
    settle(&mut [&mut alice, &mut bob, &mut carol]).await.unwrap();

    let expected = Presence {
        username: user("bob"),
        status: PresenceStatus::Online,
        activity: Some("Racer X".to_string()),
    };
    assert_eq!(alice.client().store().presence(&user("bob")), Some(&expected));
    assert_eq!(alice.app().friends().get(&user("bob")), Some(&expected));

    // carol hears the broadcast but is nobody's friend.
    assert_eq!(carol.client().store().friend_count(), 0);

    carol.update_presence(Some("Chess".to_string())).await.unwrap();
    settle(&mut [&mut alice, &mut bob, &mut carol]).await.unwrap();

    assert_eq!(alice.client().store().friend_count(), 1);
    assert!(alice.client().store().presence(&user("carol")).is_none());
    assert_eq!(alice.client().store().presence(&user("bob")), Some(&expected));
}

#[tokio::test]
async fn accept_reannounces_current_activity() {
    let broker = MemoryBroker::new();
    let mut alice = online(&broker, "alice").await;
    let mut bob = online(&broker, "bob").await;

    alice.update_presence(Some("Racer X".to_string())).await.unwrap();
    bob.send_friend_request(user("alice")).await.unwrap();
    settle(&mut [&mut alice, &mut bob]).await.unwrap();

    alice.accept_friend_request(user("bob")).await.unwrap();
    settle(&mut [&mut alice, &mut bob]).await.unwrap();

    let seen = bob.client().store().presence(&user("alice")).unwrap();
    assert_eq!(seen.activity.as_deref(), Some("Racer X"));
}

#[tokio::test]
async fn direct_messages_echo_locally_and_deliver() {
    let broker = MemoryBroker::new();
    let (mut alice, mut bob) = befriended(&broker).await;

    alice.send_message(user("bob"), "gg".to_string()).await.unwrap();
    settle(&mut [&mut alice, &mut bob]).await.unwrap();

    let sent = &alice.app().conversations()[&user("bob")];
    assert_eq!(sent.lines.len(), 1);
    assert_eq!(sent.lines[0].content, "gg");

    let received = bob.app().active_conversation().unwrap();
    assert_eq!(received.peer, user("alice"));
    assert_eq!(received.lines[0].content, "gg");
    assert!(
        bob.driver()
            .notifications()
            .contains(&Notification::ChatMessage { from: user("alice"), content: "gg".into() })
    );
}

#[tokio::test]
async fn typed_commands_drive_runtime() {
    let broker = MemoryBroker::new();
    let mut alice = sim_runtime(&broker, "alice").unwrap();
    let mut bob = online(&broker, "bob").await;

    for line in ["/connect", "/add bob", "/open bob", "hello"] {
        let command: Command = line.parse().unwrap();
        alice.handle_event(AppEvent::Input(command)).await.unwrap();
    }
    settle(&mut [&mut alice, &mut bob]).await.unwrap();

    assert_eq!(alice.app().connection_state(), ConnectionState::Connected);
    assert!(bob.client().store().is_pending(&user("alice")));
    assert_eq!(bob.app().conversations()[&user("alice")].lines[0].content, "hello");
}

#[tokio::test]
async fn shutdown_announces_offline() {
    let broker = MemoryBroker::new();
    let (mut alice, mut bob) = befriended(&broker).await;

    bob.shutdown().await.unwrap();
    settle(&mut [&mut alice, &mut bob]).await.unwrap();

    assert_eq!(bob.app().connection_state(), ConnectionState::Disconnected);
    assert!(!bob.driver().is_connected());
    let seen = alice.client().store().presence(&user("bob")).unwrap();
    assert_eq!(seen.status, PresenceStatus::Offline);
}

#[tokio::test]
async fn run_loop_applies_inbound_work_before_queued_commands() {
    let broker = MemoryBroker::new();
    let mut alice = online(&broker, "alice").await;
    let mut bob = online(&broker, "bob").await;

    // Waiting in alice's mailbox before her loop starts.
    bob.send_friend_request(user("alice")).await.unwrap();
    bob.send_message(user("alice"), "ready?".into()).await.unwrap();

    for line in ["/accept bob", "/play Racer X", "yes", "/quit"] {
        alice.driver_mut().inject_event(AppEvent::Input(line.parse().unwrap()));
    }
    alice.run().await.unwrap();

    let presence = |status: PresenceStatus, activity: Option<&str>| {
        Envelope::Presence(Presence {
            username: user("alice"),
            status,
            activity: activity.map(str::to_string),
        })
    };
    let sent: Vec<Envelope> = broker
        .history()
        .into_iter()
        .map(|publication| publication.envelope)
        .filter(|envelope| envelope.sender() == Some(&user("alice")))
        .collect();
    assert_eq!(sent, vec![
        presence(PresenceStatus::Online, None),
        Envelope::FriendAccept(FriendAccept { from: user("alice") }),
        presence(PresenceStatus::Online, None),
        presence(PresenceStatus::Online, Some("Racer X")),
        Envelope::Message(DirectMessage { from: user("alice"), content: "yes".into() }),
        presence(PresenceStatus::Offline, None),
    ]);

    settle(&mut [&mut bob]).await.unwrap();
    assert!(bob.client().store().is_friend(&user("alice")));
    let seen = bob.client().store().presence(&user("alice")).unwrap();
    assert_eq!(seen.status, PresenceStatus::Offline);
    assert_eq!(bob.app().conversations()[&user("alice")].lines[0].content, "yes");
}

#[tokio::test]
async fn run_loop_ends_when_input_closes() {
    let broker = MemoryBroker::new();
    let mut alice = sim_runtime(&broker, "alice").unwrap();

    alice.driver_mut().inject_event(AppEvent::Input(Command::Connect));
    alice.driver_mut().close_input();
    alice.run().await.unwrap();

    let announced: Vec<PresenceStatus> = broker
        .history()
        .into_iter()
        .filter_map(|publication| match publication.envelope {
            Envelope::Presence(record) => Some(record.status),
            _ => None,
        })
        .collect();
    assert_eq!(announced, vec![PresenceStatus::Online, PresenceStatus::Offline]);
    assert_eq!(broker.subscriber_count(), 0);
}
