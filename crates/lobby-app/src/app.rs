//! Application state machine.
//!
//! This module defines the [`App`] state machine, which manages the
//! interactive state of the application completely decoupled from I/O and
//! protocol mechanics.
//!
//! This is a pure state machine: it consumes [`crate::AppEvent`] inputs and
//! produces [`crate::AppAction`] instructions for the runtime to execute.
//!
//! # Responsibilities
//!
//! - Mirrors friends, presence and pending requests for rendering.
//! - Keeps one conversation per peer and tracks the open one.
//! - Tracks high-level connection state for UI feedback.
//! - Decides which events are surfaced to the user as notifications.

use std::collections::{BTreeMap, BTreeSet};

use lobby_client::Notification;
use lobby_proto::{Presence, PresenceStatus, Username};

use crate::{AppAction, AppEvent, Command, ConnectionState, Conversation, Speaker};

/// Application state machine.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies - fully testable in simulation.
#[derive(Debug, Clone)]
pub struct App {
    /// Local identity.
    username: Username,
    /// Connection state.
    state: ConnectionState,
    /// Confirmed friends and their latest presence.
    friends: BTreeMap<Username, Presence>,
    /// Identities waiting for us to accept.
    requests: BTreeSet<Username>,
    /// Conversations keyed by peer.
    conversations: BTreeMap<Username, Conversation>,
    /// Conversation plain text goes to. `None` if none is open.
    active_conversation: Option<Username>,
    /// Our current activity. `None` if idle.
    activity: Option<String>,
    /// Transient status message. `None` if no message.
    status_message: Option<String>,
}

impl App {
    /// Create a new App for the given local identity.
    pub fn new(username: Username) -> Self {
        Self {
            username,
            state: ConnectionState::Disconnected,
            friends: BTreeMap::new(),
            requests: BTreeSet::new(),
            conversations: BTreeMap::new(),
            active_conversation: None,
            activity: None,
            status_message: None,
        }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::Input(command) => self.handle_command(command),
            AppEvent::Connected => {
                self.state = ConnectionState::Connected;
                self.activity = None;
                self.status_message = Some(format!("Online as {}", self.username));
                vec![AppAction::Render]
            },
            AppEvent::ConnectFailed { reason } => {
                self.state = ConnectionState::Disconnected;
                self.status_message = Some(format!("Connection failed: {reason}"));
                vec![AppAction::Render]
            },
            AppEvent::Disconnected => {
                self.state = ConnectionState::Disconnected;
                self.status_message = Some("Disconnected".to_string());
                vec![AppAction::Render]
            },
            AppEvent::ConnectionLost => {
                self.state = ConnectionState::Disconnected;
                self.status_message = Some("Connection lost; use /connect".to_string());
                vec![AppAction::Render]
            },
            AppEvent::MessageReceived { from, content } => {
                let is_active = self.active_conversation.as_ref() == Some(&from);
                let conversation = self.conversation_mut(&from);
                conversation.push(Speaker::Peer, content.clone());
                if !is_active {
                    conversation.unread = true;
                }
                if self.active_conversation.is_none() {
                    self.set_active_conversation(&from);
                }
                vec![
                    AppAction::Notify(Notification::ChatMessage { from, content }),
                    AppAction::Render,
                ]
            },
            AppEvent::MessageSent { to, content } => {
                self.conversation_mut(&to).push(Speaker::Me, content);
                self.set_active_conversation(&to);
                vec![AppAction::Render]
            },
            AppEvent::PresenceChanged(record) => {
                if let Some(current) = self.friends.get_mut(&record.username) {
                    *current = record.clone();
                }
                vec![AppAction::Notify(Notification::PresenceChanged(record)), AppAction::Render]
            },
            AppEvent::RequestReceived { from } => {
                self.requests.insert(from.clone());
                vec![AppAction::Notify(Notification::RequestReceived { from }), AppAction::Render]
            },
            AppEvent::RequestAccepted { by } => {
                self.add_friend_entry(&by);
                vec![AppAction::Notify(Notification::RequestAccepted { by }), AppAction::Render]
            },
            AppEvent::RequestSent { to } => {
                self.status_message = Some(format!("Friend request sent to {to}"));
                vec![AppAction::Render]
            },
            AppEvent::FriendAdded { username } => {
                self.add_friend_entry(&username);
                self.status_message = Some(format!("{username} is now your friend"));
                vec![AppAction::Render]
            },
            AppEvent::ActivityChanged { activity } => {
                self.status_message = Some(match &activity {
                    Some(activity) => format!("Now playing {activity}"),
                    None => "Activity cleared".to_string(),
                });
                self.activity = activity;
                vec![AppAction::Render]
            },
            AppEvent::Error { message } => {
                self.status_message = Some(format!("Error: {message}"));
                vec![AppAction::Render]
            },
        }
    }

    fn handle_command(&mut self, command: Command) -> Vec<AppAction> {
        match command {
            Command::Connect => self.connect(),
            Command::AddFriend(to) => self.add_friend(to),
            Command::Accept(from) => self.accept_request(from),
            Command::Message { to, content } => self.send_message(to, content),
            Command::Say(content) => match self.active_conversation.clone() {
                Some(to) => self.send_message(to, content),
                None => {
                    self.status_message =
                        Some("No open conversation; use /open <user> or /msg".to_string());
                    vec![AppAction::Render]
                },
            },
            Command::Open(peer) => {
                self.conversation_mut(&peer);
                self.set_active_conversation(&peer);
                vec![AppAction::Render]
            },
            Command::Play(activity) => self.set_activity(activity),
            Command::Friends => {
                self.status_message = Some(self.friends_summary());
                vec![AppAction::Render]
            },
            Command::Requests => {
                self.status_message = Some(self.requests_summary());
                vec![AppAction::Render]
            },
            Command::Quit => self.quit(),
        }
    }

    /// Initiate connection to the broker.
    pub fn connect(&mut self) -> Vec<AppAction> {
        if self.state != ConnectionState::Disconnected {
            self.status_message = Some("Already connected".to_string());
            return vec![AppAction::Render];
        }
        self.state = ConnectionState::Connecting;
        vec![AppAction::Connect, AppAction::Render]
    }

    /// Send a direct message.
    pub fn send_message(&mut self, to: Username, content: String) -> Vec<AppAction> {
        self.when_connected(AppAction::SendMessage { to, content })
    }

    /// Ask `to` to become friends.
    pub fn add_friend(&mut self, to: Username) -> Vec<AppAction> {
        self.when_connected(AppAction::SendFriendRequest { to })
    }

    /// Accept the pending request from `from`.
    pub fn accept_request(&mut self, from: Username) -> Vec<AppAction> {
        self.when_connected(AppAction::AcceptFriendRequest { from })
    }

    /// Change the activity shown to friends. `None` clears it.
    pub fn set_activity(&mut self, activity: Option<String>) -> Vec<AppAction> {
        self.when_connected(AppAction::UpdatePresence { activity })
    }

    /// Quit the application.
    pub fn quit(&self) -> Vec<AppAction> {
        vec![AppAction::Quit]
    }

    /// Open the conversation with `peer` if one exists.
    pub fn set_active_conversation(&mut self, peer: &Username) {
        if let Some(conversation) = self.conversations.get_mut(peer) {
            conversation.unread = false;
            self.active_conversation = Some(peer.clone());
        }
    }

    /// Local identity.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Current connection state.
    pub fn connection_state(&self) -> ConnectionState {
        self.state
    }

    /// Confirmed friends in name order.
    pub fn friends(&self) -> &BTreeMap<Username, Presence> {
        &self.friends
    }

    /// Pending incoming requests in name order.
    pub fn requests(&self) -> &BTreeSet<Username> {
        &self.requests
    }

    /// All conversations.
    pub fn conversations(&self) -> &BTreeMap<Username, Conversation> {
        &self.conversations
    }

    /// Open conversation. `None` if none is open.
    pub fn active_conversation(&self) -> Option<&Conversation> {
        self.active_conversation.as_ref().and_then(|peer| self.conversations.get(peer))
    }

    /// Our current activity. `None` if idle.
    pub fn activity(&self) -> Option<&str> {
        self.activity.as_deref()
    }

    /// Transient status message. `None` if no message.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    /// One line per friend: name, status and activity.
    pub fn friends_summary(&self) -> String {
        if self.friends.is_empty() {
            return "No friends yet; use /add <user>".to_string();
        }
        self.friends.values().map(describe_presence).collect::<Vec<_>>().join("\n")
    }

    /// Pending requesters, comma separated.
    pub fn requests_summary(&self) -> String {
        if self.requests.is_empty() {
            return "Requests (0)".to_string();
        }
        let names: Vec<&str> = self.requests.iter().map(Username::as_str).collect();
        format!("Requests ({}): {}", names.len(), names.join(", "))
    }

    fn when_connected(&mut self, action: AppAction) -> Vec<AppAction> {
        if self.state != ConnectionState::Connected {
            self.status_message = Some("Not connected; use /connect".to_string());
            return vec![AppAction::Render];
        }
        vec![action, AppAction::Render]
    }

    fn conversation_mut(&mut self, peer: &Username) -> &mut Conversation {
        self.conversations.entry(peer.clone()).or_insert_with(|| Conversation::new(peer.clone()))
    }

    fn add_friend_entry(&mut self, username: &Username) {
        self.requests.remove(username);
        self.friends.entry(username.clone()).or_insert_with(|| Presence::online(username.clone()));
    }
}

/// `name (status)` with the activity appended when present.
pub fn describe_presence(presence: &Presence) -> String {
    match (&presence.status, &presence.activity) {
        (PresenceStatus::Online, Some(activity)) => {
            format!("{} (online) - playing {activity}", presence.username)
        },
        (status, _) => format!("{} ({status})", presence.username),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> Username {
        Username::new(name).unwrap()
    }

    fn connected_app() -> App {
        let mut app = App::new(user("alice"));
        app.state = ConnectionState::Connected;
        app
    }

    #[test]
    fn commands_require_connection() {
        let mut app = App::new(user("alice"));
        let actions = app.add_friend(user("bob"));
        assert_eq!(actions, vec![AppAction::Render]);
        assert_eq!(app.status_message(), Some("Not connected; use /connect"));
    }

    #[test]
    fn api_add_friend() {
        let mut app = connected_app();
        assert!(matches!(app.add_friend(user("bob")).as_slice(), [
            AppAction::SendFriendRequest { .. },
            AppAction::Render
        ]));
    }

    #[test]
    fn api_connect() {
        let mut app = App::new(user("alice"));
        assert_eq!(app.connect(), vec![AppAction::Connect, AppAction::Render]);
        assert_eq!(app.connection_state(), ConnectionState::Connecting);

        // Second connect while connecting is refused.
        assert_eq!(app.connect(), vec![AppAction::Render]);
    }

    #[test]
    fn lost_connection_allows_reconnect() {
        let mut app = connected_app();
        assert_eq!(app.connect(), vec![AppAction::Render]);

        app.handle(AppEvent::ConnectionLost);
        assert_eq!(app.connection_state(), ConnectionState::Disconnected);
        assert_eq!(app.status_message(), Some("Connection lost; use /connect"));
        assert_eq!(app.add_friend(user("bob")), vec![AppAction::Render]);
        assert_eq!(app.connect(), vec![AppAction::Connect, AppAction::Render]);
    }

    #[test]
    fn inbound_message_opens_conversation() {
        let mut app = connected_app();
        let actions =
            app.handle(AppEvent::MessageReceived { from: user("bob"), content: "hi".into() });

        assert!(matches!(actions.as_slice(), [
            AppAction::Notify(Notification::ChatMessage { .. }),
            AppAction::Render
        ]));
        let conversation = app.active_conversation().unwrap();
        assert_eq!(conversation.peer, user("bob"));
        assert_eq!(conversation.lines.len(), 1);
    }

    #[test]
    fn message_to_inactive_conversation_marks_unread() {
        let mut app = connected_app();
        app.handle(AppEvent::MessageReceived { from: user("bob"), content: "hi".into() });
        app.handle(AppEvent::MessageReceived { from: user("carol"), content: "yo".into() });

        assert_eq!(app.active_conversation().map(|c| c.peer.clone()), Some(user("bob")));
        assert!(app.conversations()[&user("carol")].unread);

        app.set_active_conversation(&user("carol"));
        assert!(!app.conversations()[&user("carol")].unread);
    }

    #[test]
    fn say_goes_to_active_conversation() {
        let mut app = connected_app();
        assert_eq!(app.handle(AppEvent::Input(Command::Say("hi".into()))), vec![
            AppAction::Render
        ]);

        app.handle(AppEvent::Input(Command::Open(user("bob"))));
        let actions = app.handle(AppEvent::Input(Command::Say("hi".into())));
        assert_eq!(actions[0], AppAction::SendMessage { to: user("bob"), content: "hi".into() });
    }

    #[test]
    fn sent_message_echoed_locally() {
        let mut app = connected_app();
        app.handle(AppEvent::MessageSent { to: user("bob"), content: "gg".into() });

        let conversation = app.active_conversation().unwrap();
        assert_eq!(conversation.lines[0].speaker, Speaker::Me);
        assert_eq!(conversation.lines[0].content, "gg");
    }

    #[test]
    fn friend_added_clears_request() {
        let mut app = connected_app();
        app.handle(AppEvent::RequestReceived { from: user("bob") });
        assert_eq!(app.requests_summary(), "Requests (1): bob");

        app.handle(AppEvent::FriendAdded { username: user("bob") });
        assert!(app.requests().is_empty());
        assert_eq!(app.friends_summary(), "bob (online)");
    }

    #[test]
    fn presence_for_unknown_peer_not_added() {
        let mut app = connected_app();
        app.handle(AppEvent::PresenceChanged(Presence::online(user("carol"))));
        assert!(app.friends().is_empty());
    }

    #[test]
    fn describes_activity() {
        let presence = Presence {
            username: user("bob"),
            status: PresenceStatus::Online,
            activity: Some("Racer X".into()),
        };
        assert_eq!(describe_presence(&presence), "bob (online) - playing Racer X");
    }
}
