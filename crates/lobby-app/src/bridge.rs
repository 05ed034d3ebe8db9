//! Protocol-to-Application translation layer.
//!
//! The [`Bridge`] wraps the low-level [`lobby_client::Client`] and adapts it
//! to the high-level application lifecycle.
//!
//! # Responsibilities
//!
//! - Converts high-level [`crate::AppAction`] into client events.
//! - Accumulates outgoing [`Publication`]s to be sent by the driver in the
//!   next I/O cycle.
//! - Interprets results from the client and converts them back into
//!   [`crate::AppEvent`]s to update the UI.

use lobby_client::{
    Client, ClientAction, ClientError, ClientEvent, Envelope, Publication, Session,
};

use crate::{AppAction, AppEvent};

/// Bridge between App and Client protocol logic.
pub struct Bridge {
    client: Client,
    outgoing: Vec<Publication>,
}

impl Bridge {
    /// Create a new Bridge for the given session.
    pub fn new(session: Session) -> Self {
        Self { client: Client::new(session), outgoing: Vec::new() }
    }

    /// Underlying protocol client.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Process an App action and return resulting App events.
    pub fn process_app_action(&mut self, action: AppAction) -> Vec<AppEvent> {
        match action {
            AppAction::SendMessage { to, content } => {
                let result = self.client.handle(ClientEvent::SendMessage {
                    to: to.clone(),
                    content: content.clone(),
                });
                self.handle_client_result(result, AppEvent::MessageSent { to, content })
            },
            AppAction::SendFriendRequest { to } => {
                let result = self.client.handle(ClientEvent::SendFriendRequest { to: to.clone() });
                self.handle_client_result(result, AppEvent::RequestSent { to })
            },
            AppAction::AcceptFriendRequest { from } => {
                let result =
                    self.client.handle(ClientEvent::AcceptFriendRequest { from: from.clone() });
                self.handle_client_result(result, AppEvent::FriendAdded { username: from })
            },
            AppAction::UpdatePresence { activity } => {
                let result =
                    self.client.handle(ClientEvent::UpdatePresence { activity: activity.clone() });
                self.handle_client_result(result, AppEvent::ActivityChanged { activity })
            },
            AppAction::Render | AppAction::Quit | AppAction::Connect | AppAction::Notify(_) => {
                vec![]
            },
        }
    }

    /// Transport is up: announce presence.
    pub fn handle_connected(&mut self) -> Vec<AppEvent> {
        let result = self.client.handle(ClientEvent::Connected);
        self.handle_client_result(result, AppEvent::Connected)
    }

    /// About to disconnect: announce offline.
    pub fn handle_disconnecting(&mut self) -> Vec<AppEvent> {
        let result = self.client.handle(ClientEvent::Disconnecting);
        match result {
            Ok(actions) => self.process_client_actions(actions),
            Err(e) => vec![AppEvent::Error { message: e.to_string() }],
        }
    }

    /// Handle an envelope from the broker.
    pub fn handle_envelope(&mut self, envelope: Envelope) -> Vec<AppEvent> {
        let result = self.client.handle(ClientEvent::EnvelopeReceived(envelope));
        match result {
            Ok(actions) => self.process_client_actions(actions),
            Err(e) => vec![AppEvent::Error { message: e.to_string() }],
        }
    }

    /// Take pending outgoing publications.
    pub fn take_outgoing(&mut self) -> Vec<Publication> {
        std::mem::take(&mut self.outgoing)
    }

    /// Successful results report `done` after any notifications.
    fn handle_client_result(
        &mut self,
        result: Result<Vec<ClientAction>, ClientError>,
        done: AppEvent,
    ) -> Vec<AppEvent> {
        match result {
            Ok(actions) => {
                let mut events = self.process_client_actions(actions);
                events.push(done);
                events
            },
            Err(e) => vec![AppEvent::Error { message: e.to_string() }],
        }
    }

    fn process_client_actions(&mut self, actions: Vec<ClientAction>) -> Vec<AppEvent> {
        let mut events = Vec::new();

        for action in actions {
            match action {
                ClientAction::Publish(publication) => self.outgoing.push(publication),
                ClientAction::Notify(notification) => events.push(notification.into()),
            }
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use lobby_client::{Namespace, PresenceStatus, Username};
    use lobby_proto::{DirectMessage, FriendRequest};

    use super::*;

    fn user(name: &str) -> Username {
        Username::new(name).unwrap()
    }

    fn bridge() -> Bridge {
        Bridge::new(Session::new(user("alice"), Namespace::default()))
    }

    #[test]
    fn connected_announces_presence() {
        let mut bridge = bridge();
        assert_eq!(bridge.handle_connected(), vec![AppEvent::Connected]);

        let outgoing = bridge.take_outgoing();
        assert_eq!(outgoing.len(), 1);
        assert_eq!(outgoing[0].channel.as_str(), "launcher/chat/global");
        assert!(matches!(
            &outgoing[0].envelope,
            Envelope::Presence(p) if p.status == PresenceStatus::Online && p.activity.is_none()
        ));

        assert!(bridge.take_outgoing().is_empty());
    }

    #[test]
    fn send_message_reports_sent() {
        let mut bridge = bridge();
        let events = bridge
            .process_app_action(AppAction::SendMessage { to: user("bob"), content: "hi".into() });

        assert_eq!(events, vec![AppEvent::MessageSent { to: user("bob"), content: "hi".into() }]);
        let outgoing = bridge.take_outgoing();
        assert_eq!(outgoing[0].channel.as_str(), "launcher/chat/bob");
    }

    #[test]
    fn client_error_becomes_error_event() {
        let mut bridge = bridge();
        let events = bridge.process_app_action(AppAction::SendFriendRequest { to: user("alice") });

        assert!(matches!(events.as_slice(), [AppEvent::Error { .. }]));
        assert!(bridge.take_outgoing().is_empty());
    }

    #[test]
    fn accept_flow() {
        let mut bridge = bridge();
        let events =
            bridge.handle_envelope(Envelope::FriendRequest(FriendRequest { from: user("bob") }));
        assert_eq!(events, vec![AppEvent::RequestReceived { from: user("bob") }]);

        let accept = AppAction::AcceptFriendRequest { from: user("bob") };
        let events = bridge.process_app_action(accept);
        assert_eq!(events, vec![AppEvent::FriendAdded { username: user("bob") }]);
        assert!(bridge.client().store().is_friend(&user("bob")));

        // Accept to requester, then presence re-announce.
        let outgoing = bridge.take_outgoing();
        assert_eq!(outgoing.len(), 2);
        assert!(matches!(outgoing[0].envelope, Envelope::FriendAccept(_)));
        assert!(matches!(outgoing[1].envelope, Envelope::Presence(_)));
    }

    #[test]
    fn inbound_message_from_anyone_delivered() {
        let mut bridge = bridge();
        let events = bridge.handle_envelope(Envelope::Message(DirectMessage {
            from: user("mallory"),
            content: "hey".into(),
        }));
        assert_eq!(events, vec![AppEvent::MessageReceived {
            from: user("mallory"),
            content: "hey".into()
        }]);
    }

    #[test]
    fn ui_actions_ignored() {
        let mut bridge = bridge();
        assert!(bridge.process_app_action(AppAction::Render).is_empty());
        assert!(bridge.process_app_action(AppAction::Quit).is_empty());
        assert!(bridge.take_outgoing().is_empty());
    }
}
