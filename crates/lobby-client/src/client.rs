//! Client state machine.
//!
//! The `Client` owns the [`Session`] and the [`RelationshipStore`] for one
//! local identity and turns [`ClientEvent`]s into [`ClientAction`]s.

use lobby_proto::{Envelope, PresenceStatus, Username};

use crate::{ClientAction, ClientError, ClientEvent, RelationshipStore, Session, router};

/// Presence, friendship and direct-message client.
#[derive(Debug, Clone)]
pub struct Client {
    session: Session,
    store: RelationshipStore,
}

impl Client {
    /// Create a client for the given session with an empty store.
    pub fn new(session: Session) -> Self {
        Self { session, store: RelationshipStore::new() }
    }

    /// Local session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Relationship state.
    pub fn store(&self) -> &RelationshipStore {
        &self.store
    }

    /// Local identity.
    pub fn identity(&self) -> &Username {
        self.session.identity()
    }

    /// Process an event and return resulting actions.
    pub fn handle(&mut self, event: ClientEvent) -> Result<Vec<ClientAction>, ClientError> {
        match event {
            ClientEvent::Connected => Ok(self.handle_connected()),
            ClientEvent::Disconnecting => {
                Ok(vec![ClientAction::Publish(self.session.announce(PresenceStatus::Offline))])
            },
            ClientEvent::EnvelopeReceived(envelope) => Ok(self.handle_envelope(envelope)),
            ClientEvent::SendMessage { to, content } => self.handle_send_message(to, content),
            ClientEvent::SendFriendRequest { to } => self.handle_send_friend_request(&to),
            ClientEvent::AcceptFriendRequest { from } => self.handle_accept(&from),
            ClientEvent::UpdatePresence { activity } => {
                self.session.set_activity(activity);
                Ok(vec![ClientAction::Publish(self.session.announce(PresenceStatus::Online))])
            },
        }
    }

    /// Announce that we came online. A fresh connection starts idle.
    fn handle_connected(&mut self) -> Vec<ClientAction> {
        self.session.set_activity(None);
        tracing::info!(identity = %self.session.identity(), "online");
        vec![ClientAction::Publish(self.session.announce(PresenceStatus::Online))]
    }

    fn handle_envelope(&mut self, envelope: Envelope) -> Vec<ClientAction> {
        let kind = envelope.kind();
        let transition = router::route(&self.store, envelope);
        tracing::debug!(%kind, ?transition, "routing inbound envelope");

        transition.apply(&mut self.store).map(ClientAction::Notify).into_iter().collect()
    }

    fn handle_send_message(
        &self,
        to: Username,
        content: String,
    ) -> Result<Vec<ClientAction>, ClientError> {
        if content.is_empty() {
            return Err(ClientError::EmptyMessage { to });
        }
        let envelope = self.session.direct_message_envelope(content);
        Ok(vec![ClientAction::Publish(self.session.to_peer(&to, envelope))])
    }

    fn handle_send_friend_request(&self, to: &Username) -> Result<Vec<ClientAction>, ClientError> {
        if to == self.session.identity() {
            return Err(ClientError::SelfRequest);
        }
        let envelope = self.session.friend_request_envelope();
        Ok(vec![ClientAction::Publish(self.session.to_peer(to, envelope))])
    }

    /// Complete the handshake locally, then tell the requester and re-announce
    /// our presence so they get a fresh record.
    fn handle_accept(&mut self, from: &Username) -> Result<Vec<ClientAction>, ClientError> {
        if !self.store.accept_incoming(from) {
            return Err(ClientError::NoPendingRequest { from: from.clone() });
        }
        tracing::debug!(peer = %from, "friend request accepted");

        let accept = self.session.friend_accept_envelope();
        Ok(vec![
            ClientAction::Publish(self.session.to_peer(from, accept)),
            ClientAction::Publish(self.session.announce(PresenceStatus::Online)),
        ])
    }
}
