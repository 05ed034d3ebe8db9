//! Observable application state types.
//!
//! These structures are the view model: the subset of client state a
//! frontend needs to render friends, requests and conversations.

use lobby_proto::Username;

/// Connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected to the broker.
    Disconnected,
    /// Connection attempt in progress.
    Connecting,
    /// Connected and subscribed.
    Connected,
}

/// Who wrote a chat line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Speaker {
    /// The local identity.
    Me,
    /// The conversation peer.
    Peer,
}

/// One line of a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
    /// Author of the line.
    pub speaker: Speaker,
    /// Message text.
    pub content: String,
}

/// Conversation with one peer.
#[derive(Debug, Clone)]
pub struct Conversation {
    /// Remote identity.
    pub peer: Username,
    /// Lines in arrival order.
    pub lines: Vec<ChatLine>,
    /// Conversation has lines the user has not looked at.
    pub unread: bool,
}

impl Conversation {
    /// Create an empty conversation.
    pub fn new(peer: Username) -> Self {
        Self { peer, lines: Vec::new(), unread: false }
    }

    /// Append a line.
    pub fn push(&mut self, speaker: Speaker, content: String) {
        self.lines.push(ChatLine { speaker, content });
    }
}
