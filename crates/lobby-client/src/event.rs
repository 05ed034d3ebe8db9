//! Client events and actions.

use lobby_proto::{Channel, Envelope, Presence, Username};

/// Callback the transport invokes for every decoded inbound envelope.
///
/// Called from the transport's receive loop, one envelope at a time, in the
/// order frames arrive. Implementations must not touch client state directly;
/// they hand the envelope to the consumer loop.
pub type InboundHandler = Box<dyn FnMut(Envelope) + Send + 'static>;

/// Events the caller feeds into the client.
///
/// The caller is responsible for:
/// - Decoding frames from the broker
/// - Reporting connection lifecycle
/// - Forwarding user intents (send message, add friend, etc.)
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// Transport connected and subscribed.
    Connected,

    /// Caller is about to disconnect.
    Disconnecting,

    /// Envelope received from the broker.
    EnvelopeReceived(Envelope),

    /// User wants to send a direct message.
    SendMessage {
        /// Recipient.
        to: Username,
        /// Message text.
        content: String,
    },

    /// User wants to befriend another identity.
    SendFriendRequest {
        /// Identity to befriend.
        to: Username,
    },

    /// User accepts a pending request.
    AcceptFriendRequest {
        /// Requester.
        from: Username,
    },

    /// User changed what they are doing.
    UpdatePresence {
        /// New activity. `None` if idle.
        activity: Option<String>,
    },
}

/// Envelope addressed to a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publication {
    /// Destination channel.
    pub channel: Channel,
    /// Envelope to publish.
    pub envelope: Envelope,
}

/// Something the user should be told about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Direct message arrived.
    ChatMessage {
        /// Sender.
        from: Username,
        /// Message text.
        content: String,
    },

    /// A confirmed friend's presence changed.
    PresenceChanged(Presence),

    /// New incoming friend request.
    RequestReceived {
        /// Requester.
        from: Username,
    },

    /// A request we sent was accepted.
    RequestAccepted {
        /// Accepter.
        by: Username,
    },
}

/// Actions the client produces for the caller to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientAction {
    /// Publish an envelope. Fire-and-forget.
    Publish(Publication),

    /// Surface a notification to the user.
    Notify(Notification),
}
