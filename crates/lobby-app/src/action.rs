//! Application side-effects and intents.
//!
//! This module defines the [`AppAction`] enum, which represents instructions
//! produced by the [`crate::App`] state machine for the runtime to execute.

use lobby_client::Notification;
use lobby_proto::Username;

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Render the UI.
    Render,

    /// Quit the application.
    Quit,

    /// Connect to the broker.
    Connect,

    /// Tell the user about something that happened.
    Notify(Notification),

    /// Send a direct message.
    SendMessage {
        /// Recipient.
        to: Username,
        /// Message text.
        content: String,
    },

    /// Ask another identity to become friends.
    SendFriendRequest {
        /// Identity to befriend.
        to: Username,
    },

    /// Accept a pending request.
    AcceptFriendRequest {
        /// Requester.
        from: Username,
    },

    /// Change the activity shown to friends.
    UpdatePresence {
        /// New activity. `None` if idle.
        activity: Option<String>,
    },
}
