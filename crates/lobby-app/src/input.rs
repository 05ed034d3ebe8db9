//! Frontend-agnostic command parsing.
//!
//! Frontends read a line of text and parse it into a [`Command`]. Lines
//! starting with `/` are commands; anything else is chat for the open
//! conversation.

use std::str::FromStr;

use lobby_proto::{ProtocolError, Username};
use thiserror::Error;

/// User command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/connect`
    Connect,
    /// `/add <user>`
    AddFriend(Username),
    /// `/accept <user>`
    Accept(Username),
    /// `/msg <user> <text>`
    Message {
        /// Recipient.
        to: Username,
        /// Message text.
        content: String,
    },
    /// Plain text for the open conversation.
    Say(String),
    /// `/open <user>`
    Open(Username),
    /// `/play [activity]`; no argument clears the activity.
    Play(Option<String>),
    /// `/friends`
    Friends,
    /// `/requests`
    Requests,
    /// `/quit`
    Quit,
}

/// Command parse errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Blank line.
    #[error("empty input")]
    Empty,

    /// Unrecognized `/command`.
    #[error("unknown command /{0}")]
    Unknown(String),

    /// Required argument missing.
    #[error("usage: /{command} {usage}")]
    MissingArgument {
        /// Command name.
        command: &'static str,
        /// Expected arguments.
        usage: &'static str,
    },

    /// Argument is not a valid username.
    #[error(transparent)]
    InvalidUsername(#[from] ProtocolError),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        if line.is_empty() {
            return Err(CommandError::Empty);
        }
        let Some(command) = line.strip_prefix('/') else {
            return Ok(Self::Say(line.to_string()));
        };

        let (name, rest) = command.split_once(char::is_whitespace).unwrap_or((command, ""));
        let rest = rest.trim();

        match name {
            "connect" => Ok(Self::Connect),
            "add" => Ok(Self::AddFriend(username(rest, "add")?)),
            "accept" => Ok(Self::Accept(username(rest, "accept")?)),
            "open" => Ok(Self::Open(username(rest, "open")?)),
            "msg" => {
                let (to, content) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                let content = content.trim();
                if to.is_empty() || content.is_empty() {
                    return Err(CommandError::MissingArgument {
                        command: "msg",
                        usage: "<user> <text>",
                    });
                }
                Ok(Self::Message { to: Username::new(to)?, content: content.to_string() })
            },
            "play" => Ok(Self::Play((!rest.is_empty()).then(|| rest.to_string()))),
            "friends" => Ok(Self::Friends),
            "requests" => Ok(Self::Requests),
            "quit" => Ok(Self::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

fn username(arg: &str, command: &'static str) -> Result<Username, CommandError> {
    if arg.is_empty() {
        return Err(CommandError::MissingArgument { command, usage: "<user>" });
    }
    Ok(Username::new(arg)?)
}
