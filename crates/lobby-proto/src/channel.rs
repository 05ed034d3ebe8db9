//! Channel naming.
//!
//! Channels are the only addressing mechanism. A [`Namespace`] is shared by
//! every instance of the system and derives two kinds of channel from it:
//!
//! - personal: `<namespace>/<username>`, one per identity (point-to-point)
//! - global: `<namespace>/global`, shared by everyone (broadcast)

use std::{fmt, str::FromStr};

use crate::{ProtocolError, Result, Username};

/// Suffix of the broadcast channel. Reserved as a username.
pub(crate) const GLOBAL_SUFFIX: &str = "global";

/// Broker topic a frame is published to or received from.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Channel(String);

impl Channel {
    /// Topic string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Topic prefix shared by all instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace(String);

impl Namespace {
    /// Prefix used when none is configured.
    pub const DEFAULT: &'static str = "launcher/chat";

    /// Validate a namespace. A single trailing `/` is trimmed.
    pub fn new(base: impl Into<String>) -> Result<Self> {
        let raw = base.into();
        let trimmed = raw.strip_suffix('/').unwrap_or(&raw);
        let reject =
            |reason| Err(ProtocolError::InvalidNamespace { namespace: raw.clone(), reason });

        if trimmed.is_empty() {
            return reject("must not be empty");
        }
        if trimmed.contains(['+', '#']) {
            return reject("must not contain wildcards");
        }
        if trimmed.split('/').any(str::is_empty) {
            return reject("must not contain empty segments");
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Personal channel of `username`.
    pub fn personal(&self, username: &Username) -> Channel {
        Channel(format!("{}/{}", self.0, username))
    }

    /// Broadcast channel.
    pub fn global(&self) -> Channel {
        Channel(format!("{}/{GLOBAL_SUFFIX}", self.0))
    }

    /// Namespace prefix.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl FromStr for Namespace {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
