//! User identities.
//!
//! A [`Username`] is chosen by the user and is unique only by convention.
//! Because it is embedded verbatim in a broker topic, anything that would
//! change the topic structure is rejected: separators, MQTT wildcards and the
//! reserved broadcast name.

use std::{borrow::Borrow, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{ProtocolError, Result, channel::GLOBAL_SUFFIX};

/// Maximum username length in bytes.
pub const MAX_USERNAME_LEN: usize = 64;

/// Validated user identity.
///
/// # Invariants
///
/// - Non-empty and at most [`MAX_USERNAME_LEN`] bytes.
/// - Contains no `/`, `+`, `#` or control characters.
/// - Is not the reserved broadcast suffix `global`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and wrap a username.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let reject = |reason| Err(ProtocolError::InvalidUsername { name: name.clone(), reason });

        if name.is_empty() {
            return reject("must not be empty");
        }
        if name.len() > MAX_USERNAME_LEN {
            return reject("longer than 64 bytes");
        }
        if name.chars().any(|c| matches!(c, '/' | '+' | '#') || c.is_control()) {
            return reject("contains a topic separator, wildcard or control character");
        }
        if name == GLOBAL_SUFFIX {
            return reject("reserved for the broadcast channel");
        }

        Ok(Self(name))
    }

    /// Username as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Username {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for Username {
    type Error = ProtocolError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Username {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_names() {
        for name in ["alice", "Bob_99", "racer x", "ñandú"] {
            assert_eq!(Username::new(name).map(|u| u.to_string()), Ok(name.to_string()));
        }
    }

    #[test]
    fn rejects_topic_breaking_names() {
        for name in ["", "a/b", "a+", "#", "line\nbreak", "global"] {
            assert!(Username::new(name).is_err(), "{name:?} should be rejected");
        }
    }

    #[test]
    fn rejects_overlong_names() {
        let name = "x".repeat(MAX_USERNAME_LEN + 1);
        assert!(matches!(Username::new(name), Err(ProtocolError::InvalidUsername { .. })));
        assert!(Username::new("x".repeat(MAX_USERNAME_LEN)).is_ok());
    }

    #[test]
    fn deserialize_validates() {
        assert!(serde_json::from_str::<Username>("\"bob\"").is_ok());
        assert!(serde_json::from_str::<Username>("\"bob/inbox\"").is_err());
    }
}
