//! Fuzz target for structurally hostile JSON frames
//!
//! Random bytes rarely get past the JSON parser, so this target builds
//! frames that do and then breaks them in targeted ways.
//!
//! # Strategy
//!
//! - Deeply nested: values nested to arbitrary depth (stack overflow)
//! - Type confusion: a known `type` tag with fields of the wrong kind
//! - Hostile names: usernames with separators, wildcards, control chars
//! - Oversized: frames around the size limit
//! - Duplicate keys: repeated `type` or `from` keys
//!
//! # Invariants
//!
//! - NEVER panic
//! - Invalid usernames are always rejected
//! - Frames over the limit are always rejected

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use lobby_proto::{MAX_FRAME_SIZE, ProtocolError};

const KINDS: [&str; 7] = [
    "presence",
    "message",
    "friend_request",
    "friend_accept",
    "new_request",
    "request_accepted",
    "typing",
];

#[derive(Debug, Clone, Arbitrary)]
enum JsonAttack {
    DeeplyNested { kind: u8, depth: u8 },
    TypeConfusion { kind: u8, value: Value },
    HostileName { kind: u8, name: String },
    Oversized { kind: u8, slack: i8 },
    DuplicateKeys { first: u8, second: u8 },
}

#[derive(Debug, Clone, Arbitrary)]
enum Value {
    Null,
    Bool(bool),
    Number(i64),
    Array(u8),
    Object,
}

impl Value {
    fn render(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => n.to_string(),
            Self::Array(len) => format!("[{}]", vec!["1"; usize::from(*len)].join(",")),
            Self::Object => r#"{"a":{}}"#.to_string(),
        }
    }
}

fn kind(index: u8) -> &'static str {
    KINDS[usize::from(index) % KINDS.len()]
}

fuzz_target!(|attack: JsonAttack| {
    match attack {
        JsonAttack::DeeplyNested { kind: k, depth } => {
            let depth = usize::from(depth) * 4;
            let nested = format!("{}1{}", "[".repeat(depth), "]".repeat(depth));
            let frame = format!(r#"{{"type":"{}","from":{nested},"content":{nested}}}"#, kind(k));
            let _ = lobby_proto::decode(frame.as_bytes());
        },

        JsonAttack::TypeConfusion { kind: k, value } => {
            let value = value.render();
            let frame = format!(
                r#"{{"type":"{}","from":{value},"username":{value},"status":{value}}}"#,
                kind(k)
            );
            let _ = lobby_proto::decode(frame.as_bytes());
        },

        JsonAttack::HostileName { kind: k, name } => {
            let Ok(quoted) = serde_json_string(&name) else {
                return;
            };
            let frame = format!(
                r#"{{"type":"{}","from":{quoted},"username":{quoted},"status":"online","#,
                kind(k)
            ) + r#""content":"x"}"#;
            let hostile = name.is_empty()
                || name.len() > 64
                || name == "global"
                || name.chars().any(|c| matches!(c, '/' | '+' | '#') || c.is_control());
            let decoded = lobby_proto::decode(frame.as_bytes());
            if hostile && kind(k) != "typing" {
                assert!(decoded.is_err(), "accepted hostile name {name:?}");
            }
        },

        JsonAttack::Oversized { kind: k, slack } => {
            let target = MAX_FRAME_SIZE.saturating_add_signed(isize::from(slack));
            let prefix = format!(r#"{{"type":"{}","from":"bob","content":""#, kind(k));
            let padding = target.saturating_sub(prefix.len() + 2);
            let frame = format!("{prefix}{}\"}}", "x".repeat(padding));
            let result = lobby_proto::decode(frame.as_bytes());
            if frame.len() > MAX_FRAME_SIZE {
                assert!(matches!(result, Err(ProtocolError::FrameTooLarge { .. })));
            }
        },

        JsonAttack::DuplicateKeys { first, second } => {
            let frame = format!(
                r#"{{"type":"{}","type":"{}","from":"bob","from":"carol","content":"x"}}"#,
                kind(first),
                kind(second)
            );
            let _ = lobby_proto::decode(frame.as_bytes());
        },
    }
});

/// JSON string literal for `s`, escaping quotes and control characters.
fn serde_json_string(s: &str) -> Result<String, std::fmt::Error> {
    use std::fmt::Write;

    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            c if c.is_control() => write!(out, "\\u{:04x}", u32::from(c))?,
            c => out.push(c),
        }
    }
    out.push('"');
    Ok(out)
}
