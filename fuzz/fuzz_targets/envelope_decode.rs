//! Fuzz target for envelope decoding
//!
//! # Invariants
//!
//! - NEVER panic on arbitrary bytes
//! - Anything that decodes re-encodes to a frame that decodes to the same
//!   envelope (when it still fits the frame limit)

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(envelope) = lobby_proto::decode(data) else {
        return;
    };
    if let Ok(frame) = lobby_proto::encode(&envelope) {
        assert_eq!(lobby_proto::decode(&frame).ok(), Some(envelope));
    }
});
