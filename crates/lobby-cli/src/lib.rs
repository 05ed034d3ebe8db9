//! Terminal client for Lobby
//!
//! A thin shell over [`lobby_app::Driver`] that reads commands from stdin
//! and writes chat lines and notices to stdout. All orchestration logic
//! lives in the generic [`lobby_app::Runtime`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod terminal;

pub use lobby_app::{App, AppAction, AppEvent, Driver, Runtime};
pub use terminal::{TerminalDriver, TerminalError};
