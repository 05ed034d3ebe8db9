//! Application layer for Lobby
//!
//! Pure state machines and a generic runtime for UI and protocol
//! orchestration, so simulation tests exercise the same code that runs in
//! the terminal client.
//!
//! # Components
//!
//! - [`App`]: UI state machine (commands, conversations, friend list)
//! - [`Bridge`]: Protocol bridge (translates App actions to Client events)
//! - [`Driver`]: Trait for platform-specific I/O abstraction
//! - [`Runtime`]: Generic orchestration loop using Driver
//! - [`mailbox`]: Hand-off of inbound work onto the consumer loop

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
mod bridge;
mod driver;
mod event;
mod input;
pub mod mailbox;
mod runtime;
mod state;

pub use action::AppAction;
pub use app::{App, describe_presence};
pub use bridge::Bridge;
pub use driver::Driver;
pub use event::AppEvent;
pub use input::{Command, CommandError};
pub use runtime::Runtime;
pub use state::{ChatLine, ConnectionState, Conversation, Speaker};
