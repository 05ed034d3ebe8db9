//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the application runtime from specific I/O
//! implementations. Each frontend implements the trait to provide
//! platform-specific I/O, while the generic [`crate::Runtime`] handles all
//! orchestration.

use std::future::Future;

use lobby_client::{InboundHandler, Notification, Publication, Session};

use crate::{App, AppEvent};

/// Abstracts I/O operations for the application runtime.
///
/// Implementations provide platform-specific I/O while the generic
/// [`Runtime`](crate::Runtime) handles orchestration logic. This ensures
/// the same orchestration code runs in the terminal client and simulation.
///
/// # Implementations
///
/// - **CLI**: stdin lines for input, MQTT via rumqttc for transport
/// - **Simulation**: in-memory broker from `lobby-harness`
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Wait for the next user input event.
    ///
    /// Returns `None` once input is exhausted. Must be cancel-safe: the
    /// runtime races it against inbound work.
    fn poll_event(&mut self) -> impl Future<Output = Result<Option<AppEvent>, Self::Error>> + Send;

    /// Connect to the broker and subscribe to the session's channels.
    ///
    /// `on_receive` is invoked from the receive loop for every decoded
    /// envelope, in arrival order. It must not touch consumer state.
    ///
    /// # Errors
    ///
    /// Returns an error if the broker is unreachable or refuses the session.
    fn connect(
        &mut self,
        session: &Session,
        on_receive: InboundHandler,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Publish one envelope.
    ///
    /// # Errors
    ///
    /// Returns an error if not connected or the publish is rejected.
    fn publish(
        &mut self,
        publication: &Publication,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Stop the receive loop and release the connection.
    fn disconnect(&mut self) -> impl Future<Output = ()> + Send;

    /// Check if connected to the broker.
    fn is_connected(&self) -> bool;

    /// Render the application state.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, app: &App) -> Result<(), Self::Error>;

    /// Surface a notification to the user.
    ///
    /// # Errors
    ///
    /// Returns an error if output fails.
    fn notify(&mut self, notification: &Notification) -> Result<(), Self::Error>;
}
