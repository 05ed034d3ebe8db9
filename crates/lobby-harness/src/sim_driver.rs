//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` provides the same interface as the terminal driver but for
//! deterministic testing. It implements [`Driver`] so the same
//! [`lobby_app::Runtime`] orchestration code runs in both production and
//! simulation.
//!
//! User input is a channel: [`SimDriver::poll_event`] waits on it like the
//! terminal waits on stdin, and reports end of input once every sender,
//! including the driver's own, is gone.

use lobby_app::{App, AppEvent, Driver};
use lobby_client::{InboundHandler, Notification, Publication, Session};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::{BrokerError, MemoryBroker, SubscriberId};

/// Error type for simulation driver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimDriverError {
    /// Publish attempted without a live subscription.
    #[error("not connected")]
    NotConnected,

    /// Broker rejected the operation.
    #[error(transparent)]
    Broker(#[from] BrokerError),
}

/// Simulation driver for deterministic testing.
pub struct SimDriver {
    broker: MemoryBroker,
    subscription: Option<SubscriberId>,
    input: mpsc::UnboundedReceiver<AppEvent>,
    input_tx: Option<mpsc::UnboundedSender<AppEvent>>,
    notifications: Vec<Notification>,
    renders: usize,
}

impl SimDriver {
    /// Create a driver attached to `broker` on connect.
    pub fn new(broker: MemoryBroker) -> Self {
        let (input_tx, input) = mpsc::unbounded_channel();
        Self {
            broker,
            subscription: None,
            input,
            input_tx: Some(input_tx),
            notifications: Vec::new(),
            renders: 0,
        }
    }

    /// Queue a user event. Ignored once input is closed.
    pub fn inject_event(&mut self, event: AppEvent) {
        if let Some(tx) = &self.input_tx {
            let _ = tx.send(event);
        }
    }

    /// Stop accepting user events. Queued events are still delivered.
    pub fn close_input(&mut self) {
        self.input_tx = None;
    }

    /// Current broker subscription. `None` if never connected.
    pub fn subscription(&self) -> Option<SubscriberId> {
        self.subscription
    }

    /// Simulate the broker dropping this client without a clean disconnect.
    pub fn sever(&mut self) {
        if let Some(id) = self.subscription {
            self.broker.detach(id);
        }
    }

    /// Notifications surfaced so far.
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Take all captured notifications.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Number of render calls.
    pub fn renders(&self) -> usize {
        self.renders
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        Ok(self.input.recv().await)
    }

    async fn connect(
        &mut self,
        session: &Session,
        on_receive: InboundHandler,
    ) -> Result<(), Self::Error> {
        if let Some(id) = self.subscription.take() {
            self.broker.detach(id);
        }
        let id = self.broker.attach(session.subscriptions().to_vec(), on_receive)?;
        self.subscription = Some(id);
        Ok(())
    }

    async fn publish(&mut self, publication: &Publication) -> Result<(), Self::Error> {
        if !self.is_connected() {
            return Err(SimDriverError::NotConnected);
        }
        self.broker.publish(&publication.channel, &publication.envelope)?;
        Ok(())
    }

    async fn disconnect(&mut self) {
        if let Some(id) = self.subscription.take() {
            self.broker.detach(id);
        }
    }

    fn is_connected(&self) -> bool {
        self.subscription.is_some_and(|id| self.broker.is_attached(id))
    }

    fn render(&mut self, _app: &App) -> Result<(), Self::Error> {
        self.renders += 1;
        Ok(())
    }

    fn notify(&mut self, notification: &Notification) -> Result<(), Self::Error> {
        self.notifications.push(notification.clone());
        Ok(())
    }
}
