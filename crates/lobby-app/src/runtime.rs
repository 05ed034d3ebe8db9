//! Generic runtime for application orchestration.
//!
//! The Runtime drives the application event loop, coordinating between:
//! - [`App`]: UI state machine
//! - [`Bridge`]: Protocol bridge to Client
//! - [`Driver`]: Platform-specific I/O
//!
//! Inbound envelopes never reach consumer state from the receive loop. The
//! handler given to [`Driver::connect`] schedules a job on the runtime's
//! mailbox, and the runtime runs those jobs between user events.

use lobby_client::{Client, Envelope, InboundHandler, Session, Username};

use crate::{
    App, AppAction, AppEvent, Bridge, ConnectionState, Driver,
    mailbox::{self, Mailbox, Scheduler},
};

/// State owned by the consumer loop.
struct Core {
    app: App,
    bridge: Bridge,
    /// Actions produced by mailbox jobs, run by the runtime afterwards.
    deferred: Vec<AppAction>,
}

impl Core {
    fn receive(&mut self, envelope: Envelope) {
        for event in self.bridge.handle_envelope(envelope) {
            let actions = self.app.handle(event);
            self.deferred.extend(actions);
        }
    }
}

/// Generic runtime that orchestrates App, Bridge, and Driver.
pub struct Runtime<D: Driver> {
    driver: D,
    core: Core,
    scheduler: Scheduler<Core>,
    mailbox: Mailbox<Core>,
}

impl<D: Driver> Runtime<D> {
    /// Create a new runtime for `session` over `driver`.
    pub fn new(driver: D, session: Session) -> Self {
        let app = App::new(session.identity().clone());
        let bridge = Bridge::new(session);
        let (scheduler, mailbox) = mailbox::mailbox();
        Self { driver, core: Core { app, bridge, deferred: Vec::new() }, scheduler, mailbox }
    }

    /// Run the main event loop until the user quits or input closes.
    ///
    /// Each turn waits for either a user event or an inbound job, so the
    /// consumer stays the only writer of application state. Queued inbound
    /// jobs run before the next user event.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn run(mut self) -> Result<(), D::Error> {
        self.driver.render(&self.core.app)?;

        loop {
            let should_quit = tokio::select! {
                biased;

                Some(job) = self.mailbox.recv() => {
                    job(&mut self.core);
                    self.run_deferred().await?
                },
                event = self.driver.poll_event() => match event? {
                    Some(event) => self.handle_event(event).await?,
                    None => true,
                },
            };
            if should_quit {
                break;
            }
        }

        self.shutdown().await
    }

    /// Feed one event to the App and execute its actions.
    ///
    /// Returns `true` if the application should quit.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver fails to render or notify.
    pub async fn handle_event(&mut self, event: AppEvent) -> Result<bool, D::Error> {
        self.dispatch(|app| app.handle(event)).await
    }

    /// Run every queued inbound job in scheduling order.
    ///
    /// Returns the number of jobs run.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver fails to render or notify.
    pub async fn run_pending(&mut self) -> Result<usize, D::Error> {
        let mut ran = 0;
        while let Some(job) = self.mailbox.try_recv() {
            job(&mut self.core);
            self.run_deferred().await?;
            ran += 1;
        }
        Ok(ran)
    }

    /// Connect to the broker and announce presence.
    ///
    /// Returns `true` once connected, `false` if the broker could not be
    /// reached. Connecting over a live connection is a no-op; a connection
    /// the transport has lost is replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver fails to render.
    pub async fn connect(&mut self) -> Result<bool, D::Error> {
        self.dispatch(App::connect).await?;
        Ok(self.core.app.connection_state() == ConnectionState::Connected)
    }

    /// Send a direct message to `to`.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver fails to render.
    pub async fn send_message(&mut self, to: Username, content: String) -> Result<(), D::Error> {
        self.dispatch(|app| app.send_message(to, content)).await?;
        Ok(())
    }

    /// Send a friend request to `to`.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver fails to render.
    pub async fn send_friend_request(&mut self, to: Username) -> Result<(), D::Error> {
        self.dispatch(|app| app.add_friend(to)).await?;
        Ok(())
    }

    /// Accept the pending request from `from`.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver fails to render.
    pub async fn accept_friend_request(&mut self, from: Username) -> Result<(), D::Error> {
        self.dispatch(|app| app.accept_request(from)).await?;
        Ok(())
    }

    /// Change the activity shown to friends. `None` clears it.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver fails to render.
    pub async fn update_presence(&mut self, activity: Option<String>) -> Result<(), D::Error> {
        self.dispatch(|app| app.set_activity(activity)).await?;
        Ok(())
    }

    /// Announce offline, release the connection and mark disconnected.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver fails to render.
    pub async fn shutdown(&mut self) -> Result<(), D::Error> {
        if self.driver.is_connected() {
            let mut events = self.core.bridge.handle_disconnecting();
            events.extend(self.flush().await);
            for event in events {
                self.core.app.handle(event);
            }
            self.driver.disconnect().await;
            tracing::info!(username = %self.core.app.username(), "disconnected");
        }

        if self.core.app.connection_state() != ConnectionState::Disconnected {
            let actions = self.core.app.handle(AppEvent::Disconnected);
            self.process_actions(actions).await?;
        }
        Ok(())
    }

    /// Run one App operation against an up-to-date connection state.
    ///
    /// Returns `true` if should quit.
    async fn dispatch(
        &mut self,
        operation: impl FnOnce(&mut App) -> Vec<AppAction>,
    ) -> Result<bool, D::Error> {
        self.detect_lost_connection().await?;
        let actions = operation(&mut self.core.app);
        self.process_actions(actions).await
    }

    /// Tell the App if the transport dropped a connection it still
    /// considers live.
    async fn detect_lost_connection(&mut self) -> Result<(), D::Error> {
        if self.core.app.connection_state() == ConnectionState::Connected
            && !self.driver.is_connected()
        {
            tracing::warn!(username = %self.core.app.username(), "connection lost");
            let actions = self.core.app.handle(AppEvent::ConnectionLost);
            self.process_actions(actions).await?;
        }
        Ok(())
    }

    /// Process actions returned by the App.
    ///
    /// Returns `true` if should quit.
    async fn process_actions(&mut self, initial_actions: Vec<AppAction>) -> Result<bool, D::Error> {
        let mut pending_actions = initial_actions;
        let mut should_quit = false;

        while !pending_actions.is_empty() {
            let actions = std::mem::take(&mut pending_actions);

            for action in actions {
                let events = match action {
                    AppAction::Render => {
                        self.driver.render(&self.core.app)?;
                        continue;
                    },
                    AppAction::Notify(notification) => {
                        self.driver.notify(&notification)?;
                        continue;
                    },
                    AppAction::Quit => {
                        should_quit = true;
                        continue;
                    },
                    AppAction::Connect => self.connect_events().await,

                    // Protocol operations go through the bridge
                    AppAction::SendMessage { .. }
                    | AppAction::SendFriendRequest { .. }
                    | AppAction::AcceptFriendRequest { .. }
                    | AppAction::UpdatePresence { .. } => {
                        let mut events = self.core.bridge.process_app_action(action);
                        events.extend(self.flush().await);
                        events
                    },
                };

                for event in events {
                    pending_actions.extend(self.core.app.handle(event));
                }
            }
        }
        Ok(should_quit)
    }

    /// Actions produced by mailbox jobs.
    async fn run_deferred(&mut self) -> Result<bool, D::Error> {
        let actions = std::mem::take(&mut self.core.deferred);
        self.process_actions(actions).await
    }

    /// Connect the driver and return the resulting App events.
    async fn connect_events(&mut self) -> Vec<AppEvent> {
        let scheduler = self.scheduler.clone();
        let on_receive: InboundHandler = Box::new(move |envelope| {
            if let Err(e) = scheduler.schedule(move |core: &mut Core| core.receive(envelope)) {
                tracing::warn!(error = %e, "dropping inbound envelope");
            }
        });

        let session = self.core.bridge.client().session();
        let result = self.driver.connect(session, on_receive).await;
        match result {
            Ok(()) => {
                tracing::info!(username = %self.core.app.username(), "connected");
                let mut events = self.core.bridge.handle_connected();
                events.extend(self.flush().await);
                events
            },
            Err(e) => {
                tracing::warn!(error = %e, "connect failed");
                vec![AppEvent::ConnectFailed { reason: e.to_string() }]
            },
        }
    }

    /// Publish all pending outgoing envelopes.
    ///
    /// Failures are logged and returned as error events; the rest of the
    /// batch is still attempted.
    async fn flush(&mut self) -> Vec<AppEvent> {
        let mut events = Vec::new();
        for publication in self.core.bridge.take_outgoing() {
            if let Err(e) = self.driver.publish(&publication).await {
                tracing::warn!(
                    channel = %publication.channel,
                    kind = %publication.envelope.kind(),
                    error = %e,
                    "publish failed"
                );
                events.push(AppEvent::Error { message: e.to_string() });
            }
        }
        events
    }

    /// Get a reference to the App.
    pub fn app(&self) -> &App {
        &self.core.app
    }

    /// Get a reference to the protocol client.
    pub fn client(&self) -> &Client {
        self.core.bridge.client()
    }

    /// Get a reference to the driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Get a mutable reference to the driver.
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }
}
