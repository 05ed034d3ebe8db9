//! Terminal driver for the CLI.
//!
//! Implements the [`Driver`] trait with line-oriented stdin for commands,
//! plain stdout for output and MQTT for the network. Logs go to stderr so
//! they never interleave with chat lines.

use std::{
    collections::BTreeMap,
    io::{self, Write},
};

use lobby_app::{App, AppEvent, Command, CommandError, Driver, Speaker, describe_presence};
use lobby_client::{
    InboundHandler, Notification, Publication, Session, Username,
    transport::{self, BrokerConfig, Connection, TransportError},
};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// Terminal driver errors.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// I/O error from terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Terminal driver implementing the [`Driver`] trait.
///
/// Render prints only what changed since the previous render: new chat
/// lines per conversation and the status message.
pub struct TerminalDriver<W: Write + Send = io::Stdout> {
    config: BrokerConfig,
    input: Lines<BufReader<Stdin>>,
    output: W,
    connection: Option<Connection>,
    /// Lines already printed per conversation.
    printed: BTreeMap<Username, usize>,
    last_status: Option<String>,
}

impl TerminalDriver {
    /// Create a driver reading stdin and writing stdout.
    pub fn new(config: BrokerConfig) -> Self {
        Self::with_output(config, io::stdout())
    }
}

impl<W: Write + Send> TerminalDriver<W> {
    /// Create a driver reading stdin and writing to `output`.
    pub fn with_output(config: BrokerConfig, output: W) -> Self {
        Self {
            config,
            input: BufReader::new(tokio::io::stdin()).lines(),
            output,
            connection: None,
            printed: BTreeMap::new(),
            last_status: None,
        }
    }

    /// Output sink.
    pub fn output(&self) -> &W {
        &self.output
    }

    fn print_new_lines(&mut self, app: &App) -> io::Result<()> {
        for (peer, conversation) in app.conversations() {
            let printed = self.printed.entry(peer.clone()).or_insert(0);
            for line in conversation.lines.iter().skip(*printed) {
                let author = match line.speaker {
                    Speaker::Me => "Me",
                    Speaker::Peer => peer.as_str(),
                };
                writeln!(self.output, "[{peer}] {author}: {}", line.content)?;
            }
            *printed = conversation.lines.len();
        }
        Ok(())
    }

    fn print_status(&mut self, app: &App) -> io::Result<()> {
        let status = app.status_message();
        if status != self.last_status.as_deref() {
            if let Some(status) = status {
                writeln!(self.output, "-- {status}")?;
            }
            self.last_status = status.map(str::to_string);
        }
        Ok(())
    }
}

impl<W: Write + Send> Driver for TerminalDriver<W> {
    type Error = TerminalError;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        loop {
            let Some(line) = self.input.next_line().await? else {
                return Ok(None);
            };
            match line.parse::<Command>() {
                Ok(command) => return Ok(Some(AppEvent::Input(command))),
                Err(CommandError::Empty) => {},
                Err(e) => writeln!(self.output, "-- {e}")?,
            }
        }
    }

    async fn connect(
        &mut self,
        session: &Session,
        on_receive: InboundHandler,
    ) -> Result<(), Self::Error> {
        if let Some(previous) = self.connection.take() {
            previous.disconnect().await;
        }
        let connection = transport::connect(&self.config, session, on_receive).await?;
        self.connection = Some(connection);
        Ok(())
    }

    async fn publish(&mut self, publication: &Publication) -> Result<(), Self::Error> {
        let connection = self.connection.as_ref().ok_or(TransportError::NotConnected)?;
        connection.publish(&publication.channel, &publication.envelope).await?;
        Ok(())
    }

    async fn disconnect(&mut self) {
        if let Some(connection) = self.connection.take() {
            connection.disconnect().await;
        }
    }

    fn is_connected(&self) -> bool {
        self.connection.as_ref().is_some_and(Connection::is_connected)
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        self.print_new_lines(app)?;
        self.print_status(app)?;
        self.output.flush()?;
        Ok(())
    }

    fn notify(&mut self, notification: &Notification) -> Result<(), Self::Error> {
        match notification {
            // The line itself is printed by render.
            Notification::ChatMessage { .. } => {},
            Notification::PresenceChanged(presence) => {
                writeln!(self.output, "* {}", describe_presence(presence))?;
            },
            Notification::RequestReceived { from } => {
                writeln!(self.output, "* {from} wants to be friends (/accept {from})")?;
            },
            Notification::RequestAccepted { by } => {
                writeln!(self.output, "* {by} accepted your friend request")?;
            },
        }
        Ok(())
    }
}
