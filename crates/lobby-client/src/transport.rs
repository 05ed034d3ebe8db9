//! MQTT transport for the client.
//!
//! Provides [`Connection`] which owns one broker connection and a background
//! receive loop. This is a thin layer that just publishes and delivers
//! envelopes - protocol logic remains in the Sans-IO [`crate::Client`].
//!
//! There is exactly one connection attempt per [`connect`] call and no
//! reconnect: when the receive loop ends the connection is dead for good and
//! the caller must connect again.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use lobby_proto::{Channel, Envelope, Namespace};
use rumqttc::{
    AsyncClient, ConnectReturnCode, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS,
};
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::{InboundHandler, Session};

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Broker unreachable or connection refused.
    #[error("connection failed: {0}")]
    Connect(String),

    /// Subscription request could not be queued.
    #[error("subscribe to {channel} failed: {reason}")]
    Subscribe {
        /// Channel being subscribed.
        channel: Channel,
        /// Underlying error.
        reason: String,
    },

    /// Publish could not be queued.
    #[error("publish to {channel} failed: {reason}")]
    Publish {
        /// Destination channel.
        channel: Channel,
        /// Underlying error.
        reason: String,
    },

    /// Publish attempted after the connection ended.
    #[error("not connected")]
    NotConnected,

    /// Envelope could not be encoded.
    #[error(transparent)]
    Protocol(#[from] lobby_proto::ProtocolError),
}

/// Broker connection settings.
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    /// Broker host name or address.
    pub host: String,
    /// Broker TCP port.
    pub port: u16,
    /// MQTT keep-alive interval.
    pub keep_alive: Duration,
    /// Capacity of the outgoing request queue.
    pub request_capacity: usize,
    /// Topic namespace shared by all instances.
    pub namespace: Namespace,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            host: "broker.hivemq.com".to_string(),
            port: 1883,
            keep_alive: Duration::from_secs(60),
            request_capacity: 10,
            namespace: Namespace::default(),
        }
    }
}

/// Handle to a live broker connection.
///
/// Dropping the handle without calling [`Connection::disconnect`] aborts the
/// receive loop.
pub struct Connection {
    client: AsyncClient,
    /// `None` once [`Connection::disconnect`] took it.
    receive_loop: Option<JoinHandle<()>>,
    connected: Arc<AtomicBool>,
}

impl Connection {
    /// Whether the receive loop is still running.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Publish an envelope. Fire-and-forget (QoS 0, not retained).
    pub async fn publish(
        &self,
        channel: &Channel,
        envelope: &Envelope,
    ) -> Result<(), TransportError> {
        if !self.is_connected() {
            return Err(TransportError::NotConnected);
        }
        let frame = lobby_proto::encode(envelope)?;
        self.client.publish(channel.as_str(), QoS::AtMostOnce, false, frame).await.map_err(|e| {
            TransportError::Publish { channel: channel.clone(), reason: e.to_string() }
        })
    }

    /// Disconnect from the broker and stop the receive loop.
    ///
    /// Requests queued before this call are flushed first.
    pub async fn disconnect(mut self) {
        let Some(receive_loop) = self.receive_loop.take() else {
            return;
        };
        if self.is_connected() && self.client.disconnect().await.is_ok() {
            if let Err(e) = receive_loop.await {
                tracing::debug!(error = %e, "receive loop ended abnormally");
            }
        } else {
            receive_loop.abort();
        }
        tracing::info!("disconnected from broker");
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if let Some(receive_loop) = self.receive_loop.take() {
            receive_loop.abort();
        }
    }
}

/// Connect to a broker as `session`'s identity.
///
/// Makes one connection attempt, subscribes to the session's personal and
/// global channels, then starts the receive loop which hands every decoded
/// envelope to `on_receive` in arrival order.
pub async fn connect(
    config: &BrokerConfig,
    session: &Session,
    on_receive: InboundHandler,
) -> Result<Connection, TransportError> {
    let client_id = format!("lobby-{:016x}", rand::random::<u64>());
    let mut options = MqttOptions::new(client_id, config.host.clone(), config.port);
    options.set_keep_alive(config.keep_alive);
    options.set_clean_session(true);

    let (client, mut eventloop) = AsyncClient::new(options, config.request_capacity);
    await_connack(&mut eventloop).await?;
    tracing::info!(
        host = %config.host,
        port = config.port,
        identity = %session.identity(),
        "connected to broker"
    );

    for channel in session.subscriptions() {
        client.subscribe(channel.as_str(), QoS::AtMostOnce).await.map_err(|e| {
            TransportError::Subscribe { channel: channel.clone(), reason: e.to_string() }
        })?;
    }

    let connected = Arc::new(AtomicBool::new(true));
    let receive_loop = tokio::spawn(run_receive_loop(eventloop, on_receive, connected.clone()));

    Ok(Connection { client, receive_loop: Some(receive_loop), connected })
}

/// Poll until the broker acknowledges the connection. No retries.
async fn await_connack(eventloop: &mut EventLoop) -> Result<(), TransportError> {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                return match ack.code {
                    ConnectReturnCode::Success => Ok(()),
                    code => Err(TransportError::Connect(format!("refused: {code:?}"))),
                };
            },
            Ok(_) => {},
            Err(e) => return Err(TransportError::Connect(e.to_string())),
        }
    }
}

/// Drive the event loop, delivering inbound publishes one at a time.
async fn run_receive_loop(
    mut eventloop: EventLoop,
    mut on_receive: InboundHandler,
    connected: Arc<AtomicBool>,
) {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                match lobby_proto::decode(&publish.payload) {
                    Ok(envelope) => on_receive(envelope),
                    Err(e) => {
                        tracing::warn!(
                            topic = %publish.topic,
                            error = %e,
                            "dropping malformed frame"
                        );
                    },
                }
            },
            Ok(Event::Outgoing(Outgoing::Disconnect)) => break,
            Ok(_) => {},
            Err(e) => {
                tracing::warn!(error = %e, "broker connection lost");
                break;
            },
        }
    }
    connected.store(false, Ordering::Release);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_points_at_public_broker() {
        let config = BrokerConfig::default();
        assert_eq!(config.host, "broker.hivemq.com");
        assert_eq!(config.port, 1883);
        assert_eq!(config.namespace.as_str(), Namespace::DEFAULT);
    }

    #[tokio::test]
    async fn unreachable_broker_is_connect_failure() {
        let config = BrokerConfig {
            host: "127.0.0.1".to_string(),
            // Reserved port; nothing listens here.
            port: 9,
            ..BrokerConfig::default()
        };
        let session = Session::new(
            lobby_proto::Username::new("alice").unwrap(),
            config.namespace.clone(),
        );

        let result = connect(&config, &session, Box::new(|_| {})).await;
        assert!(matches!(result, Err(TransportError::Connect(_))));
    }
}
