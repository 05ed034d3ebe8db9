//! In-memory publish/subscribe broker.
//!
//! Stands in for the MQTT broker in tests. Publishing is synchronous: every
//! matching subscriber's handler has run by the time `publish` returns, so
//! tests control interleaving exactly.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use lobby_client::{Channel, Envelope, InboundHandler, Publication};
use lobby_proto::ProtocolError;
use thiserror::Error;

/// Broker-side failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrokerError {
    /// Broker refuses connections and publishes.
    #[error("broker unreachable")]
    Unreachable,

    /// Envelope could not be encoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Handle for one attached subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriberId(u64);

struct Subscriber {
    channels: Vec<Channel>,
    handler: Arc<Mutex<InboundHandler>>,
}

struct BrokerState {
    reachable: bool,
    next_id: u64,
    subscribers: BTreeMap<SubscriberId, Subscriber>,
    history: Vec<Publication>,
    dropped_frames: usize,
}

/// Shared in-memory broker. Clones refer to the same broker.
#[derive(Clone)]
pub struct MemoryBroker {
    state: Arc<Mutex<BrokerState>>,
}

impl Default for MemoryBroker {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBroker {
    /// Create a reachable broker with no subscribers.
    pub fn new() -> Self {
        let state = BrokerState {
            reachable: true,
            next_id: 1,
            subscribers: BTreeMap::new(),
            history: Vec::new(),
            dropped_frames: 0,
        };
        Self { state: Arc::new(Mutex::new(state)) }
    }

    fn lock(&self) -> MutexGuard<'_, BrokerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make the broker accept or refuse new connections.
    pub fn set_reachable(&self, reachable: bool) {
        self.lock().reachable = reachable;
    }

    /// Attach a subscriber to `channels`.
    pub fn attach(
        &self,
        channels: Vec<Channel>,
        handler: InboundHandler,
    ) -> Result<SubscriberId, BrokerError> {
        let mut state = self.lock();
        if !state.reachable {
            return Err(BrokerError::Unreachable);
        }
        let id = SubscriberId(state.next_id);
        state.next_id += 1;
        let handler = Arc::new(Mutex::new(handler));
        state.subscribers.insert(id, Subscriber { channels, handler });
        Ok(id)
    }

    /// Remove a subscriber. Returns `false` if it was not attached.
    pub fn detach(&self, id: SubscriberId) -> bool {
        self.lock().subscribers.remove(&id).is_some()
    }

    /// Whether `id` is still attached.
    pub fn is_attached(&self, id: SubscriberId) -> bool {
        self.lock().subscribers.contains_key(&id)
    }

    /// Number of attached subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    /// Encode and publish an envelope.
    pub fn publish(&self, channel: &Channel, envelope: &Envelope) -> Result<(), BrokerError> {
        if !self.lock().reachable {
            return Err(BrokerError::Unreachable);
        }
        let payload = lobby_proto::encode(envelope)?;
        self.publish_raw(channel, &payload);
        Ok(())
    }

    /// Publish raw bytes, as a foreign or broken client would.
    ///
    /// Frames that do not decode are dropped and counted, matching the
    /// transport's receive loop.
    pub fn publish_raw(&self, channel: &Channel, payload: &[u8]) {
        let envelope = match lobby_proto::decode(payload) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(%channel, error = %e, "dropping malformed frame");
                self.lock().dropped_frames += 1;
                return;
            },
        };

        let handlers: Vec<_> = {
            let mut state = self.lock();
            state
                .history
                .push(Publication { channel: channel.clone(), envelope: envelope.clone() });
            state
                .subscribers
                .values()
                .filter(|s| s.channels.contains(channel))
                .map(|s| Arc::clone(&s.handler))
                .collect()
        };

        // Handlers run outside the broker lock so they may publish.
        for handler in handlers {
            let mut guard = handler.lock().unwrap_or_else(PoisonError::into_inner);
            let deliver = &mut *guard;
            deliver(envelope.clone());
        }
    }

    /// Every well-formed publication so far, in order.
    pub fn history(&self) -> Vec<Publication> {
        self.lock().history.clone()
    }

    /// Publications sent to `channel`.
    pub fn history_on(&self, channel: &Channel) -> Vec<Envelope> {
        self.lock()
            .history
            .iter()
            .filter(|p| &p.channel == channel)
            .map(|p| p.envelope.clone())
            .collect()
    }

    /// Frames dropped because they failed to decode.
    pub fn dropped_frames(&self) -> usize {
        self.lock().dropped_frames
    }
}
