//! Event sinks.
//!
//! - [`BroadcastSink`] fans events out over a `tokio` broadcast channel
//! - [`MemorySink`] keeps an in-memory log, for replays and tests
//! - [`NullSink`] drops everything

use paystream_core::events::StreamEvent;
use paystream_core::traits::EventSink;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::trace;

/// Broadcasts each event to every live subscriber.
///
/// Sending never blocks; a subscriber that falls more than the channel
/// capacity behind observes `RecvError::Lagged`.
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    tx: broadcast::Sender<StreamEvent>,
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StreamEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl EventSink for BroadcastSink {
    fn emit(&self, event: StreamEvent) {
        if self.tx.send(event).is_err() {
            trace!("event dropped: no subscribers");
        }
    }
}

/// Append-only in-memory event log.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<StreamEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every event so far.
    pub fn events(&self) -> Vec<StreamEvent> {
        self.events.lock().clone()
    }

    /// Drain the log.
    pub fn take(&self) -> Vec<StreamEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: StreamEvent) {
        self.events.lock().push(event);
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: StreamEvent) {}
}
