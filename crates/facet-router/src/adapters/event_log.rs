//! # Event Sinks

use crate::events::RouterEvent;
use crate::ports::outbound::RouterEventSink;
use parking_lot::Mutex;
use tracing::{debug, info};

/// Logs every event through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl RouterEventSink for TracingEventSink {
    fn emit(&self, event: RouterEvent) {
        info!(topic = event.topic(), event = event.name(), "router event");
        if let Ok(json) = serde_json::to_string(&event) {
            debug!(payload = %json, "router event payload");
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct InMemoryEventLog {
    events: Mutex<Vec<RouterEvent>>,
}

impl InMemoryEventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events so far.
    #[must_use]
    pub fn events(&self) -> Vec<RouterEvent> {
        self.events.lock().clone()
    }

    /// Events on `topic`.
    #[must_use]
    pub fn on_topic(&self, topic: &str) -> Vec<RouterEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.topic() == topic)
            .cloned()
            .collect()
    }

    /// Takes all events, leaving the log empty.
    pub fn drain(&self) -> Vec<RouterEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    /// Number of events recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl RouterEventSink for InMemoryEventLog {
    fn emit(&self, event: RouterEvent) {
        self.events.lock().push(event);
    }
}
