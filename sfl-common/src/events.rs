//! Event types for the SF6 Live event system
//!
//! Session lifecycle events are broadcast via [`EventBus`] and serialized for
//! SSE transmission to overlay pages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Default broadcast buffer size
pub const DEFAULT_EVENT_CAPACITY: usize = 100;

/// Overlay event types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OverlayEvent {
    /// A new session was created from the first observation
    SessionStarted {
        start_mr: i64,
        timestamp: DateTime<Utc>,
    },

    /// A rating change was recorded as a match
    MatchRecorded {
        mr: i64,
        previous_mr: i64,
        change: i64,
        win: bool,
        timestamp: DateTime<Utc>,
    },

    /// The operator ended the session (data retained)
    SessionEnded {
        total_matches: usize,
        timestamp: DateTime<Utc>,
    },

    /// The operator reset the session (data discarded)
    SessionReset {
        timestamp: DateTime<Utc>,
    },
}

impl OverlayEvent {
    /// Event name used for the SSE `event:` field
    pub fn event_type(&self) -> &'static str {
        match self {
            OverlayEvent::SessionStarted { .. } => "SessionStarted",
            OverlayEvent::MatchRecorded { .. } => "MatchRecorded",
            OverlayEvent::SessionEnded { .. } => "SessionEnded",
            OverlayEvent::SessionReset { .. } => "SessionReset",
        }
    }
}

/// Broadcast bus for overlay events
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<OverlayEvent>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per lagging subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Broadcast an event to all subscribers
    pub fn publish(&self, event: OverlayEvent) {
        // No receivers is OK
        let _ = self.tx.send(event);
    }

    /// Subscribe to the event stream
    pub fn subscribe(&self) -> broadcast::Receiver<OverlayEvent> {
        self.tx.subscribe()
    }

    /// Number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}
