//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is shared via `Arc<EventBus>` across the application.
//! Every publish also bumps a monotonic change version; dashboard
//! clients poll the version over HTTP instead of holding a push channel.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// DashboardEvent
// ---------------------------------------------------------------------------

/// A domain event that occurred on the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardEvent {
    /// Dot-separated event name, e.g. `"icon.ready"`.
    pub event_type: String,

    /// Name of the item the event concerns, when applicable.
    pub item_name: Option<String>,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl DashboardEvent {
    /// Create a new event with only the required `event_type`.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            item_name: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Attach the item the event concerns.
    pub fn with_item(mut self, name: impl Into<String>) -> Self {
        self.item_name = Some(name.into());
        self
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out event bus with a poll-friendly change counter.
///
/// Wraps a [`broadcast::Sender`] so any number of subscribers can
/// independently receive every published [`DashboardEvent`]. The change
/// version starts at 0 and increments on every publish, so a client that
/// remembers the last version it saw can cheaply detect that something
/// changed.
pub struct EventBus {
    sender: broadcast::Sender<DashboardEvent>,
    version: AtomicU64,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are
    /// dropped and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            version: AtomicU64::new(0),
        }
    }

    /// Publish an event to all current subscribers and bump the change
    /// version.
    ///
    /// If there are no active subscribers the event itself is dropped;
    /// the version bump still happens, which is all polling clients need.
    pub fn publish(&self, event: DashboardEvent) {
        self.version.fetch_add(1, Ordering::Relaxed);
        // Ignore the SendError; it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.sender.subscribe()
    }

    /// Current change version for polling clients.
    pub fn change_version(&self) -> u64 {
        self.version.load(Ordering::Relaxed)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
