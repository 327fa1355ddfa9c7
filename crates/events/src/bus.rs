//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is shared via `Arc<EventBus>`; the engine publishes through
//! it (as a [`NotificationSink`](crate::sink::NotificationSink)) and any
//! number of forwarders subscribe.

use chrono::{DateTime, Utc};
use napwatch_core::alert::AlertEvent;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// AuditEvent
// ---------------------------------------------------------------------------

/// Event type prefix shared by every alert.
pub const ALERT_EVENT_PREFIX: &str = "alert.";

/// Envelope for everything published on the bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Dot-separated event name, e.g. `"alert.score_drop"`.
    pub event_type: String,

    /// Report the event refers to, when there is one.
    pub report_id: Option<Uuid>,

    pub payload: serde_json::Value,

    pub timestamp: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            report_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_report(mut self, report_id: Uuid) -> Self {
        self.report_id = Some(report_id);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    pub fn is_alert(&self) -> bool {
        self.event_type.starts_with(ALERT_EVENT_PREFIX)
    }
}

impl From<&AlertEvent> for AuditEvent {
    fn from(alert: &AlertEvent) -> Self {
        let report_id = alert
            .payload
            .get("report_id")
            .and_then(|v| v.as_str())
            .and_then(|s| Uuid::parse_str(s).ok());
        Self {
            event_type: format!("{ALERT_EVENT_PREFIX}{}", alert.kind.as_str()),
            report_id,
            payload: alert.payload.clone(),
            timestamp: alert.timestamp,
        }
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out event bus.
///
/// When the buffer is full the oldest unconsumed events are dropped and slow
/// receivers observe `RecvError::Lagged`.
pub struct EventBus {
    sender: broadcast::Sender<AuditEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish to all current subscribers. Returns how many received it.
    pub fn publish(&self, event: AuditEvent) -> usize {
        // A send error only means there are no receivers.
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuditEvent> {
        self.sender.subscribe()
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
