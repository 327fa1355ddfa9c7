//! Alert fan-out for the audit engine.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`AuditEvent`]: the envelope carried on the bus.
//! - [`NotificationSink`]: the seam the engine emits alerts through.
//! - [`delivery`]: external delivery channels (webhook).
//! - [`WebhookForwarder`]: background task relaying bus alerts to webhooks.

pub mod bus;
pub mod delivery;
pub mod forwarder;
pub mod sink;

pub use bus::{AuditEvent, EventBus};
pub use delivery::webhook::{WebhookDelivery, WebhookError};
pub use forwarder::WebhookForwarder;
pub use sink::{LogSink, NotificationSink, SinkError};
