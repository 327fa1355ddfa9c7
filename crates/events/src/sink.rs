//! The notification seam.
//!
//! Emission is fire-and-forget from the engine's point of view: a
//! [`SinkError`] is logged by the caller and never fails an audit.

use async_trait::async_trait;
use napwatch_core::alert::AlertEvent;

use crate::bus::{AuditEvent, EventBus};

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn emit(&self, alert: AlertEvent) -> Result<(), SinkError>;
}

#[async_trait]
impl NotificationSink for EventBus {
    async fn emit(&self, alert: AlertEvent) -> Result<(), SinkError> {
        let receivers = self.publish(AuditEvent::from(&alert));
        tracing::debug!(kind = alert.kind.as_str(), receivers, "Alert published");
        Ok(())
    }
}

/// Writes every alert to the log. Used when nothing else is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn emit(&self, alert: AlertEvent) -> Result<(), SinkError> {
        tracing::warn!(
            kind = alert.kind.as_str(),
            payload = %alert.payload,
            "Audit alert raised",
        );
        Ok(())
    }
}
