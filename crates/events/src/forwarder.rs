//! Background relay from the event bus to webhook endpoints.
//!
//! [`WebhookForwarder::run`] subscribes to the bus and delivers every alert
//! event to each configured URL. Non-alert events are ignored. The loop exits
//! when the bus is dropped or the cancellation token fires.

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::bus::AuditEvent;
use crate::delivery::webhook::WebhookDelivery;

pub struct WebhookForwarder {
    delivery: WebhookDelivery,
    urls: Vec<String>,
}

impl WebhookForwarder {
    pub fn new(delivery: WebhookDelivery, urls: Vec<String>) -> Self {
        Self { delivery, urls }
    }

    pub async fn run(self, mut receiver: broadcast::Receiver<AuditEvent>, cancel: CancellationToken) {
        tracing::info!(targets = self.urls.len(), "Webhook forwarder started");
        loop {
            let received = tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Webhook forwarder stopping");
                    break;
                }
                received = receiver.recv() => received,
            };

            match received {
                Ok(event) if event.is_alert() => self.forward(&event).await,
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Webhook forwarder lagged, alerts were dropped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, webhook forwarder shutting down");
                    break;
                }
            }
        }
    }

    async fn forward(&self, event: &AuditEvent) {
        for url in &self.urls {
            if let Err(e) = self.delivery.deliver(url, event).await {
                tracing::error!(
                    url = %url,
                    event_type = %event.event_type,
                    error = %e,
                    "Failed to forward alert",
                );
            }
        }
    }
}
