//! Webhook Event Logger
//!
//! Structured audit events for every webhook request outcome, emitted through
//! `tracing` under the `webhook_events` target.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WebhookEvent {
    SubscriptionVerified,
    SubscriptionRejected {
        reason: String,
    },
    NotificationRejected {
        reason: String,
    },
    /// A required secret is missing; distinct from an attack for operators.
    ConfigurationMissing {
        setting: String,
    },
    NotificationAccepted {
        algorithm: String,
        events: usize,
    },
    LiveVideoDispatched {
        video_id: String,
        video_title: String,
    },
    HandlerFailed {
        video_id: String,
        error_msg: String,
    },
}

#[derive(Debug, Serialize)]
pub struct WebhookEventEntry {
    pub delivery_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: WebhookEvent,
}

pub struct EventLogger;

impl EventLogger {
    /// Build the audit entry for `event` with its free-text fields redacted.
    pub fn entry(delivery_id: &str, mut event: WebhookEvent) -> WebhookEventEntry {
        match &mut event {
            WebhookEvent::SubscriptionRejected { reason }
            | WebhookEvent::NotificationRejected { reason } => {
                *reason = redact_sensitive_data(reason);
            }
            WebhookEvent::HandlerFailed { error_msg, .. } => {
                *error_msg = redact_sensitive_data(error_msg);
            }
            _ => {}
        }

        WebhookEventEntry {
            delivery_id: delivery_id.into(),
            timestamp: Utc::now(),
            event,
        }
    }

    /// Logs a webhook event, redacting free-text fields first.
    pub fn log_event(delivery_id: &str, event: WebhookEvent) {
        let entry = Self::entry(delivery_id, event);
        let payload = serde_json::to_string(&entry).unwrap_or_default();

        match &entry.event {
            WebhookEvent::ConfigurationMissing { .. } => {
                error!(target: "webhook_events", event = %payload, "Webhook misconfigured")
            }
            WebhookEvent::SubscriptionRejected { .. }
            | WebhookEvent::NotificationRejected { .. }
            | WebhookEvent::HandlerFailed { .. } => {
                warn!(target: "webhook_events", event = %payload, "Webhook event")
            }
            _ => info!(target: "webhook_events", event = %payload, "Webhook event"),
        }
    }
}
