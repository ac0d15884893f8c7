//! Telemetry and structured logging components for Shimmer.
//!
//! Handles log redaction, console and JSON file output, and webhook audit events.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{EventLogger, WebhookEvent, WebhookEventEntry};
pub use logger::init_logger;
pub use redact::redact_sensitive_data;
