//! Inbound channel adapters for Shimmer.
//!
//! Currently a single adapter: the Facebook Graph webhook that reports page
//! live video starts.

pub mod facebook;
pub mod facebook_payload;
pub mod live_video;
pub mod signature;

pub use facebook::{
    DEFAULT_MAX_BODY_BYTES, DEFAULT_WEBHOOK_PATH, FacebookWebhook, FacebookWebhookAdapter, NotificationReceipt,
    VerificationRequest, WebhookRejection,
};
pub use live_video::{
    DispatchSummary, LoggingLiveVideoHandler, QueuedLiveVideoHandler, dispatch_live_videos,
};
pub use signature::SignatureAlgorithm;

/// All channel adapters implement this trait.
pub trait ChannelAdapter: Send + Sync {
    /// Human-readable adapter name for logging.
    fn name(&self) -> &str;

    /// Build the Axum sub-router serving the adapter's inbound endpoints.
    fn build_router(&self) -> axum::Router {
        axum::Router::new()
    }
}
