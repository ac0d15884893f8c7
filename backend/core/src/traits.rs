use anyhow::Result;
use async_trait::async_trait;

/// Receives every live video the webhook detects.
///
/// Called once per matching change, in payload order, and awaited before the
/// next one is dispatched. A returned error is logged by the caller and never
/// reaches the platform that sent the notification.
#[async_trait]
pub trait LiveVideoHandler: Send + Sync {
    /// Human-readable handler name for logging.
    fn name(&self) -> &str;

    /// Handle a live video that just started. `video_title` may be empty.
    async fn on_live_video_started(&self, video_id: &str, video_title: &str) -> Result<()>;
}
