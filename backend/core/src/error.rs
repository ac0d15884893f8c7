use thiserror::Error;

/// Top-level error type for the Shimmer webhook receiver.
#[derive(Debug, Error)]
pub enum ShimmerError {
    #[error("live video handler failed for video {video_id}: {message}")]
    HandlerFailed { video_id: String, message: String },

    #[error("live video handler panicked for video {video_id}")]
    HandlerPanicked { video_id: String },

    #[error("dispatch queue unavailable: {0}")]
    QueueUnavailable(String),
}
