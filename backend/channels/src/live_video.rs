//! Live video handlers and per-event dispatch.
//!
//! Dispatch awaits each handler call in order. An error or a panic inside one
//! call is logged and counted; the remaining events are still dispatched.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use futures::FutureExt;
use shimmer_core::{LiveVideoEvent, LiveVideoHandler, ShimmerError};
use shimmer_logging::{EventLogger, WebhookEvent};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Outcome counts of one dispatch pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub dispatched: usize,
    pub failed: usize,
}

/// Hand every event to `handler`, isolating failures per event.
pub async fn dispatch_live_videos(
    handler: &dyn LiveVideoHandler,
    events: &[LiveVideoEvent],
    delivery_id: &str,
) -> DispatchSummary {
    let mut summary = DispatchSummary::default();
    for event in events {
        match dispatch_one(handler, event).await {
            Ok(()) => {
                summary.dispatched += 1;
                EventLogger::log_event(
                    delivery_id,
                    WebhookEvent::LiveVideoDispatched {
                        video_id: event.video_id.clone(),
                        video_title: event.video_title.clone(),
                    },
                );
            }
            Err(e) => {
                summary.failed += 1;
                EventLogger::log_event(
                    delivery_id,
                    WebhookEvent::HandlerFailed {
                        video_id: event.video_id.clone(),
                        error_msg: e.to_string(),
                    },
                );
            }
        }
    }
    summary
}

async fn dispatch_one(
    handler: &dyn LiveVideoHandler,
    event: &LiveVideoEvent,
) -> Result<(), ShimmerError> {
    let call = handler.on_live_video_started(&event.video_id, &event.video_title);
    match AssertUnwindSafe(call).catch_unwind().await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(ShimmerError::HandlerFailed {
            video_id: event.video_id.clone(),
            message: format!("{e:#}"),
        }),
        Err(_) => Err(ShimmerError::HandlerPanicked {
            video_id: event.video_id.clone(),
        }),
    }
}

/// Default handler: records the detection in the log.
#[derive(Debug, Default, Clone)]
pub struct LoggingLiveVideoHandler;

#[async_trait]
impl LiveVideoHandler for LoggingLiveVideoHandler {
    fn name(&self) -> &str {
        "logging"
    }

    async fn on_live_video_started(&self, video_id: &str, video_title: &str) -> Result<()> {
        if video_title.is_empty() {
            info!(video_id = %video_id, "Facebook live video detected");
        } else {
            info!(video_id = %video_id, video_title = %video_title, "Facebook live video detected");
        }
        Ok(())
    }
}

/// Queues events for a background worker so webhook responses don't wait on
/// slow downstream work.
///
/// Enqueueing never blocks: a full or closed queue is reported as a handler
/// failure for that event.
#[derive(Debug, Clone)]
pub struct QueuedLiveVideoHandler {
    tx: mpsc::Sender<LiveVideoEvent>,
}

impl QueuedLiveVideoHandler {
    /// Create the handler and the receiving end of its queue.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<LiveVideoEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Drain `rx` into `inner`, one event at a time, until every sender is dropped.
    ///
    /// Events still buffered when the senders go away are handled before the
    /// task ends, so awaiting the handle after shutdown drains the queue.
    pub fn spawn_worker(
        mut rx: mpsc::Receiver<LiveVideoEvent>,
        inner: Arc<dyn LiveVideoHandler>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(handler = inner.name(), "Live video dispatch worker started");
            let mut processed = 0usize;
            while let Some(event) = rx.recv().await {
                if let Err(e) = dispatch_one(inner.as_ref(), &event).await {
                    error!(error = %e, "Queued live video dispatch failed");
                }
                processed += 1;
            }
            info!(processed, "Live video dispatch worker stopped");
        })
    }
}

#[async_trait]
impl LiveVideoHandler for QueuedLiveVideoHandler {
    fn name(&self) -> &str {
        "queued"
    }

    async fn on_live_video_started(&self, video_id: &str, video_title: &str) -> Result<()> {
        self.tx
            .try_send(LiveVideoEvent::new(video_id, video_title))
            .map_err(|e| ShimmerError::QueueUnavailable(e.to_string()))?;
        Ok(())
    }
}
