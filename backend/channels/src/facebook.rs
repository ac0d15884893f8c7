//! Facebook Graph webhook endpoint for page live video notifications.
//!
//! One route, two methods:
//! - `GET`: subscription handshake. Echo `hub.challenge` when `hub.mode` is
//!   `subscribe` and `hub.verify_token` matches the configured token.
//! - `POST`: notification. Authenticate the `X-Hub-Signature-256` (or legacy
//!   `X-Hub-Signature`) HMAC of the raw body, then dispatch every live video
//!   start to the [`LiveVideoHandler`] and acknowledge with `EVENT_RECEIVED`.
//!
//! Every rejection is a bare `403 Forbidden`; which check failed is only logged.
//! Once authenticated, a notification is always acknowledged with 200 so the
//! platform does not retry because of internal errors.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use shimmer_config::ConfigProvider;
use shimmer_core::LiveVideoHandler;
use shimmer_logging::{EventLogger, WebhookEvent};
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::facebook_payload::NotificationEnvelope;
use crate::live_video::{dispatch_live_videos, DispatchSummary};
use crate::signature::{select_signature, verify_signature, SignatureAlgorithm};
use crate::ChannelAdapter;

pub const DEFAULT_WEBHOOK_PATH: &str = "/shimmer/v1/facebook-webhook";
pub const FORBIDDEN_BODY: &str = "Forbidden";
pub const EVENT_RECEIVED_BODY: &str = "EVENT_RECEIVED";
/// Largest notification body read before the request is refused.
pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;
const SUBSCRIBE_MODE: &str = "subscribe";

/// Why a request was refused. All variants answer `403 Forbidden`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WebhookRejection {
    #[error("hub.mode is not 'subscribe'")]
    ModeMismatch,
    #[error("verify token not configured")]
    VerifyTokenNotConfigured,
    #[error("verify token mismatch")]
    VerifyTokenMismatch,
    #[error("no X-Hub-Signature-256 or X-Hub-Signature header")]
    MissingSignature,
    #[error("app secret not configured")]
    AppSecretNotConfigured,
    #[error("{0} signature mismatch")]
    SignatureMismatch(SignatureAlgorithm),
    #[error("request body unreadable or larger than {limit} bytes")]
    BodyUnreadable { limit: usize },
}

impl WebhookRejection {
    /// Missing configuration, as opposed to a bad or hostile request.
    pub fn is_configuration_missing(&self) -> bool {
        matches!(self, Self::VerifyTokenNotConfigured | Self::AppSecretNotConfigured)
    }
}

impl IntoResponse for WebhookRejection {
    fn into_response(self) -> Response {
        (StatusCode::FORBIDDEN, FORBIDDEN_BODY).into_response()
    }
}

/// The handshake parameters. Missing parameters are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationRequest {
    pub mode: String,
    pub verify_token: String,
    pub challenge: String,
}

impl VerificationRequest {
    /// Read `hub.mode`, `hub.verify_token` and `hub.challenge`, also accepting
    /// the underscore spellings (`hub_mode`, ...).
    pub fn from_query(params: &HashMap<String, String>) -> Self {
        let param = |name: &str| {
            params
                .get(&format!("hub.{name}"))
                .or_else(|| params.get(&format!("hub_{name}")))
                .cloned()
                .unwrap_or_default()
        };
        Self {
            mode: param("mode"),
            verify_token: param("verify_token"),
            challenge: param("challenge"),
        }
    }
}

/// What an accepted notification produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationReceipt {
    pub algorithm: SignatureAlgorithm,
    pub events_found: usize,
    pub dispatch: DispatchSummary,
}

/// The verification and ingestion logic, independent of the HTTP framework.
#[derive(Clone)]
pub struct FacebookWebhook {
    config: Arc<dyn ConfigProvider>,
    handler: Arc<dyn LiveVideoHandler>,
}

impl FacebookWebhook {
    pub fn new(config: Arc<dyn ConfigProvider>, handler: Arc<dyn LiveVideoHandler>) -> Self {
        Self { config, handler }
    }

    /// Answer a subscription handshake with the challenge to echo.
    pub async fn verify_subscription(
        &self,
        request: &VerificationRequest,
    ) -> Result<String, WebhookRejection> {
        if request.mode != SUBSCRIBE_MODE {
            return Err(WebhookRejection::ModeMismatch);
        }
        let expected = self
            .config
            .verify_token()
            .await
            .ok_or(WebhookRejection::VerifyTokenNotConfigured)?;
        if !bool::from(expected.as_bytes().ct_eq(request.verify_token.as_bytes())) {
            return Err(WebhookRejection::VerifyTokenMismatch);
        }
        Ok(request.challenge.clone())
    }

    /// Authenticate, parse, and dispatch one notification.
    pub async fn receive_notification(
        &self,
        headers: &HeaderMap,
        body: &[u8],
        delivery_id: &str,
    ) -> Result<NotificationReceipt, WebhookRejection> {
        let algorithm = self.authenticate(headers, body).await?;

        let envelope = NotificationEnvelope::parse(body);
        let events = envelope.live_video_events();
        debug!(
            delivery_id = %delivery_id,
            entries = envelope.entries.len(),
            events = events.len(),
            "Parsed notification"
        );

        EventLogger::log_event(
            delivery_id,
            WebhookEvent::NotificationAccepted {
                algorithm: algorithm.to_string(),
                events: events.len(),
            },
        );

        let dispatch = dispatch_live_videos(self.handler.as_ref(), &events, delivery_id).await;
        Ok(NotificationReceipt {
            algorithm,
            events_found: events.len(),
            dispatch,
        })
    }

    async fn authenticate(
        &self,
        headers: &HeaderMap,
        body: &[u8],
    ) -> Result<SignatureAlgorithm, WebhookRejection> {
        let received = select_signature(headers).ok_or(WebhookRejection::MissingSignature)?;
        let secret = self
            .config
            .app_secret()
            .await
            .ok_or(WebhookRejection::AppSecretNotConfigured)?;
        if !verify_signature(&received, secret.as_bytes(), body) {
            return Err(WebhookRejection::SignatureMismatch(received.algorithm));
        }
        Ok(received.algorithm)
    }
}

/// Mounts [`FacebookWebhook`] on a single path.
pub struct FacebookWebhookAdapter {
    webhook: FacebookWebhook,
    path: String,
    max_body_bytes: usize,
}

impl FacebookWebhookAdapter {
    pub fn new(webhook: FacebookWebhook) -> Self {
        Self {
            webhook,
            path: DEFAULT_WEBHOOK_PATH.to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Bodies over `limit` bytes are refused with 403 like any other rejection.
    pub fn with_max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl ChannelAdapter for FacebookWebhookAdapter {
    fn name(&self) -> &str {
        "facebook"
    }

    fn build_router(&self) -> Router {
        let state = RouteState {
            webhook: self.webhook.clone(),
            max_body_bytes: self.max_body_bytes,
        };
        // The body is read in `handle_webhook` against our own limit so an
        // oversized request still answers 403 rather than axum's 413.
        Router::new()
            .route(&self.path, get(verify_webhook).post(handle_webhook))
            .layer(DefaultBodyLimit::disable())
            .with_state(state)
    }
}

#[derive(Clone)]
struct RouteState {
    webhook: FacebookWebhook,
    max_body_bytes: usize,
}

async fn verify_webhook(
    State(RouteState { webhook, .. }): State<RouteState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let delivery_id = Uuid::new_v4().to_string();
    let request = VerificationRequest::from_query(&params);
    match webhook.verify_subscription(&request).await {
        Ok(challenge) => {
            EventLogger::log_event(&delivery_id, WebhookEvent::SubscriptionVerified);
            (StatusCode::OK, [(header::CONTENT_TYPE, "text/plain")], challenge).into_response()
        }
        Err(rejection) => {
            let event = if rejection.is_configuration_missing() {
                WebhookEvent::ConfigurationMissing {
                    setting: shimmer_config::VERIFY_TOKEN_KEY.to_string(),
                }
            } else {
                WebhookEvent::SubscriptionRejected {
                    reason: rejection.to_string(),
                }
            };
            EventLogger::log_event(&delivery_id, event);
            rejection.into_response()
        }
    }
}

async fn handle_webhook(
    State(state): State<RouteState>,
    headers: HeaderMap,
    body: Body,
) -> Response {
    let delivery_id = Uuid::new_v4().to_string();
    let received = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => {
            state
                .webhook
                .receive_notification(&headers, &bytes, &delivery_id)
                .await
        }
        Err(_) => Err(WebhookRejection::BodyUnreadable {
            limit: state.max_body_bytes,
        }),
    };
    match received {
        Ok(_) => (StatusCode::OK, EVENT_RECEIVED_BODY).into_response(),
        Err(rejection) => {
            let event = if rejection.is_configuration_missing() {
                WebhookEvent::ConfigurationMissing {
                    setting: shimmer_config::APP_SECRET_KEY.to_string(),
                }
            } else {
                WebhookEvent::NotificationRejected {
                    reason: rejection.to_string(),
                }
            };
            EventLogger::log_event(&delivery_id, event);
            rejection.into_response()
        }
    }
}
