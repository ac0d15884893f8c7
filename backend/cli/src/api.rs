use axum::{http::StatusCode, routing::get, Router};
use shimmer_channels::ChannelAdapter;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Build the Axum router: health check plus every adapter's routes.
pub fn build_router(adapters: &[&dyn ChannelAdapter]) -> Router {
    let mut app = Router::new().route("/api/health", get(health));

    for adapter in adapters {
        app = app.merge(adapter.build_router());
        info!(adapter = adapter.name(), "Mounted channel adapter");
    }

    app.layer(TraceLayer::new_for_http())
}

/// Health check endpoint.
async fn health() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use shimmer_channels::{
        FacebookWebhook, FacebookWebhookAdapter, LoggingLiveVideoHandler, DEFAULT_WEBHOOK_PATH,
    };
    use shimmer_config::StaticConfigProvider;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn adapter() -> FacebookWebhookAdapter {
        FacebookWebhookAdapter::new(FacebookWebhook::new(
            Arc::new(StaticConfigProvider::new(Some("tok"), Some("secret"))),
            Arc::new(LoggingLiveVideoHandler),
        ))
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (status, body) = get(build_router(&[]), "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }

    #[tokio::test]
    async fn mounts_webhook_route() {
        let adapter = adapter();
        let app = build_router(&[&adapter]);
        let uri = format!("{DEFAULT_WEBHOOK_PATH}?hub.mode=subscribe&hub.verify_token=tok&hub.challenge=42");
        let (status, body) = get(app, &uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "42");
    }

    #[tokio::test]
    async fn custom_webhook_path() {
        let adapter = adapter().with_path("/hooks/fb");
        let app = build_router(&[&adapter]);
        let (status, _) = get(app.clone(), "/hooks/fb?hub.mode=subscribe&hub.verify_token=tok").await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = get(app, DEFAULT_WEBHOOK_PATH).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
