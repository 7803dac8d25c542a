//! HTTP Server
//!
//! axum binding for the pipeline.
//!
//! # Endpoints
//!
//! - `POST /webhook` - GitHub webhook deliveries
//! - `GET /`, `GET /healthz` - static liveness acknowledgement

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::error::PipelineError;
use crate::pipeline::{Outcome, Pipeline};
use crate::signature::SIGNATURE_HEADER;

/// Header carrying GitHub's unique delivery id
const DELIVERY_HEADER: &str = "x-github-delivery";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<Pipeline>,
}

impl AppState {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

/// Builds the router with all endpoints.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/healthz", get(health_check))
        .route("/webhook", post(handle_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "pr-check-bot",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, PipelineError> {
    let delivery = headers
        .get(DELIVERY_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let signature = headers.get(SIGNATURE_HEADER).map(|value| value.as_bytes());

    match state.pipeline.handle_delivery(&body, signature).await {
        Ok(Outcome::CommentPosted(target)) => {
            info!(delivery = %delivery, pr = %target, "Delivery handled");
            Ok(Json(serde_json::json!({ "message": "Comment posted" })))
        }
        Ok(Outcome::Ignored { action }) => {
            info!(delivery = %delivery, action = %action, "Delivery ignored");
            Ok(Json(serde_json::json!({ "message": "Event ignored" })))
        }
        Err(err) if err.is_client_error() => {
            warn!(delivery = %delivery, error = %err, "Rejected webhook delivery");
            Err(err)
        }
        Err(err) => {
            error!(
                delivery = %delivery,
                error = %err,
                upstream_status = ?upstream_status(&err),
                "Failed to handle webhook delivery"
            );
            Err(err)
        }
    }
}

fn upstream_status(err: &PipelineError) -> Option<u16> {
    match err {
        PipelineError::CredentialExchangeFailed(failure)
        | PipelineError::CommentPostFailed(failure) => failure.status().map(|s| s.as_u16()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::auth::AssertionIssuer;
    use crate::comment::CommentDispatcher;
    use crate::github::GitHubClient;
    use crate::signature::{SignatureVerifier, WebhookSecret};
    use crate::token::TokenExchanger;

    const PRIVATE_KEY: &str = include_str!("../tests/fixtures/test-app-key.pem");

    // Points at a closed port; these tests never reach GitHub.
    fn test_router() -> Router {
        let api = GitHubClient::with_http(reqwest::Client::new(), "http://127.0.0.1:9");
        let pipeline = Pipeline::new(
            SignatureVerifier::new(WebhookSecret::new("secret")),
            AssertionIssuer::new("278", PRIVATE_KEY.as_bytes()).unwrap(),
            TokenExchanger::new(api.clone()),
            CommentDispatcher::new(api),
            "Validating your PR...",
        );
        build_router(AppState::new(pipeline))
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        for uri in ["/", "/healthz"] {
            let response = test_router()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::OK);
            let body = json_body(response).await;
            assert_eq!(body["status"], "ok");
            assert_eq!(body["service"], "pr-check-bot");
        }
    }

    #[tokio::test]
    async fn test_missing_signature_is_400() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/webhook")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["error"],
            "Missing X-Hub-Signature-256 header"
        );
    }

    #[tokio::test]
    async fn test_webhook_requires_post() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .uri("/webhook")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn test_upstream_status_only_for_upstream_errors() {
        use crate::error::UpstreamFailure;

        let err = PipelineError::CommentPostFailed(UpstreamFailure::Status(
            reqwest::StatusCode::FORBIDDEN,
        ));
        assert_eq!(upstream_status(&err), Some(403));
        assert_eq!(upstream_status(&PipelineError::InvalidSignature), None);
    }
}
