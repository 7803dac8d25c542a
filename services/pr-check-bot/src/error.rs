//! Pipeline Errors
//!
//! Error taxonomy for webhook handling and its mapping onto HTTP responses.
//! Messages never carry the webhook secret, the private key, the app JWT or
//! the installation token.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Why a call to the GitHub API did not succeed
#[derive(Debug, Error)]
pub enum UpstreamFailure {
    /// GitHub answered with a non-success status
    #[error("upstream returned {0}")]
    Status(reqwest::StatusCode),

    /// The request exceeded the configured client timeout
    #[error("upstream request timed out")]
    Timeout,

    /// Connection, TLS or protocol failure before a response arrived
    #[error("upstream transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// A success response whose body could not be decoded
    #[error("malformed upstream response: {0}")]
    MalformedResponse(#[source] reqwest::Error),
}

impl UpstreamFailure {
    /// Classify a transport-level `reqwest` error
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamFailure::Timeout
        } else {
            UpstreamFailure::Transport(err.without_url())
        }
    }

    /// Upstream HTTP status, when one was received
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            UpstreamFailure::Status(status) => Some(*status),
            _ => None,
        }
    }

    fn http_status(&self) -> StatusCode {
        match self {
            UpstreamFailure::Timeout => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::BAD_GATEWAY,
        }
    }
}

/// Errors surfaced by the webhook pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The `X-Hub-Signature-256` header was absent
    #[error("Missing X-Hub-Signature-256 header")]
    MissingSignature,

    /// The signature did not match the payload
    #[error("Invalid signature")]
    InvalidSignature,

    /// The body was not a pull request event with all required fields
    #[error("Malformed event payload: {0}")]
    MalformedEvent(#[from] serde_json::Error),

    /// The app private key could not be parsed or could not sign
    #[error("Signing key error: {0}")]
    SigningKey(#[source] jsonwebtoken::errors::Error),

    /// The JWT could not be exchanged for an installation token
    #[error("Credential exchange failed: {0}")]
    CredentialExchangeFailed(UpstreamFailure),

    /// The status comment could not be created
    #[error("Comment post failed: {0}")]
    CommentPostFailed(UpstreamFailure),
}

impl PipelineError {
    /// HTTP status reported to the webhook caller
    pub fn status_code(&self) -> StatusCode {
        match self {
            PipelineError::MissingSignature
            | PipelineError::InvalidSignature
            | PipelineError::MalformedEvent(_) => StatusCode::BAD_REQUEST,
            PipelineError::SigningKey(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PipelineError::CredentialExchangeFailed(failure)
            | PipelineError::CommentPostFailed(failure) => failure.http_status(),
        }
    }

    /// Whether the failure was caused by the webhook caller
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_map_to_400() {
        assert_eq!(
            PipelineError::MissingSignature.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            PipelineError::InvalidSignature.status_code(),
            StatusCode::BAD_REQUEST
        );

        let parse_err = serde_json::from_slice::<serde_json::Value>(b"{").unwrap_err();
        let err = PipelineError::from(parse_err);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.is_client_error());
    }

    #[test]
    fn test_upstream_errors_map_to_5xx() {
        let err = PipelineError::CredentialExchangeFailed(UpstreamFailure::Status(
            reqwest::StatusCode::UNAUTHORIZED,
        ));
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert!(!err.is_client_error());
        assert_eq!(
            err.to_string(),
            "Credential exchange failed: upstream returned 401 Unauthorized"
        );

        let err = PipelineError::CommentPostFailed(UpstreamFailure::Timeout);
        assert_eq!(err.status_code(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn test_upstream_status_accessor() {
        let failure = UpstreamFailure::Status(reqwest::StatusCode::NOT_FOUND);
        assert_eq!(failure.status(), Some(reqwest::StatusCode::NOT_FOUND));
        assert_eq!(UpstreamFailure::Timeout.status(), None);
    }
}
