//! Installation Token Exchange
//!
//! Trades an app JWT for a short-lived installation access token using
//! `POST /app/installations/{id}/access_tokens`. Tokens are never cached.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::auth::Assertion;
use crate::error::{PipelineError, UpstreamFailure};
use crate::github::GitHubClient;

/// Response from GitHub installation token endpoint
///
/// Not `Clone`; moved into the single call that uses it.
#[derive(Deserialize)]
pub struct InstallationToken {
    token: String,
    #[serde(default)]
    expires_at: Option<DateTime<Utc>>,
}

impl InstallationToken {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Token value, for the `Authorization` header only
    pub(crate) fn secret(&self) -> &str {
        &self.token
    }
}

impl std::fmt::Debug for InstallationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstallationToken")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Exchanges app JWTs for installation tokens
#[derive(Debug, Clone)]
pub struct TokenExchanger {
    api: GitHubClient,
}

impl TokenExchanger {
    pub fn new(api: GitHubClient) -> Self {
        Self { api }
    }

    /// Exchange `assertion` for a token scoped to `installation_id`.
    ///
    /// Every call goes to GitHub; presenting the same assertion twice yields
    /// two independent tokens.
    pub async fn exchange(
        &self,
        assertion: &Assertion,
        installation_id: u64,
    ) -> Result<InstallationToken, PipelineError> {
        let path = format!("/app/installations/{}/access_tokens", installation_id);

        let response = self
            .api
            .post(&path)
            .bearer_auth(assertion.bearer())
            .send()
            .await
            .map_err(|e| PipelineError::CredentialExchangeFailed(UpstreamFailure::from_transport(e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::CredentialExchangeFailed(
                UpstreamFailure::Status(status),
            ));
        }

        let token = response.json::<InstallationToken>().await.map_err(|e| {
            PipelineError::CredentialExchangeFailed(if e.is_timeout() {
                UpstreamFailure::Timeout
            } else {
                UpstreamFailure::MalformedResponse(e.without_url())
            })
        })?;

        debug!(
            installation_id,
            expires_at = ?token.expires_at,
            "Obtained installation token"
        );
        Ok(token)
    }
}
