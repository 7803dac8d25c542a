//! Delivery Pipeline
//!
//! Verify → parse → route → issue JWT → exchange → comment, independent of
//! the HTTP framework. Each step must finish before the next starts; nothing
//! is carried between deliveries.

use tracing::{debug, info};

use crate::auth::AssertionIssuer;
use crate::comment::CommentDispatcher;
use crate::config::AppConfig;
use crate::error::PipelineError;
use crate::event::{route, CommentTarget, InboundEvent, Route};
use crate::github::GitHubClient;
use crate::signature::SignatureVerifier;
use crate::token::TokenExchanger;

/// Result of a successfully handled delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    CommentPosted(CommentTarget),
    Ignored { action: String },
}

/// Immutable components shared by every delivery
#[derive(Debug)]
pub struct Pipeline {
    verifier: SignatureVerifier,
    issuer: AssertionIssuer,
    exchanger: TokenExchanger,
    dispatcher: CommentDispatcher,
    comment: String,
}

impl Pipeline {
    pub fn new(
        verifier: SignatureVerifier,
        issuer: AssertionIssuer,
        exchanger: TokenExchanger,
        dispatcher: CommentDispatcher,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            verifier,
            issuer,
            exchanger,
            dispatcher,
            comment: comment.into(),
        }
    }

    /// Build every component from one configuration value
    ///
    /// Fails if the private key is not a valid RSA PEM or the HTTP client
    /// cannot be created.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let api = GitHubClient::new(&config.api_url, config.request_timeout)?;
        let issuer = AssertionIssuer::new(&config.app_id, &config.private_key_pem)?;

        Ok(Self::new(
            SignatureVerifier::new(config.webhook_secret.clone()),
            issuer,
            TokenExchanger::new(api.clone()),
            CommentDispatcher::new(api),
            &config.comment,
        ))
    }

    /// Handle one webhook delivery from its raw body and signature header.
    pub async fn handle_delivery(
        &self,
        body: &[u8],
        signature: Option<&[u8]>,
    ) -> Result<Outcome, PipelineError> {
        self.verifier.verify(body, signature)?;

        let event: InboundEvent = serde_json::from_slice(body)?;

        match route(&event) {
            Route::Actionable(target) => {
                info!(
                    action = %event.action,
                    pr = %target,
                    installation_id = target.installation_id,
                    "Actionable pull request event"
                );
                self.post_status(&target).await?;
                Ok(Outcome::CommentPosted(target))
            }
            Route::Ignored { action } => {
                debug!(action = %action, pr_url = %event.pull_request.url, "Ignoring pull request event");
                Ok(Outcome::Ignored { action })
            }
        }
    }

    /// Authenticate as the installation and post the status comment.
    pub async fn post_status(&self, target: &CommentTarget) -> Result<(), PipelineError> {
        let assertion = self.issuer.issue()?;
        let token = self
            .exchanger
            .exchange(&assertion, target.installation_id)
            .await?;
        drop(assertion);

        self.dispatcher
            .post_comment(token, target, &self.comment)
            .await
    }
}
