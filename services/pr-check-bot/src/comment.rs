//! Pull Request Comments
//!
//! Posts the status comment through the issues API, authenticated with a
//! single-use installation token.

use serde::Serialize;
use tracing::info;

use crate::error::{PipelineError, UpstreamFailure};
use crate::event::CommentTarget;
use crate::github::GitHubClient;
use crate::token::InstallationToken;

#[derive(Debug, Serialize)]
struct CommentRequest<'a> {
    body: &'a str,
}

/// Performs the one authenticated write of a delivery
#[derive(Debug, Clone)]
pub struct CommentDispatcher {
    api: GitHubClient,
}

impl CommentDispatcher {
    pub fn new(api: GitHubClient) -> Self {
        Self { api }
    }

    /// Post `body` as a comment on the pull request.
    ///
    /// Takes the token by value; it is dropped when this returns, whatever
    /// the outcome.
    pub async fn post_comment(
        &self,
        token: InstallationToken,
        target: &CommentTarget,
        body: &str,
    ) -> Result<(), PipelineError> {
        let path = format!(
            "/repos/{}/{}/issues/{}/comments",
            target.owner, target.repo, target.number
        );

        let response = self
            .api
            .post(&path)
            .bearer_auth(token.secret())
            .json(&CommentRequest { body })
            .send()
            .await;
        drop(token);

        let response = response
            .map_err(|e| PipelineError::CommentPostFailed(UpstreamFailure::from_transport(e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::CommentPostFailed(UpstreamFailure::Status(
                status,
            )));
        }

        info!(pr = %target, "Posted PR comment");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_request_shape() {
        let request = CommentRequest {
            body: "Validating your PR...",
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({ "body": "Validating your PR..." })
        );
    }
}
