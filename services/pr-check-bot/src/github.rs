//! GitHub REST API Client
//!
//! Thin wrapper over `reqwest` carrying the API base URL and the headers
//! every GitHub call needs. Authentication is attached per request.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};

pub const USER_AGENT: &str = concat!("pr-check-bot/", env!("CARGO_PKG_VERSION"));
pub const GITHUB_ACCEPT: &str = "application/vnd.github+json";
pub const GITHUB_API_VERSION: &str = "2022-11-28";

/// Base URL of the public GitHub API; GitHub Enterprise uses `https://<host>/api/v3`
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Shared HTTP client bound to one GitHub API base URL
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    api_url: String,
}

impl GitHubClient {
    /// Build a client whose requests fail after `timeout`
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self::with_http(http, api_url))
    }

    pub fn with_http(http: Client, api_url: impl Into<String>) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self { http, api_url }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Start a POST to `path` (which must begin with `/`)
    pub(crate) fn post(&self, path: &str) -> RequestBuilder {
        self.http
            .post(format!("{}{}", self.api_url, path))
            .header("Accept", GITHUB_ACCEPT)
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = GitHubClient::with_http(Client::new(), "https://ghe.example.com/api/v3/");
        assert_eq!(client.api_url(), "https://ghe.example.com/api/v3");
    }

    #[test]
    fn test_post_builds_absolute_url() {
        let client = GitHubClient::with_http(Client::new(), DEFAULT_API_URL);
        let request = client.post("/app/installations/7/access_tokens").build().unwrap();

        assert_eq!(
            request.url().as_str(),
            "https://api.github.com/app/installations/7/access_tokens"
        );
        assert_eq!(request.headers()["accept"], GITHUB_ACCEPT);
        assert_eq!(request.headers()["x-github-api-version"], GITHUB_API_VERSION);
    }
}
