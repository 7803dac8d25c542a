//! PR Check Bot Library
//!
//! GitHub App webhook receiver: authenticates `pull_request` deliveries and
//! posts a status comment on newly opened, edited or updated pull requests.
//!
//! ## Pipeline
//!
//! 1. [`signature`]: verify `X-Hub-Signature-256` over the raw body
//! 2. [`event`]: parse the payload and decide whether it is actionable
//! 3. [`auth`]: mint a ten-minute RS256 JWT as the GitHub App
//! 4. [`token`]: exchange the JWT for an installation access token
//! 5. [`comment`]: post the comment with that token, once
//!
//! [`pipeline::Pipeline`] composes the steps without any HTTP framework;
//! [`server`] binds it to axum.
//!
//! ## Example
//!
//! ```bash
//! GITHUB_APP_ID=278 \
//! GITHUB_WEBHOOK_SECRET=... \
//! GITHUB_PRIVATE_KEY_PATH=./app.private-key.pem \
//! GITHUB_API_URL=https://git.example.com/api/v3 \
//! pr-check-bot
//! ```

pub mod auth;
pub mod comment;
pub mod config;
pub mod error;
pub mod event;
pub mod github;
pub mod pipeline;
pub mod server;
pub mod signature;
pub mod token;

pub use config::{AppConfig, Args};
pub use error::{PipelineError, UpstreamFailure};
pub use pipeline::{Outcome, Pipeline};
pub use server::{build_router, AppState};
