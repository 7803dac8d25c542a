//! Pull Request Events
//!
//! Strict schema for the `pull_request` webhook payload and the routing
//! decision made on its `action`.

use serde::Deserialize;

/// Inbound `pull_request` webhook payload
///
/// Only the fields the bot needs; all of them are required.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InboundEvent {
    pub action: String,
    pub pull_request: PullRequestPayload,
    pub installation: InstallationPayload,
    pub repository: RepositoryPayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PullRequestPayload {
    pub number: u64,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InstallationPayload {
    pub id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepositoryPayload {
    pub name: String,
    pub owner: OwnerPayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OwnerPayload {
    pub login: String,
}

/// Pull request lifecycle action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullRequestAction {
    Opened,
    Edited,
    Synchronize,
    Other(String),
}

impl PullRequestAction {
    pub fn parse(action: &str) -> Self {
        match action {
            "opened" => Self::Opened,
            "edited" => Self::Edited,
            "synchronize" => Self::Synchronize,
            other => Self::Other(other.to_string()),
        }
    }

    /// Actions that trigger a status comment
    pub fn is_actionable(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl std::fmt::Display for PullRequestAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PullRequestAction::Opened => write!(f, "opened"),
            PullRequestAction::Edited => write!(f, "edited"),
            PullRequestAction::Synchronize => write!(f, "synchronize"),
            PullRequestAction::Other(action) => write!(f, "{}", action),
        }
    }
}

/// Where a status comment should be posted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentTarget {
    pub owner: String,
    pub repo: String,
    pub number: u64,
    pub installation_id: u64,
}

impl std::fmt::Display for CommentTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

/// Routing decision for one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Actionable(CommentTarget),
    Ignored { action: String },
}

/// Decide whether `event` should get a status comment.
pub fn route(event: &InboundEvent) -> Route {
    if PullRequestAction::parse(&event.action).is_actionable() {
        Route::Actionable(CommentTarget {
            owner: event.repository.owner.login.clone(),
            repo: event.repository.name.clone(),
            number: event.pull_request.number,
            installation_id: event.installation.id,
        })
    } else {
        Route::Ignored {
            action: event.action.clone(),
        }
    }
}
