//! Storage contract used by the review service
//!
//! Any backend (in-memory, SQLite, ...) that implements [`ReviewStore`] can
//! back a [`crate::ReviewService`]. Multi-row writes (team with members, pull
//! request with reviewers, pull request update with reviewer replacement)
//! must be all-or-nothing.

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{PullRequest, Team, User};

/// Result type for storage calls
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors reported by a storage backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("{entity} {id} already exists")]
    AlreadyExists { entity: &'static str, id: String },

    /// Anything else the backend could not do
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn already_exists(entity: &'static str, id: impl Into<String>) -> Self {
        StoreError::AlreadyExists {
            entity,
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Persistence operations the review service relies on
#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn find_user_by_id(&self, user_id: &str) -> StoreResult<User>;

    /// Users of a team in the store's natural order
    async fn find_users_by_team(&self, team_name: &str) -> StoreResult<Vec<User>>;

    async fn set_user_active(&self, user_id: &str, is_active: bool) -> StoreResult<()>;

    async fn team_exists(&self, team_name: &str) -> StoreResult<bool>;

    /// Insert a team together with all of its members
    async fn create_team(&self, team: &Team) -> StoreResult<()>;

    async fn find_team_by_name(&self, team_name: &str) -> StoreResult<Team>;

    /// Insert a pull request together with its reviewer assignments
    async fn create_pr(&self, pr: &PullRequest) -> StoreResult<()>;

    async fn find_pr_by_id(&self, pr_id: &str) -> StoreResult<PullRequest>;

    /// Update status fields and replace the whole reviewer list
    async fn update_pr(&self, pr: &PullRequest) -> StoreResult<()>;

    async fn find_prs_by_reviewer(&self, user_id: &str) -> StoreResult<Vec<PullRequest>>;
}

#[async_trait]
impl<S: ReviewStore + ?Sized> ReviewStore for std::sync::Arc<S> {
    async fn find_user_by_id(&self, user_id: &str) -> StoreResult<User> {
        (**self).find_user_by_id(user_id).await
    }

    async fn find_users_by_team(&self, team_name: &str) -> StoreResult<Vec<User>> {
        (**self).find_users_by_team(team_name).await
    }

    async fn set_user_active(&self, user_id: &str, is_active: bool) -> StoreResult<()> {
        (**self).set_user_active(user_id, is_active).await
    }

    async fn team_exists(&self, team_name: &str) -> StoreResult<bool> {
        (**self).team_exists(team_name).await
    }

    async fn create_team(&self, team: &Team) -> StoreResult<()> {
        (**self).create_team(team).await
    }

    async fn find_team_by_name(&self, team_name: &str) -> StoreResult<Team> {
        (**self).find_team_by_name(team_name).await
    }

    async fn create_pr(&self, pr: &PullRequest) -> StoreResult<()> {
        (**self).create_pr(pr).await
    }

    async fn find_pr_by_id(&self, pr_id: &str) -> StoreResult<PullRequest> {
        (**self).find_pr_by_id(pr_id).await
    }

    async fn update_pr(&self, pr: &PullRequest) -> StoreResult<()> {
        (**self).update_pr(pr).await
    }

    async fn find_prs_by_reviewer(&self, user_id: &str) -> StoreResult<Vec<PullRequest>> {
        (**self).find_prs_by_reviewer(user_id).await
    }
}
