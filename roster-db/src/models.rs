//! Row types read from the database

use chrono::{DateTime, Utc};
use roster_core::{PrStatus, PullRequest, TeamMember, User};

use crate::error::{DbError, Result};

/// Row of the `users` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub user_id: String,
    pub username: String,
    pub team_name: String,
    pub is_active: bool,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            user_id: row.user_id,
            username: row.username,
            team_name: row.team_name,
            is_active: row.is_active,
        }
    }
}

impl From<UserRow> for TeamMember {
    fn from(row: UserRow) -> Self {
        TeamMember {
            user_id: row.user_id,
            username: row.username,
            is_active: row.is_active,
        }
    }
}

/// Row of the `pull_requests` table, without reviewers
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PullRequestRow {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
}

impl PullRequestRow {
    /// Combine with reviewer ids (in slot order) into a domain value
    pub fn into_pull_request(self, assigned_reviewers: Vec<String>) -> Result<PullRequest> {
        let status = PrStatus::parse(&self.status).ok_or_else(|| {
            DbError::InvalidData(format!(
                "pull request {} has unknown status '{}'",
                self.pull_request_id, self.status
            ))
        })?;

        Ok(PullRequest {
            pull_request_id: self.pull_request_id,
            pull_request_name: self.pull_request_name,
            author_id: self.author_id,
            status,
            assigned_reviewers,
            created_at: self.created_at,
            merged_at: self.merged_at,
        })
    }
}
