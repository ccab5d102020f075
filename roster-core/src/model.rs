//! Domain types: users, teams and pull requests

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user who can author or review pull requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub username: String,
    pub team_name: String,
    pub is_active: bool,
}

/// A member as listed inside a team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub user_id: String,
    pub username: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl TeamMember {
    /// Create an active member
    pub fn new(user_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            is_active: true,
        }
    }

    /// Set the active flag
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// Attach this member to a team, producing a [`User`]
    pub fn to_user(&self, team_name: &str) -> User {
        User {
            user_id: self.user_id.clone(),
            username: self.username.clone(),
            team_name: team_name.to_string(),
            is_active: self.is_active,
        }
    }
}

impl From<User> for TeamMember {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            username: user.username,
            is_active: user.is_active,
        }
    }
}

/// A named team; members keep the order they were supplied or stored in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub team_name: String,
    pub members: Vec<TeamMember>,
}

impl Team {
    /// Create a team from its name and members
    pub fn new(team_name: impl Into<String>, members: Vec<TeamMember>) -> Self {
        Self {
            team_name: team_name.into(),
            members,
        }
    }

    /// Members as full [`User`] records
    pub fn users(&self) -> Vec<User> {
        self.members
            .iter()
            .map(|m| m.to_user(&self.team_name))
            .collect()
    }
}

/// Pull request lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PrStatus {
    Open,
    Merged,
}

impl PrStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrStatus::Open => "OPEN",
            PrStatus::Merged => "MERGED",
        }
    }

    /// Parse the stored representation
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "OPEN" => Some(PrStatus::Open),
            "MERGED" => Some(PrStatus::Merged),
            _ => None,
        }
    }

    /// Only OPEN -> MERGED changes status; MERGED is terminal
    pub fn can_transition_to(&self, next: PrStatus) -> bool {
        matches!((self, next), (PrStatus::Open, PrStatus::Merged))
    }
}

impl std::fmt::Display for PrStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pull request and its assigned reviewers
///
/// The author is never in `assigned_reviewers` and the list holds no
/// duplicates. Once merged, the reviewer list no longer changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: PrStatus,
    pub assigned_reviewers: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged_at: Option<DateTime<Utc>>,
}

impl PullRequest {
    /// Create an open pull request with the given reviewers
    pub fn open(
        pull_request_id: impl Into<String>,
        pull_request_name: impl Into<String>,
        author_id: impl Into<String>,
        assigned_reviewers: Vec<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            pull_request_id: pull_request_id.into(),
            pull_request_name: pull_request_name.into(),
            author_id: author_id.into(),
            status: PrStatus::Open,
            assigned_reviewers,
            created_at,
            merged_at: None,
        }
    }

    pub fn is_merged(&self) -> bool {
        self.status == PrStatus::Merged
    }

    pub fn has_reviewer(&self, user_id: &str) -> bool {
        self.assigned_reviewers.iter().any(|r| r == user_id)
    }

    /// Mark as merged at `at`
    ///
    /// Returns `false` without touching anything if already merged, so
    /// `merged_at` is only ever set once.
    pub fn merge(&mut self, at: DateTime<Utc>) -> bool {
        if !self.status.can_transition_to(PrStatus::Merged) {
            return false;
        }
        self.status = PrStatus::Merged;
        self.merged_at = Some(at);
        true
    }

    /// Swap `old` for `new` in the same slot
    ///
    /// Returns `false` if the PR is merged, `old` is not assigned, or `new`
    /// would break the author/duplicate invariants.
    pub fn replace_reviewer(&mut self, old: &str, new: &str) -> bool {
        if self.is_merged() || new == self.author_id || self.has_reviewer(new) {
            return false;
        }
        match self.assigned_reviewers.iter_mut().find(|r| r.as_str() == old) {
            Some(slot) => {
                *slot = new.to_string();
                true
            }
            None => false,
        }
    }
}
