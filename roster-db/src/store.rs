//! SQLite-backed review store
//!
//! Team creation, pull request creation and pull request updates each run in
//! a single transaction; any failure rolls the whole write back.

use async_trait::async_trait;
use roster_core::{PullRequest, ReviewStore, StoreResult, Team, User};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{classify_insert, DbError, Result};
use crate::models::{PullRequestRow, UserRow};

/// Review store persisting teams, users and pull requests in SQLite
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Create a store on an already migrated pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a user by id
    pub async fn get_user(&self, user_id: &str) -> Result<User> {
        sqlx::query_as::<_, UserRow>(
            "SELECT user_id, username, team_name, is_active FROM users WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .map(User::from)
        .ok_or_else(|| DbError::NotFound {
            entity: "user",
            id: user_id.to_string(),
        })
    }

    /// List the users of a team ordered by id
    pub async fn list_team_users(&self, team_name: &str) -> Result<Vec<UserRow>> {
        sqlx::query_as::<_, UserRow>(
            "SELECT user_id, username, team_name, is_active FROM users
             WHERE team_name = ?
             ORDER BY user_id",
        )
        .bind(team_name)
        .fetch_all(&self.pool)
        .await
        .map_err(Into::into)
    }

    /// Set the active flag of a user
    pub async fn update_user_active(&self, user_id: &str, is_active: bool) -> Result<()> {
        let result = sqlx::query("UPDATE users SET is_active = ? WHERE user_id = ?")
            .bind(is_active)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound {
                entity: "user",
                id: user_id.to_string(),
            });
        }
        Ok(())
    }

    /// Check whether a team exists
    pub async fn has_team(&self, team_name: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM teams WHERE team_name = ?)")
                .bind(team_name)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Insert a team and its members in one transaction
    pub async fn insert_team(&self, team: &Team) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO teams (team_name) VALUES (?)")
            .bind(&team.team_name)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                classify_insert(e, "team", &team.team_name, ("team", &team.team_name))
            })?;

        for member in &team.members {
            sqlx::query(
                "INSERT INTO users (user_id, username, team_name, is_active) VALUES (?, ?, ?, ?)",
            )
            .bind(&member.user_id)
            .bind(&member.username)
            .bind(&team.team_name)
            .bind(member.is_active)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                debug!(
                    team_name = %team.team_name,
                    user_id = %member.user_id,
                    error = %e,
                    "Failed to insert team member"
                );
                classify_insert(e, "user", &member.user_id, ("team", &team.team_name))
            })?;
        }

        tx.commit().await?;
        debug!(team_name = %team.team_name, members = team.members.len(), "Team stored");
        Ok(())
    }

    /// Get a team with members ordered by id
    pub async fn get_team(&self, team_name: &str) -> Result<Team> {
        if !self.has_team(team_name).await? {
            return Err(DbError::NotFound {
                entity: "team",
                id: team_name.to_string(),
            });
        }

        let members = self
            .list_team_users(team_name)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();
        Ok(Team::new(team_name, members))
    }

    /// Insert a pull request and its reviewers in one transaction
    pub async fn insert_pr(&self, pr: &PullRequest) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO pull_requests (
                pull_request_id, pull_request_name, author_id, status, created_at, merged_at
            ) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&pr.pull_request_id)
        .bind(&pr.pull_request_name)
        .bind(&pr.author_id)
        .bind(pr.status.as_str())
        .bind(pr.created_at)
        .bind(pr.merged_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            classify_insert(e, "pull request", &pr.pull_request_id, ("user", &pr.author_id))
        })?;

        for (slot, reviewer_id) in pr.assigned_reviewers.iter().enumerate() {
            sqlx::query(
                "INSERT INTO pull_request_reviewers (pull_request_id, reviewer_id, slot)
                 VALUES (?, ?, ?)",
            )
            .bind(&pr.pull_request_id)
            .bind(reviewer_id)
            .bind(slot as i64)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                debug!(
                    pr_id = %pr.pull_request_id,
                    reviewer_id = %reviewer_id,
                    error = %e,
                    "Failed to add reviewer"
                );
                classify_insert(e, "reviewer", reviewer_id, ("user", reviewer_id))
            })?;
        }

        tx.commit().await?;
        debug!(
            pr_id = %pr.pull_request_id,
            reviewers = pr.assigned_reviewers.len(),
            "Pull request stored"
        );
        Ok(())
    }

    /// Get a pull request with its reviewers
    pub async fn get_pr(&self, pr_id: &str) -> Result<PullRequest> {
        let row = sqlx::query_as::<_, PullRequestRow>(
            "SELECT pull_request_id, pull_request_name, author_id, status, created_at, merged_at
             FROM pull_requests
             WHERE pull_request_id = ?",
        )
        .bind(pr_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound {
            entity: "pull request",
            id: pr_id.to_string(),
        })?;

        let reviewers = self.list_reviewers(pr_id).await?;
        row.into_pull_request(reviewers)
    }

    /// Update a pull request and replace its reviewers in one transaction
    pub async fn replace_pr(&self, pr: &PullRequest) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE pull_requests
             SET pull_request_name = ?, status = ?, merged_at = ?
             WHERE pull_request_id = ?",
        )
        .bind(&pr.pull_request_name)
        .bind(pr.status.as_str())
        .bind(pr.merged_at)
        .bind(&pr.pull_request_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound {
                entity: "pull request",
                id: pr.pull_request_id.clone(),
            });
        }

        sqlx::query("DELETE FROM pull_request_reviewers WHERE pull_request_id = ?")
            .bind(&pr.pull_request_id)
            .execute(&mut *tx)
            .await?;

        for (slot, reviewer_id) in pr.assigned_reviewers.iter().enumerate() {
            sqlx::query(
                "INSERT INTO pull_request_reviewers (pull_request_id, reviewer_id, slot)
                 VALUES (?, ?, ?)",
            )
            .bind(&pr.pull_request_id)
            .bind(reviewer_id)
            .bind(slot as i64)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                debug!(
                    pr_id = %pr.pull_request_id,
                    reviewer_id = %reviewer_id,
                    error = %e,
                    "Failed to replace reviewer"
                );
                classify_insert(e, "reviewer", reviewer_id, ("user", reviewer_id))
            })?;
        }

        tx.commit().await?;
        debug!(
            pr_id = %pr.pull_request_id,
            status = %pr.status,
            reviewers = pr.assigned_reviewers.len(),
            "Pull request updated"
        );
        Ok(())
    }

    /// Pull requests a user reviews, most recent first
    pub async fn list_prs_for_reviewer(&self, user_id: &str) -> Result<Vec<PullRequest>> {
        let rows = sqlx::query_as::<_, PullRequestRow>(
            "SELECT p.pull_request_id, p.pull_request_name, p.author_id, p.status,
                    p.created_at, p.merged_at
             FROM pull_requests p
             INNER JOIN pull_request_reviewers r ON r.pull_request_id = p.pull_request_id
             WHERE r.reviewer_id = ?
             ORDER BY p.created_at DESC, p.pull_request_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut prs = Vec::with_capacity(rows.len());
        for row in rows {
            let reviewers = self.list_reviewers(&row.pull_request_id).await?;
            prs.push(row.into_pull_request(reviewers)?);
        }
        Ok(prs)
    }

    async fn list_reviewers(&self, pr_id: &str) -> Result<Vec<String>> {
        sqlx::query_scalar(
            "SELECT reviewer_id FROM pull_request_reviewers
             WHERE pull_request_id = ?
             ORDER BY slot",
        )
        .bind(pr_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Into::into)
    }
}

#[async_trait]
impl ReviewStore for SqliteStore {
    async fn find_user_by_id(&self, user_id: &str) -> StoreResult<User> {
        Ok(self.get_user(user_id).await?)
    }

    async fn find_users_by_team(&self, team_name: &str) -> StoreResult<Vec<User>> {
        let rows = self.list_team_users(team_name).await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn set_user_active(&self, user_id: &str, is_active: bool) -> StoreResult<()> {
        Ok(self.update_user_active(user_id, is_active).await?)
    }

    async fn team_exists(&self, team_name: &str) -> StoreResult<bool> {
        Ok(self.has_team(team_name).await?)
    }

    async fn create_team(&self, team: &Team) -> StoreResult<()> {
        Ok(self.insert_team(team).await?)
    }

    async fn find_team_by_name(&self, team_name: &str) -> StoreResult<Team> {
        Ok(self.get_team(team_name).await?)
    }

    async fn create_pr(&self, pr: &PullRequest) -> StoreResult<()> {
        Ok(self.insert_pr(pr).await?)
    }

    async fn find_pr_by_id(&self, pr_id: &str) -> StoreResult<PullRequest> {
        Ok(self.get_pr(pr_id).await?)
    }

    async fn update_pr(&self, pr: &PullRequest) -> StoreResult<()> {
        Ok(self.replace_pr(pr).await?)
    }

    async fn find_prs_by_reviewer(&self, user_id: &str) -> StoreResult<Vec<PullRequest>> {
        Ok(self.list_prs_for_reviewer(user_id).await?)
    }
}
