//! In-memory implementation of [`ReviewStore`]
//!
//! All state lives behind one `RwLock`; every write takes the lock once, so
//! multi-row writes are atomic. State is lost when the store is dropped.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::model::{PullRequest, Team, TeamMember, User};
use crate::store::{ReviewStore, StoreError, StoreResult};

#[derive(Default)]
struct State {
    users: HashMap<String, User>,
    /// Team name -> member ids in insertion order
    teams: HashMap<String, Vec<String>>,
    prs: HashMap<String, PullRequest>,
    /// PR ids in creation order
    pr_order: Vec<String>,
}

/// In-memory review store
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReviewStore for MemoryStore {
    async fn find_user_by_id(&self, user_id: &str) -> StoreResult<User> {
        self.state
            .read()
            .await
            .users
            .get(user_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("user", user_id))
    }

    async fn find_users_by_team(&self, team_name: &str) -> StoreResult<Vec<User>> {
        let state = self.state.read().await;
        let Some(ids) = state.teams.get(team_name) else {
            return Ok(Vec::new());
        };
        Ok(ids
            .iter()
            .filter_map(|id| state.users.get(id))
            .filter(|u| u.team_name == team_name)
            .cloned()
            .collect())
    }

    async fn set_user_active(&self, user_id: &str, is_active: bool) -> StoreResult<()> {
        let mut state = self.state.write().await;
        let user = state
            .users
            .get_mut(user_id)
            .ok_or_else(|| StoreError::not_found("user", user_id))?;
        user.is_active = is_active;
        Ok(())
    }

    async fn team_exists(&self, team_name: &str) -> StoreResult<bool> {
        Ok(self.state.read().await.teams.contains_key(team_name))
    }

    async fn create_team(&self, team: &Team) -> StoreResult<()> {
        let mut state = self.state.write().await;
        if state.teams.contains_key(&team.team_name) {
            return Err(StoreError::already_exists("team", &team.team_name));
        }
        if let Some(member) = team
            .members
            .iter()
            .find(|m| state.users.contains_key(&m.user_id))
        {
            return Err(StoreError::already_exists("user", &member.user_id));
        }

        for user in team.users() {
            state.users.insert(user.user_id.clone(), user);
        }
        state.teams.insert(
            team.team_name.clone(),
            team.members.iter().map(|m| m.user_id.clone()).collect(),
        );
        Ok(())
    }

    async fn find_team_by_name(&self, team_name: &str) -> StoreResult<Team> {
        let state = self.state.read().await;
        let ids = state
            .teams
            .get(team_name)
            .ok_or_else(|| StoreError::not_found("team", team_name))?;
        let members = ids
            .iter()
            .filter_map(|id| state.users.get(id))
            .cloned()
            .map(TeamMember::from)
            .collect();
        Ok(Team::new(team_name, members))
    }

    async fn create_pr(&self, pr: &PullRequest) -> StoreResult<()> {
        let mut state = self.state.write().await;
        if state.prs.contains_key(&pr.pull_request_id) {
            return Err(StoreError::already_exists(
                "pull request",
                &pr.pull_request_id,
            ));
        }
        if !state.users.contains_key(&pr.author_id) {
            return Err(StoreError::not_found("user", &pr.author_id));
        }
        state.pr_order.push(pr.pull_request_id.clone());
        state.prs.insert(pr.pull_request_id.clone(), pr.clone());
        Ok(())
    }

    async fn find_pr_by_id(&self, pr_id: &str) -> StoreResult<PullRequest> {
        self.state
            .read()
            .await
            .prs
            .get(pr_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("pull request", pr_id))
    }

    async fn update_pr(&self, pr: &PullRequest) -> StoreResult<()> {
        let mut state = self.state.write().await;
        let stored = state
            .prs
            .get_mut(&pr.pull_request_id)
            .ok_or_else(|| StoreError::not_found("pull request", &pr.pull_request_id))?;
        stored.pull_request_name = pr.pull_request_name.clone();
        stored.status = pr.status;
        stored.merged_at = pr.merged_at;
        stored.assigned_reviewers = pr.assigned_reviewers.clone();
        Ok(())
    }

    async fn find_prs_by_reviewer(&self, user_id: &str) -> StoreResult<Vec<PullRequest>> {
        let state = self.state.read().await;
        Ok(state
            .pr_order
            .iter()
            .filter_map(|id| state.prs.get(id))
            .filter(|pr| pr.has_reviewer(user_id))
            .cloned()
            .collect())
    }
}
