//! Review assignment service
//!
//! Each operation validates its input, reads current state from the store,
//! decides, and writes back. Nothing here retries or locks; atomicity of the
//! individual writes is the store's job. Two concurrent reassignments on the
//! same pull request can race and one update may be lost.

use std::collections::HashSet;
use std::time::Instant;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::RngCore;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::{AssignmentConfig, DEFAULT_REVIEWERS_PER_PR, REPLACEMENTS_PER_REASSIGN};
use crate::model::{PullRequest, Team, User};
use crate::selection::{select_candidates, ReviewerPicker};
use crate::store::{ReviewStore, StoreError};
use crate::validation::{require_id, validate_pr_input, validate_team};
use crate::{Error, Result};

/// Outcome of a successful reviewer reassignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reassignment {
    pub pr: PullRequest,
    pub replaced_by: String,
}

/// Assigns and reassigns pull request reviewers on top of a [`ReviewStore`]
pub struct ReviewService<S, R = StdRng> {
    store: S,
    picker: ReviewerPicker<R>,
    reviewers_per_pr: usize,
}

impl<S: ReviewStore> ReviewService<S, StdRng> {
    /// Service with a time-seeded picker and default reviewer count
    pub fn new(store: S) -> Self {
        Self::with_picker(store, ReviewerPicker::from_time())
    }

    /// Service whose reviewer picks are reproducible for `seed`
    pub fn with_seed(store: S, seed: u64) -> Self {
        Self::with_picker(store, ReviewerPicker::seeded(seed))
    }

    /// Service built from the assignment section of the config
    pub fn from_config(store: S, config: &AssignmentConfig) -> Self {
        Self::with_picker(store, ReviewerPicker::from_seed_option(config.seed))
            .with_reviewers_per_pr(config.reviewers_per_pr)
    }
}

impl<S: ReviewStore, R: RngCore + Send> ReviewService<S, R> {
    /// Service drawing reviewers with the given picker
    pub fn with_picker(store: S, picker: ReviewerPicker<R>) -> Self {
        Self {
            store,
            picker,
            reviewers_per_pr: DEFAULT_REVIEWERS_PER_PR,
        }
    }

    /// Override how many reviewers a new pull request gets
    pub fn with_reviewers_per_pr(mut self, count: usize) -> Self {
        self.reviewers_per_pr = count;
        self
    }

    /// Get the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create a team and all of its members
    pub async fn create_team(&self, team: &Team) -> Result<Team> {
        let start = Instant::now();
        debug!(
            team_name = %team.team_name,
            members = team.members.len(),
            "Creating team"
        );

        if let Err(e) = validate_team(team) {
            warn!(team_name = %team.team_name, error = %e, "Team data validation failed");
            return Err(e);
        }

        let exists = self
            .store
            .team_exists(&team.team_name)
            .await
            .map_err(|e| Error::storage("check team exists", e))?;
        if exists {
            warn!(team_name = %team.team_name, "Team already exists");
            return Err(Error::TeamAlreadyExists {
                team_name: team.team_name.clone(),
            });
        }

        for member in &team.members {
            match self.store.find_user_by_id(&member.user_id).await {
                Ok(existing) => {
                    warn!(
                        team_name = %team.team_name,
                        user_id = %member.user_id,
                        existing_team = %existing.team_name,
                        "Team member already belongs to a team"
                    );
                    return Err(Error::UserAlreadyExists(member.user_id.clone()));
                }
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(Error::storage("check team member", e)),
            }
        }

        if let Err(e) = self.store.create_team(team).await {
            error!(team_name = %team.team_name, error = %e, "Failed to create team in store");
            return Err(match e {
                StoreError::AlreadyExists { entity: "user", id } => Error::UserAlreadyExists(id),
                StoreError::AlreadyExists { .. } => Error::TeamAlreadyExists {
                    team_name: team.team_name.clone(),
                },
                e => Error::storage("create team", e),
            });
        }

        info!(
            team_name = %team.team_name,
            members = team.members.len(),
            duration_ms = elapsed_ms(start),
            "Team created"
        );
        Ok(team.clone())
    }

    /// Get a team with its members in stored order
    pub async fn get_team(&self, team_name: &str) -> Result<Team> {
        debug!(team_name, "Getting team");
        require_id(team_name, Error::EmptyTeamName)?;

        match self.store.find_team_by_name(team_name).await {
            Ok(team) => {
                debug!(team_name, members = team.members.len(), "Team retrieved");
                Ok(team)
            }
            Err(e) if e.is_not_found() => Err(Error::NoTeam {
                team_name: team_name.to_string(),
            }),
            Err(e) => Err(Error::storage("find team", e)),
        }
    }

    /// Set a user's active flag
    ///
    /// If the flag already has the requested value the user is returned as
    /// is and the store is not written to.
    pub async fn set_user_active(&self, user_id: &str, is_active: bool) -> Result<User> {
        let start = Instant::now();
        debug!(user_id, is_active, "Setting user active status");
        require_id(user_id, Error::EmptyUserId)?;

        let mut user = self.find_user(user_id, "find user").await?;
        if user.is_active == is_active {
            debug!(user_id, is_active, "User already has requested status");
            return Ok(user);
        }

        self.store
            .set_user_active(user_id, is_active)
            .await
            .map_err(|e| lookup_error(e, user_id, "set user active"))?;
        user.is_active = is_active;

        info!(
            user_id,
            is_active,
            team_name = %user.team_name,
            duration_ms = elapsed_ms(start),
            "User active status updated"
        );
        Ok(user)
    }

    /// Pull requests the user is currently assigned to review
    pub async fn get_user_reviews(&self, user_id: &str) -> Result<Vec<PullRequest>> {
        debug!(user_id, "Getting user reviews");
        require_id(user_id, Error::EmptyUserId)?;

        self.find_user(user_id, "find user").await?;
        let prs = self
            .store
            .find_prs_by_reviewer(user_id)
            .await
            .map_err(|e| Error::storage("find reviews", e))?;

        debug!(user_id, reviews = prs.len(), "User reviews retrieved");
        Ok(prs)
    }

    /// Open a pull request and assign reviewers from the author's team
    pub async fn create_pr(&self, pr_id: &str, name: &str, author_id: &str) -> Result<PullRequest> {
        let start = Instant::now();
        if let Err(e) = validate_pr_input(pr_id, name, author_id) {
            warn!(pr_id, author_id, error = %e, "PR data validation failed");
            return Err(e);
        }
        debug!(pr_id, name, author_id, "Creating pull request");

        let author = self.find_user(author_id, "author not found").await?;

        match self.store.find_pr_by_id(pr_id).await {
            Ok(_) => {
                warn!(pr_id, "Pull request already exists");
                return Err(Error::PrAlreadyExists {
                    pr_id: pr_id.to_string(),
                });
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(Error::storage("check pull request exists", e)),
        }

        let members = self
            .store
            .find_users_by_team(&author.team_name)
            .await
            .map_err(|e| Error::storage("find review candidates", e))?;
        let reviewers = {
            let exclude = HashSet::from([author.user_id.as_str()]);
            let candidates = select_candidates(&members, &exclude);
            let picked = self.picker.pick(&candidates, self.reviewers_per_pr);
            debug!(
                pr_id,
                candidates = candidates.len(),
                reviewers = ?picked,
                "Reviewers selected"
            );
            picked
        };

        let pr = PullRequest::open(pr_id, name, author_id, reviewers, Utc::now());
        if let Err(e) = self.store.create_pr(&pr).await {
            error!(pr_id, error = %e, "Failed to create pull request in store");
            return Err(match e {
                StoreError::AlreadyExists { .. } => Error::PrAlreadyExists {
                    pr_id: pr_id.to_string(),
                },
                e => Error::storage("create pull request", e),
            });
        }

        info!(
            pr_id,
            author_id,
            team_name = %author.team_name,
            reviewers = pr.assigned_reviewers.len(),
            duration_ms = elapsed_ms(start),
            "Pull request created"
        );
        Ok(pr)
    }

    /// Merge a pull request; merging twice returns the stored PR unchanged
    pub async fn merge_pr(&self, pr_id: &str) -> Result<PullRequest> {
        let start = Instant::now();
        debug!(pr_id, "Merging pull request");
        require_id(pr_id, Error::EmptyPrId)?;

        let mut pr = self.find_pr(pr_id).await?;
        if !pr.merge(Utc::now()) {
            debug!(pr_id, "Pull request already merged");
            return Ok(pr);
        }

        self.store.update_pr(&pr).await.map_err(|e| {
            error!(pr_id, error = %e, "Failed to update pull request status");
            pr_lookup_error(e, pr_id, "update pull request")
        })?;

        info!(
            pr_id,
            author_id = %pr.author_id,
            reviewers = pr.assigned_reviewers.len(),
            duration_ms = elapsed_ms(start),
            "Pull request merged"
        );
        Ok(pr)
    }

    /// Replace one assigned reviewer with another member of their team
    pub async fn reassign_reviewer(&self, pr_id: &str, old_user_id: &str) -> Result<Reassignment> {
        let start = Instant::now();
        debug!(pr_id, old_user_id, "Reassigning reviewer");
        require_id(pr_id, Error::EmptyPrId)?;
        require_id(old_user_id, Error::EmptyUserId)?;

        let mut pr = self.find_pr(pr_id).await?;
        if pr.is_merged() {
            warn!(pr_id, "Attempt to reassign on merged pull request");
            return Err(Error::CannotReassignOnMergedPr {
                pr_id: pr_id.to_string(),
            });
        }

        let old_user = self.find_user(old_user_id, "find old reviewer").await?;
        if !pr.has_reviewer(old_user_id) {
            warn!(
                pr_id,
                old_user_id,
                assigned = ?pr.assigned_reviewers,
                "Reviewer not assigned to this pull request"
            );
            return Err(Error::ReviewerNotAssigned {
                pr_id: pr_id.to_string(),
                user_id: old_user_id.to_string(),
            });
        }

        let members = self
            .store
            .find_users_by_team(&old_user.team_name)
            .await
            .map_err(|e| Error::storage("find replacement candidates", e))?;
        let replacement = {
            let mut exclude: HashSet<&str> =
                pr.assigned_reviewers.iter().map(String::as_str).collect();
            exclude.insert(pr.author_id.as_str());
            exclude.insert(old_user_id);
            let candidates = select_candidates(&members, &exclude);
            self.picker
                .pick(&candidates, REPLACEMENTS_PER_REASSIGN)
                .into_iter()
                .next()
        };

        let Some(new_user_id) = replacement else {
            warn!(
                pr_id,
                team_name = %old_user.team_name,
                "No replacement candidates available"
            );
            return Err(Error::NoReplacementCandidate {
                pr_id: pr_id.to_string(),
                team_name: old_user.team_name,
            });
        };

        if !pr.replace_reviewer(old_user_id, &new_user_id) {
            // Excluded ids never reach the picker
            error!(
                pr_id,
                old_user_id,
                new_user_id = %new_user_id,
                "Reviewer substitution rejected"
            );
            return Err(Error::Internal(format!(
                "cannot substitute {} for {} on {}",
                new_user_id, old_user_id, pr_id
            )));
        }

        self.store.update_pr(&pr).await.map_err(|e| {
            error!(pr_id, error = %e, "Failed to update pull request reviewers");
            pr_lookup_error(e, pr_id, "update pull request")
        })?;

        info!(
            pr_id,
            old_user_id,
            new_user_id = %new_user_id,
            team_name = %old_user.team_name,
            duration_ms = elapsed_ms(start),
            "Reviewer reassigned"
        );
        Ok(Reassignment {
            pr,
            replaced_by: new_user_id,
        })
    }

    async fn find_user(&self, user_id: &str, context: &'static str) -> Result<User> {
        self.store
            .find_user_by_id(user_id)
            .await
            .map_err(|e| lookup_error(e, user_id, context))
    }

    async fn find_pr(&self, pr_id: &str) -> Result<PullRequest> {
        self.store
            .find_pr_by_id(pr_id)
            .await
            .map_err(|e| pr_lookup_error(e, pr_id, "find pull request"))
    }
}

fn lookup_error(err: StoreError, user_id: &str, context: &'static str) -> Error {
    if err.is_not_found() {
        Error::NoUser {
            user_id: user_id.to_string(),
            context,
        }
    } else {
        Error::storage(context, err)
    }
}

/// Only a missing pull request maps to `NoPr`; a store may also report a
/// missing reviewer row on update.
fn pr_lookup_error(err: StoreError, pr_id: &str, operation: &'static str) -> Error {
    match err {
        StoreError::NotFound {
            entity: "pull request",
            ..
        } => Error::NoPr {
            pr_id: pr_id.to_string(),
        },
        StoreError::NotFound { entity: "user", id } => Error::NoUser {
            user_id: id,
            context: operation,
        },
        err => Error::storage(operation, err),
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::model::TeamMember;
    use crate::store::StoreResult;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// MemoryStore wrapper recording how often each call is made
    #[derive(Default)]
    struct CountingStore {
        inner: MemoryStore,
        calls: AtomicUsize,
        set_active_calls: AtomicUsize,
        create_team_calls: AtomicUsize,
        create_pr_calls: AtomicUsize,
        update_pr_calls: AtomicUsize,
        fail_next_update: std::sync::Mutex<Option<StoreError>>,
    }

    impl CountingStore {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn count(&self, counter: &AtomicUsize) -> usize {
            counter.load(Ordering::SeqCst)
        }

        fn bump(&self, counter: Option<&AtomicUsize>) {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(counter) = counter {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[async_trait]
    impl ReviewStore for CountingStore {
        async fn find_user_by_id(&self, user_id: &str) -> StoreResult<User> {
            self.bump(None);
            self.inner.find_user_by_id(user_id).await
        }

        async fn find_users_by_team(&self, team_name: &str) -> StoreResult<Vec<User>> {
            self.bump(None);
            self.inner.find_users_by_team(team_name).await
        }

        async fn set_user_active(&self, user_id: &str, is_active: bool) -> StoreResult<()> {
            self.bump(Some(&self.set_active_calls));
            self.inner.set_user_active(user_id, is_active).await
        }

        async fn team_exists(&self, team_name: &str) -> StoreResult<bool> {
            self.bump(None);
            self.inner.team_exists(team_name).await
        }

        async fn create_team(&self, team: &Team) -> StoreResult<()> {
            self.bump(Some(&self.create_team_calls));
            self.inner.create_team(team).await
        }

        async fn find_team_by_name(&self, team_name: &str) -> StoreResult<Team> {
            self.bump(None);
            self.inner.find_team_by_name(team_name).await
        }

        async fn create_pr(&self, pr: &PullRequest) -> StoreResult<()> {
            self.bump(Some(&self.create_pr_calls));
            self.inner.create_pr(pr).await
        }

        async fn find_pr_by_id(&self, pr_id: &str) -> StoreResult<PullRequest> {
            self.bump(None);
            self.inner.find_pr_by_id(pr_id).await
        }

        async fn update_pr(&self, pr: &PullRequest) -> StoreResult<()> {
            self.bump(Some(&self.update_pr_calls));
            if let Some(err) = self.fail_next_update.lock().unwrap().take() {
                return Err(err);
            }
            self.inner.update_pr(pr).await
        }

        async fn find_prs_by_reviewer(&self, user_id: &str) -> StoreResult<Vec<PullRequest>> {
            self.bump(None);
            self.inner.find_prs_by_reviewer(user_id).await
        }
    }

    fn service() -> ReviewService<CountingStore> {
        ReviewService::with_seed(CountingStore::default(), 42)
    }

    fn team(name: &str, members: &[(&str, bool)]) -> Team {
        Team::new(
            name,
            members
                .iter()
                .map(|(id, active)| TeamMember::new(*id, id.to_uppercase()).with_active(*active))
                .collect(),
        )
    }

    fn assert_invariants(pr: &PullRequest) {
        assert!(!pr.has_reviewer(&pr.author_id), "author reviews own PR");
        let unique: HashSet<&String> = pr.assigned_reviewers.iter().collect();
        assert_eq!(unique.len(), pr.assigned_reviewers.len(), "duplicate reviewer");
    }

    #[tokio::test]
    async fn test_create_and_get_team() {
        let svc = service();
        let backend = team("backend", &[("u1", true), ("u2", true), ("u3", false)]);

        let created = svc.create_team(&backend).await.unwrap();
        assert_eq!(created, backend);

        let fetched = svc.get_team("backend").await.unwrap();
        assert_eq!(fetched.team_name, "backend");
        let ids: HashSet<_> = fetched.members.iter().map(|m| m.user_id.clone()).collect();
        assert_eq!(ids, HashSet::from(["u1".into(), "u2".into(), "u3".into()]));
    }

    #[tokio::test]
    async fn test_create_team_validation_never_touches_store() {
        let svc = service();

        let err = svc.create_team(&team("", &[("u1", true)])).await.unwrap_err();
        assert!(matches!(err, Error::EmptyTeamName));
        let err = svc.create_team(&team("backend", &[])).await.unwrap_err();
        assert!(matches!(err, Error::EmptyTeamMembers));
        let err = svc.create_team(&team("backend", &[("", true)])).await.unwrap_err();
        assert!(matches!(err, Error::EmptyMemberId));

        assert_eq!(svc.store().calls(), 0);
    }

    #[tokio::test]
    async fn test_create_team_already_exists() {
        let svc = service();
        svc.create_team(&team("backend", &[("u1", true)])).await.unwrap();

        let err = svc
            .create_team(&team("backend", &[("u9", true)]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TeamAlreadyExists { .. }));
        assert_eq!(err.code(), "TEAM_EXISTS");
        assert_eq!(svc.store().count(&svc.store().create_team_calls), 1);
    }

    #[tokio::test]
    async fn test_create_team_with_member_of_other_team() {
        let svc = service();
        svc.create_team(&team("backend", &[("u1", true), ("u2", true)]))
            .await
            .unwrap();

        let err = svc
            .create_team(&team("frontend", &[("f1", true), ("u2", true)]))
            .await
            .unwrap_err();
        match err {
            Error::UserAlreadyExists(id) => assert_eq!(id, "u2"),
            other => panic!("unexpected error: {:?}", other),
        }

        assert!(matches!(
            svc.get_team("frontend").await,
            Err(Error::NoTeam { .. })
        ));
        assert_eq!(svc.store().count(&svc.store().create_team_calls), 1);
    }

    #[tokio::test]
    async fn test_get_team_errors() {
        let svc = service();
        assert!(matches!(svc.get_team("").await, Err(Error::EmptyTeamName)));
        assert!(matches!(svc.get_team("nope").await, Err(Error::NoTeam { .. })));
    }

    #[tokio::test]
    async fn test_set_user_active_is_idempotent() {
        let svc = service();
        svc.create_team(&team("backend", &[("u1", true)])).await.unwrap();

        let first = svc.set_user_active("u1", false).await.unwrap();
        let second = svc.set_user_active("u1", false).await.unwrap();
        assert!(!first.is_active);
        assert_eq!(first, second);
        assert_eq!(svc.store().count(&svc.store().set_active_calls), 1);

        let unchanged = svc.set_user_active("u1", false).await.unwrap();
        assert_eq!(unchanged.team_name, "backend");
        assert_eq!(svc.store().count(&svc.store().set_active_calls), 1);
    }

    #[tokio::test]
    async fn test_set_user_active_errors() {
        let svc = service();
        assert!(matches!(
            svc.set_user_active("", true).await,
            Err(Error::EmptyUserId)
        ));
        assert!(matches!(
            svc.set_user_active("ghost", true).await,
            Err(Error::NoUser { .. })
        ));
    }

    #[tokio::test]
    async fn test_create_pr_skips_inactive_members() {
        let svc = service();
        svc.create_team(&team(
            "backend",
            &[("author1", true), ("r1", true), ("r2", true), ("r3", false)],
        ))
        .await
        .unwrap();

        let pr = svc.create_pr("pr-1", "T", "author1").await.unwrap();
        assert_eq!(pr.status, crate::model::PrStatus::Open);
        assert_eq!(pr.assigned_reviewers, vec!["r1", "r2"]);
        assert!(pr.merged_at.is_none());
        assert_invariants(&pr);

        let stored = svc.store().find_pr_by_id("pr-1").await.unwrap();
        assert_eq!(stored, pr);
    }

    #[tokio::test]
    async fn test_create_pr_small_teams() {
        let svc = service();
        svc.create_team(&team("solo", &[("s1", true)])).await.unwrap();
        svc.create_team(&team("pair", &[("p1", true), ("p2", true)]))
            .await
            .unwrap();

        let pr = svc.create_pr("pr-solo", "Alone", "s1").await.unwrap();
        assert!(pr.assigned_reviewers.is_empty());

        let pr = svc.create_pr("pr-pair", "Pair", "p1").await.unwrap();
        assert_eq!(pr.assigned_reviewers, vec!["p2"]);
    }

    #[tokio::test]
    async fn test_create_pr_errors() {
        let svc = service();

        assert!(matches!(
            svc.create_pr("", "T", "u1").await,
            Err(Error::EmptyPrId)
        ));
        assert!(matches!(
            svc.create_pr("pr-1", "", "u1").await,
            Err(Error::EmptyPrName)
        ));
        assert!(matches!(
            svc.create_pr("pr-1", "T", "").await,
            Err(Error::EmptyAuthor)
        ));
        assert_eq!(svc.store().calls(), 0);

        svc.create_team(&team("backend", &[("u1", true), ("u2", true)]))
            .await
            .unwrap();

        let err = svc.create_pr("pr-1", "T", "ghost").await.unwrap_err();
        assert!(err.to_string().starts_with("author not found"));
        assert!(matches!(err, Error::NoUser { .. }));

        svc.create_pr("pr-1", "T", "u1").await.unwrap();
        assert!(matches!(
            svc.create_pr("pr-1", "Again", "u2").await,
            Err(Error::PrAlreadyExists { .. })
        ));
        assert_eq!(svc.store().count(&svc.store().create_pr_calls), 1);
    }

    #[tokio::test]
    async fn test_reviewers_per_pr_is_configurable() {
        let config = AssignmentConfig {
            reviewers_per_pr: 3,
            seed: Some(1),
        };
        let svc = ReviewService::from_config(MemoryStore::new(), &config);
        svc.create_team(&team(
            "backend",
            &[("a", true), ("b", true), ("c", true), ("d", true), ("e", true)],
        ))
        .await
        .unwrap();

        let pr = svc.create_pr("pr-1", "T", "a").await.unwrap();
        assert_eq!(pr.assigned_reviewers.len(), 3);
        assert_invariants(&pr);
    }

    #[tokio::test]
    async fn test_same_seed_same_assignment() {
        let members = [("a", true), ("b", true), ("c", true), ("d", true), ("e", true)];
        let mut picks = Vec::new();
        for _ in 0..2 {
            let svc = ReviewService::with_seed(MemoryStore::new(), 99);
            svc.create_team(&team("backend", &members)).await.unwrap();
            let pr = svc.create_pr("pr-1", "T", "a").await.unwrap();
            picks.push(pr.assigned_reviewers);
        }
        assert_eq!(picks[0], picks[1]);
    }

    #[tokio::test]
    async fn test_merge_pr_is_idempotent() {
        let svc = service();
        svc.create_team(&team("backend", &[("u1", true), ("u2", true)]))
            .await
            .unwrap();
        svc.create_pr("pr-1", "T", "u1").await.unwrap();

        let merged = svc.merge_pr("pr-1").await.unwrap();
        assert!(merged.is_merged());
        assert!(merged.merged_at.is_some());

        let again = svc.merge_pr("pr-1").await.unwrap();
        assert_eq!(again, merged);
        assert_eq!(svc.store().count(&svc.store().update_pr_calls), 1);
    }

    #[tokio::test]
    async fn test_merge_pr_errors() {
        let svc = service();
        assert!(matches!(svc.merge_pr("").await, Err(Error::EmptyPrId)));
        assert!(matches!(svc.merge_pr("nope").await, Err(Error::NoPr { .. })));
    }

    #[tokio::test]
    async fn test_update_missing_user_is_not_missing_pr() {
        let svc = service();
        svc.create_team(&team("backend", &[("u1", true), ("u2", true)]))
            .await
            .unwrap();
        svc.create_pr("pr-1", "T", "u1").await.unwrap();

        *svc.store().fail_next_update.lock().unwrap() =
            Some(StoreError::not_found("user", "u2"));
        let err = svc.merge_pr("pr-1").await.unwrap_err();
        assert!(matches!(err, Error::NoUser { ref user_id, .. } if user_id == "u2"));

        *svc.store().fail_next_update.lock().unwrap() =
            Some(StoreError::not_found("pull request", "pr-1"));
        let err = svc.merge_pr("pr-1").await.unwrap_err();
        assert!(matches!(err, Error::NoPr { .. }));
    }

    #[tokio::test]
    async fn test_reassign_picks_remaining_member() {
        let svc = service();
        svc.create_team(&team(
            "backend",
            &[("author1", true), ("r1", true), ("r2", true), ("r3", true)],
        ))
        .await
        .unwrap();
        let pr = svc.create_pr("pr-1", "T", "author1").await.unwrap();
        assert_eq!(pr.assigned_reviewers.len(), 2);

        let old = pr.assigned_reviewers[0].clone();
        let kept = pr.assigned_reviewers[1].clone();
        let expected = ["r1", "r2", "r3"]
            .into_iter()
            .find(|id| *id != old && *id != kept)
            .unwrap();

        let result = svc.reassign_reviewer("pr-1", &old).await.unwrap();
        assert_eq!(result.replaced_by, expected);
        assert_eq!(result.pr.assigned_reviewers, vec![expected.to_string(), kept]);
        assert_invariants(&result.pr);

        let stored = svc.store().find_pr_by_id("pr-1").await.unwrap();
        assert_eq!(stored, result.pr);
    }

    #[tokio::test]
    async fn test_reassign_without_candidates() {
        let svc = service();
        svc.create_team(&team("backend", &[("author1", true), ("r1", true), ("r2", true)]))
            .await
            .unwrap();
        svc.create_pr("pr-1", "T", "author1").await.unwrap();

        let err = svc.reassign_reviewer("pr-1", "r1").await.unwrap_err();
        assert!(matches!(err, Error::NoReplacementCandidate { .. }));
        assert_eq!(err.code(), "NO_CANDIDATE");
        assert_eq!(svc.store().count(&svc.store().update_pr_calls), 0);
    }

    #[tokio::test]
    async fn test_reassign_on_merged_pr() {
        let svc = service();
        svc.create_team(&team(
            "backend",
            &[("author1", true), ("r1", true), ("r2", true), ("r3", true)],
        ))
        .await
        .unwrap();
        let pr = svc.create_pr("pr-1", "T", "author1").await.unwrap();
        svc.merge_pr("pr-1").await.unwrap();
        let updates = svc.store().count(&svc.store().update_pr_calls);

        let err = svc
            .reassign_reviewer("pr-1", &pr.assigned_reviewers[0])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::CannotReassignOnMergedPr { .. }));
        assert_eq!(svc.store().count(&svc.store().update_pr_calls), updates);

        let stored = svc.store().find_pr_by_id("pr-1").await.unwrap();
        assert_eq!(stored.assigned_reviewers, pr.assigned_reviewers);
    }

    #[tokio::test]
    async fn test_reassign_errors() {
        let svc = service();
        svc.create_team(&team(
            "backend",
            &[("author1", true), ("r1", true), ("r2", true), ("r3", true)],
        ))
        .await
        .unwrap();
        svc.create_team(&team("other", &[("o1", true)])).await.unwrap();
        let pr = svc.create_pr("pr-1", "T", "author1").await.unwrap();

        assert!(matches!(
            svc.reassign_reviewer("", "r1").await,
            Err(Error::EmptyPrId)
        ));
        assert!(matches!(
            svc.reassign_reviewer("pr-1", "").await,
            Err(Error::EmptyUserId)
        ));
        assert!(matches!(
            svc.reassign_reviewer("nope", "r1").await,
            Err(Error::NoPr { .. })
        ));
        assert!(matches!(
            svc.reassign_reviewer("pr-1", "ghost").await,
            Err(Error::NoUser { .. })
        ));

        let err = svc.reassign_reviewer("pr-1", "o1").await.unwrap_err();
        assert_eq!(err.to_string(), "reviewer o1 not assigned to this PR");

        let unassigned = ["r1", "r2", "r3"]
            .into_iter()
            .find(|id| !pr.has_reviewer(id))
            .unwrap();
        assert!(matches!(
            svc.reassign_reviewer("pr-1", unassigned).await,
            Err(Error::ReviewerNotAssigned { .. })
        ));
        assert_eq!(svc.store().count(&svc.store().update_pr_calls), 0);
    }

    #[tokio::test]
    async fn test_reassign_draws_from_old_reviewers_team() {
        let svc = service();
        svc.create_team(&team("backend", &[("a1", true), ("b1", true)]))
            .await
            .unwrap();
        svc.create_team(&team("frontend", &[("f1", true), ("f2", true), ("f3", false)]))
            .await
            .unwrap();
        let pr = PullRequest::open("pr-x", "Cross", "a1", vec!["f1".to_string()], Utc::now());
        svc.store().create_pr(&pr).await.unwrap();

        let result = svc.reassign_reviewer("pr-x", "f1").await.unwrap();
        assert_eq!(result.replaced_by, "f2");
        assert_eq!(result.pr.assigned_reviewers, vec!["f2"]);
    }

    #[tokio::test]
    async fn test_reassignment_never_returns_old_or_inactive() {
        let members = [
            ("author", true),
            ("a", true),
            ("b", true),
            ("c", true),
            ("d", false),
            ("e", true),
        ];
        for seed in 0..20 {
            let svc = ReviewService::with_seed(MemoryStore::new(), seed);
            svc.create_team(&team("backend", &members)).await.unwrap();
            let pr = svc.create_pr("pr-1", "T", "author").await.unwrap();
            assert_invariants(&pr);

            let old = pr.assigned_reviewers[0].clone();
            let result = svc.reassign_reviewer("pr-1", &old).await.unwrap();
            assert_ne!(result.replaced_by, old);
            assert_ne!(result.replaced_by, "d");
            assert_ne!(result.replaced_by, "author");
            assert_eq!(result.pr.assigned_reviewers.len(), 2);
            assert_invariants(&result.pr);
        }
    }

    #[tokio::test]
    async fn test_get_user_reviews() {
        let svc = service();
        svc.create_team(&team("backend", &[("u1", true), ("u2", true)]))
            .await
            .unwrap();
        svc.create_pr("pr-1", "One", "u1").await.unwrap();
        svc.create_pr("pr-2", "Two", "u1").await.unwrap();

        let reviews = svc.get_user_reviews("u2").await.unwrap();
        let ids: Vec<_> = reviews.iter().map(|p| p.pull_request_id.as_str()).collect();
        assert_eq!(ids, vec!["pr-1", "pr-2"]);
        assert!(svc.get_user_reviews("u1").await.unwrap().is_empty());

        assert!(matches!(svc.get_user_reviews("").await, Err(Error::EmptyUserId)));
        assert!(matches!(
            svc.get_user_reviews("ghost").await,
            Err(Error::NoUser { .. })
        ));
    }
}
