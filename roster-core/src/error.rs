//! Error types for Roster

use thiserror::Error;

use crate::store::StoreError;

/// Result type alias for Roster operations
pub type Result<T> = std::result::Result<T, Error>;

/// Broad category of an [`Error`], used by transports to pick a status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Empty or malformed input; storage was never touched
    Validation,
    /// Team, user or pull request is absent
    NotFound,
    /// Request conflicts with current state
    Conflict,
    /// Storage collaborator failed
    Storage,
    /// Configuration or local I/O problem
    Internal,
}

/// Error type for Roster operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("empty team name")]
    EmptyTeamName,

    #[error("team has no members")]
    EmptyTeamMembers,

    #[error("empty team member user ID")]
    EmptyMemberId,

    #[error("empty team member username for user {user_id}")]
    EmptyMemberName { user_id: String },

    #[error("user {user_id} listed more than once in team")]
    DuplicateMember { user_id: String },

    #[error("empty pull request ID")]
    EmptyPrId,

    #[error("empty pull request name")]
    EmptyPrName,

    #[error("empty author ID of pull request")]
    EmptyAuthor,

    #[error("empty user ID")]
    EmptyUserId,

    #[error("no such team: {team_name}")]
    NoTeam { team_name: String },

    /// `context` names what was being looked up, e.g. "author not found"
    #[error("{context}: no such user {user_id}")]
    NoUser {
        user_id: String,
        context: &'static str,
    },

    #[error("no such pull request: {pr_id}")]
    NoPr { pr_id: String },

    #[error("team {team_name} already exists")]
    TeamAlreadyExists { team_name: String },

    #[error("user {0} already exists")]
    UserAlreadyExists(String),

    #[error("pull request {pr_id} already exists")]
    PrAlreadyExists { pr_id: String },

    #[error("cannot reassign reviewer on merged pull request {pr_id}")]
    CannotReassignOnMergedPr { pr_id: String },

    #[error("reviewer {user_id} not assigned to this PR")]
    ReviewerNotAssigned { pr_id: String, user_id: String },

    #[error("no available candidates for replacement in team {team_name}")]
    NoReplacementCandidate { pr_id: String, team_name: String },

    /// Storage failure, wrapped with the operation that hit it
    #[error("{operation}: {source}")]
    Storage {
        operation: &'static str,
        #[source]
        source: StoreError,
    },

    /// A rule the service itself maintains was broken
    #[error("Internal error: {0}")]
    Internal(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wrap a storage error with the name of the failing operation
    pub fn storage(operation: &'static str, source: StoreError) -> Self {
        Error::Storage { operation, source }
    }

    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::EmptyTeamName
            | Error::EmptyTeamMembers
            | Error::EmptyMemberId
            | Error::EmptyMemberName { .. }
            | Error::DuplicateMember { .. }
            | Error::EmptyPrId
            | Error::EmptyPrName
            | Error::EmptyAuthor
            | Error::EmptyUserId => ErrorKind::Validation,
            Error::NoTeam { .. } | Error::NoUser { .. } | Error::NoPr { .. } => {
                ErrorKind::NotFound
            }
            Error::TeamAlreadyExists { .. }
            | Error::UserAlreadyExists(_)
            | Error::PrAlreadyExists { .. }
            | Error::CannotReassignOnMergedPr { .. }
            | Error::ReviewerNotAssigned { .. }
            | Error::NoReplacementCandidate { .. } => ErrorKind::Conflict,
            Error::Storage { .. } => ErrorKind::Storage,
            Error::Internal(_) | Error::Config(_) | Error::Io(_) => ErrorKind::Internal,
        }
    }

    /// Stable machine-readable code for API and CLI consumers
    pub fn code(&self) -> &'static str {
        match self {
            Error::TeamAlreadyExists { .. } => "TEAM_EXISTS",
            Error::UserAlreadyExists(_) => "USER_EXISTS",
            Error::PrAlreadyExists { .. } => "PR_EXISTS",
            Error::CannotReassignOnMergedPr { .. } => "PR_MERGED",
            Error::ReviewerNotAssigned { .. } => "NOT_ASSIGNED",
            Error::NoReplacementCandidate { .. } => "NO_CANDIDATE",
            _ => match self.kind() {
                ErrorKind::Validation => "INVALID_INPUT",
                ErrorKind::NotFound => "NOT_FOUND",
                ErrorKind::Storage => "STORAGE",
                ErrorKind::Conflict | ErrorKind::Internal => "INTERNAL",
            },
        }
    }
}
