//! Roster Core - review assignment rules for pull requests
//!
//! Decides which team members may review a pull request, picks reviewers,
//! and keeps the assignment rules intact through reassignment and merge.
//! Persistence is reached only through the [`ReviewStore`] trait.

pub mod config;
pub mod error;
pub mod memory;
pub mod model;
pub mod selection;
pub mod service;
pub mod store;
pub mod validation;

pub use config::Config;
pub use error::{Error, ErrorKind, Result};
pub use memory::MemoryStore;
pub use model::{PrStatus, PullRequest, Team, TeamMember, User};
pub use selection::{select_candidates, ReviewerPicker};
pub use service::{Reassignment, ReviewService};
pub use store::{ReviewStore, StoreError, StoreResult};
