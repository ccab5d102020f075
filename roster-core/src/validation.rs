//! Structural checks on incoming team and pull request data
//!
//! These run before any storage access; a failure here means the store is
//! never called.

use std::collections::HashSet;

use crate::model::Team;
use crate::{Error, Result};

/// Check that a team has a name and well-formed, distinct members
pub fn validate_team(team: &Team) -> Result<()> {
    if team.team_name.trim().is_empty() {
        return Err(Error::EmptyTeamName);
    }
    if team.members.is_empty() {
        return Err(Error::EmptyTeamMembers);
    }

    let mut seen = HashSet::with_capacity(team.members.len());
    for member in &team.members {
        if member.user_id.trim().is_empty() {
            return Err(Error::EmptyMemberId);
        }
        if member.username.trim().is_empty() {
            return Err(Error::EmptyMemberName {
                user_id: member.user_id.clone(),
            });
        }
        if !seen.insert(member.user_id.as_str()) {
            return Err(Error::DuplicateMember {
                user_id: member.user_id.clone(),
            });
        }
    }

    Ok(())
}

/// Check the fields required to open a pull request
pub fn validate_pr_input(pr_id: &str, name: &str, author_id: &str) -> Result<()> {
    if pr_id.trim().is_empty() {
        Err(Error::EmptyPrId)
    } else if name.trim().is_empty() {
        Err(Error::EmptyPrName)
    } else if author_id.trim().is_empty() {
        Err(Error::EmptyAuthor)
    } else {
        Ok(())
    }
}

/// Reject blank identifiers, returning `err` when blank
pub(crate) fn require_id(id: &str, err: Error) -> Result<()> {
    if id.trim().is_empty() {
        Err(err)
    } else {
        Ok(())
    }
}
