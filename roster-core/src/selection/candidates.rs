//! Eligible reviewer filtering

use std::collections::HashSet;

use crate::model::User;

/// Active team members whose ids are not in `exclude`
///
/// Output keeps the order of `members`. An empty team or a fully excluded
/// one yields an empty list.
pub fn select_candidates<'a>(members: &'a [User], exclude: &HashSet<&str>) -> Vec<&'a User> {
    members
        .iter()
        .filter(|user| user.is_active && !exclude.contains(user.user_id.as_str()))
        .collect()
}
