//! Reviewer selection
//!
//! Candidate filtering is deterministic; the picker is the only place
//! randomness enters, through an injected generator.

mod candidates;
mod picker;

pub use candidates::select_candidates;
pub use picker::ReviewerPicker;
