//! SQLite persistence for Roster
//!
//! Stores teams, users and pull requests with their reviewer slots, and
//! implements [`roster_core::ReviewStore`] on top of a sqlx pool.

pub mod db;
pub mod error;
pub mod models;
pub mod store;

pub use db::{Database, DatabaseConfig};
pub use error::{DbError, Result};
pub use store::SqliteStore;
