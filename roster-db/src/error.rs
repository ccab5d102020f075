//! Error types for database operations

use roster_core::StoreError;
use thiserror::Error;

/// Database error types
#[derive(Error, Debug)]
pub enum DbError {
    /// SQLx database error
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be mapped back to the domain
    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("{entity} {id} already exists")]
    AlreadyExists { entity: &'static str, id: String },
}

/// Result type alias for database operations
pub type Result<T> = std::result::Result<T, DbError>;

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => StoreError::NotFound { entity, id },
            DbError::AlreadyExists { entity, id } => StoreError::AlreadyExists { entity, id },
            other => StoreError::Backend(other.to_string()),
        }
    }
}

/// Map constraint violations on an insert to domain conflicts
///
/// A unique violation means `entity`/`id` already exists; a foreign key
/// violation means something the row points at (`missing`) is absent.
pub(crate) fn classify_insert(
    err: sqlx::Error,
    entity: &'static str,
    id: &str,
    missing: (&'static str, &str),
) -> DbError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return DbError::AlreadyExists {
                entity,
                id: id.to_string(),
            };
        }
        if db_err.is_foreign_key_violation() {
            return DbError::NotFound {
                entity: missing.0,
                id: missing.1.to_string(),
            };
        }
    }
    DbError::Sqlx(err)
}
