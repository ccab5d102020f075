//! Database connection and configuration

use crate::error::{DbError, Result};
use crate::store::SqliteStore;
use roster_core::config::StorageConfig;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::ConnectOptions;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const INITIAL_SCHEMA: &str = include_str!("../migrations/001_initial_schema.sql");

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Path to SQLite database file
    pub path: PathBuf,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// How long to wait for a free connection before failing
    pub acquire_timeout: Duration,
}

impl DatabaseConfig {
    /// Create a new database config with the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(5),
        }
    }

    /// Build from the storage section of the Roster config
    pub fn from_storage(storage: &StorageConfig) -> roster_core::Result<Self> {
        Ok(Self {
            path: storage.resolved_path()?,
            max_connections: storage.max_connections,
            acquire_timeout: storage.acquire_timeout,
        })
    }
}

/// Database connection pool
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to the database with the given configuration
    pub async fn connect(config: DatabaseConfig) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = config.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let options =
            SqliteConnectOptions::from_str(&format!("sqlite://{}", config.path.display()))?
                .create_if_missing(true)
                .foreign_keys(true)
                .disable_statement_logging();

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(options)
            .await?;

        tracing::debug!(path = %config.path.display(), "Connected to database");
        Ok(Self { pool })
    }

    /// Private in-memory database, mainly for tests
    ///
    /// Uses a single connection that is never recycled, since every SQLite
    /// memory connection is its own database.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::raw_sql(INITIAL_SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::Migration(e.to_string()))?;
        Ok(())
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Review store backed by this database
    pub fn store(&self) -> SqliteStore {
        SqliteStore::new(self.pool.clone())
    }

    /// Close the database connection
    pub async fn close(self) {
        self.pool.close().await;
    }
}
