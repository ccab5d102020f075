//! CLI command implementations

pub mod pr;
pub mod team;
pub mod user;

pub use pr::PrArgs;
pub use team::TeamArgs;
pub use user::UserArgs;

use anyhow::Context;
use roster_core::{Config, ReviewService};
use roster_db::{Database, DatabaseConfig, SqliteStore};
use serde::Serialize;

/// Service over the configured SQLite database, migrated and ready
pub async fn open_service(config: &Config) -> anyhow::Result<ReviewService<SqliteStore>> {
    let db_config = DatabaseConfig::from_storage(&config.storage)?;
    let path = db_config.path.clone();

    let db = Database::connect(db_config)
        .await
        .with_context(|| format!("Failed to open database at {}", path.display()))?;
    db.migrate().await?;

    tracing::debug!(path = %path.display(), "Database ready");
    Ok(ReviewService::from_config(db.store(), &config.assignment))
}

/// Print a value as pretty JSON on stdout
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
