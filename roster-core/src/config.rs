//! Configuration management for Roster
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (ROSTER_*)
//! 3. Config file (~/.config/roster/config.toml)
//! 4. Default values

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Reviewers assigned to a freshly opened pull request
pub const DEFAULT_REVIEWERS_PER_PR: usize = 2;

/// Reviewers drawn when one assigned reviewer is replaced
pub const REPLACEMENTS_PER_REASSIGN: usize = 1;

/// Reviewer assignment settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AssignmentConfig {
    /// Target reviewer count for new pull requests
    pub reviewers_per_pr: usize,

    /// Fixed seed for reviewer picking; time-derived when unset
    pub seed: Option<u64>,
}

impl Default for AssignmentConfig {
    fn default() -> Self {
        Self {
            reviewers_per_pr: DEFAULT_REVIEWERS_PER_PR,
            seed: None,
        }
    }
}

/// Storage settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Database file; defaults to ~/.cache/roster/roster.db
    pub path: Option<PathBuf>,

    /// Maximum number of pooled connections
    pub max_connections: u32,

    /// How long to wait for a pooled connection
    #[serde(with = "humantime_serde")]
    pub acquire_timeout: Duration,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: None,
            max_connections: 5,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

impl StorageConfig {
    /// Configured path, falling back to the cache directory
    pub fn resolved_path(&self) -> Result<PathBuf> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => dirs::cache_dir()
                .map(|p| p.join("roster").join("roster.db"))
                .ok_or_else(|| Error::Config("Could not determine cache directory".to_string())),
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub assignment: AssignmentConfig,
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/roster/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("roster").join("config.toml"))
    }

    /// Reject settings the service cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.assignment.reviewers_per_pr == 0 {
            return Err(Error::Config(
                "assignment.reviewers_per_pr must be at least 1".to_string(),
            ));
        }
        if self.storage.max_connections == 0 {
            return Err(Error::Config(
                "storage.max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - ROSTER_DB_PATH: database file
    /// - ROSTER_SEED: reviewer picking seed
    /// - ROSTER_REVIEWERS_PER_PR: reviewers per new pull request
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(path) = lookup("ROSTER_DB_PATH") {
            self.storage.path = Some(PathBuf::from(path));
        }

        if let Some(seed) = lookup("ROSTER_SEED") {
            let seed = seed
                .parse()
                .map_err(|e| Error::Config(format!("Invalid ROSTER_SEED '{}': {}", seed, e)))?;
            self.assignment.seed = Some(seed);
        }

        if let Some(count) = lookup("ROSTER_REVIEWERS_PER_PR") {
            let count = count.parse().map_err(|e| {
                Error::Config(format!("Invalid ROSTER_REVIEWERS_PER_PR '{}': {}", count, e))
            })?;
            self.assignment.reviewers_per_pr = count;
        }

        Ok(self)
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, db_path: Option<PathBuf>, seed: Option<u64>) -> Self {
        if let Some(path) = db_path {
            self.storage.path = Some(path);
        }

        if let Some(seed) = seed {
            self.assignment.seed = Some(seed);
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(db_path: Option<PathBuf>, seed: Option<u64>) -> Result<Self> {
        let config = Self::load()?
            .with_env_overrides()?
            .with_cli_overrides(db_path, seed);
        config.validate()?;
        Ok(config)
    }
}
