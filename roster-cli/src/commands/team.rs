//! Team commands

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Subcommand};
use roster_core::{Config, Team};

use super::{open_service, print_json};

/// Team management commands
#[derive(Args, Debug)]
pub struct TeamArgs {
    #[command(subcommand)]
    pub command: TeamCommand,
}

#[derive(Subcommand, Debug)]
pub enum TeamCommand {
    /// Create a team and its members from a JSON file
    Add {
        /// File holding `{"team_name": ..., "members": [...]}`
        file: PathBuf,
    },

    /// Show a team with its members
    Get {
        /// Team name
        name: String,
    },
}

impl TeamArgs {
    /// Execute the team command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let service = open_service(config).await?;
        match &self.command {
            TeamCommand::Add { file } => {
                let team = read_team(file)?;
                let created = service.create_team(&team).await?;
                print_json(&created)
            }
            TeamCommand::Get { name } => {
                let team = service.get_team(name).await?;
                print_json(&team)
            }
        }
    }
}

fn read_team(path: &Path) -> anyhow::Result<Team> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read team file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse team file {}", path.display()))
}
