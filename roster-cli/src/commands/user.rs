//! User commands

use clap::{Args, Subcommand};
use roster_core::Config;
use serde_json::json;

use super::{open_service, print_json};

/// User management commands
#[derive(Args, Debug)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommand,
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Make a user eligible for review assignment
    Activate {
        /// User id
        id: String,
    },

    /// Stop assigning reviews to a user
    Deactivate {
        /// User id
        id: String,
    },

    /// List pull requests the user is assigned to review
    Reviews {
        /// User id
        id: String,
    },
}

impl UserArgs {
    /// Execute the user command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let service = open_service(config).await?;
        match &self.command {
            UserCommand::Activate { id } => print_json(&service.set_user_active(id, true).await?),
            UserCommand::Deactivate { id } => {
                print_json(&service.set_user_active(id, false).await?)
            }
            UserCommand::Reviews { id } => {
                let prs = service.get_user_reviews(id).await?;
                print_json(&json!({
                    "user_id": id,
                    "pull_requests": prs,
                }))
            }
        }
    }
}
