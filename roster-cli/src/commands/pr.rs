//! Pull request commands

use clap::{Args, Subcommand};
use roster_core::Config;

use super::{open_service, print_json};

/// Pull request commands
#[derive(Args, Debug)]
pub struct PrArgs {
    #[command(subcommand)]
    pub command: PrCommand,
}

#[derive(Subcommand, Debug)]
pub enum PrCommand {
    /// Open a pull request and assign reviewers from the author's team
    Create {
        /// Pull request id
        id: String,

        /// Pull request title
        name: String,

        /// Author user id
        #[arg(short, long)]
        author: String,
    },

    /// Mark a pull request as merged
    Merge {
        /// Pull request id
        id: String,
    },

    /// Replace one assigned reviewer with another teammate
    Reassign {
        /// Pull request id
        id: String,

        /// Reviewer to replace
        #[arg(long)]
        old_reviewer: String,
    },
}

impl PrArgs {
    /// Execute the pull request command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let service = open_service(config).await?;
        match &self.command {
            PrCommand::Create { id, name, author } => {
                print_json(&service.create_pr(id, name, author).await?)
            }
            PrCommand::Merge { id } => print_json(&service.merge_pr(id).await?),
            PrCommand::Reassign { id, old_reviewer } => {
                print_json(&service.reassign_reviewer(id, old_reviewer).await?)
            }
        }
    }
}
