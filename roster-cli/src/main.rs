//! Roster CLI - Command line interface for review assignment
//!
//! Manages teams and users, opens pull requests with automatically
//! assigned reviewers, and merges or reassigns them.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use roster_core::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{print_json, PrArgs, TeamArgs, UserArgs};

/// Roster: reviewer assignment for pull requests
#[derive(Parser, Debug)]
#[command(name = "roster")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Database file (overrides config and env)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Seed for reviewer picking (overrides config and env)
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Manage teams
    #[command(visible_alias = "t")]
    Team(TeamArgs),

    /// Manage users
    #[command(visible_alias = "u")]
    User(UserArgs),

    /// Manage pull requests
    Pr(PrArgs),

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays machine readable
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "Command failed");
            eprintln!("{}", render_error(&err));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let Some(command) = cli.command else {
        println!("Roster - reviewer assignment for pull requests");
        println!();
        println!("Use --help for usage information");
        return Ok(());
    };

    if let Commands::Version = command {
        println!("roster {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Only commands that touch config or storage get this far
    let config = Config::load_with_overrides(cli.db, cli.seed)?;
    if cli.verbose {
        tracing::info!(
            db = ?config.storage.path,
            reviewers_per_pr = config.assignment.reviewers_per_pr,
            seed = ?config.assignment.seed,
            "Configuration loaded"
        );
    }

    match command {
        Commands::Version => {}
        Commands::Team(args) => args.execute(&config).await?,
        Commands::User(args) => args.execute(&config).await?,
        Commands::Pr(args) => args.execute(&config).await?,
        Commands::Config => {
            print_json(&config)?;
            if let Some(path) = Config::default_config_path() {
                let state = if path.exists() {
                    "exists"
                } else {
                    "not found - using defaults"
                };
                eprintln!("Config file: {} ({})", path.display(), state);
            }
        }
    }

    Ok(())
}

/// `error[CODE]: message`, with the code taken from domain errors
fn render_error(err: &anyhow::Error) -> String {
    match err.downcast_ref::<roster_core::Error>() {
        Some(e) => format!("error[{}]: {}", e.code(), e),
        None => format!("error[INTERNAL]: {:#}", err),
    }
}
