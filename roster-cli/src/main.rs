//! Roster CLI - command line interface for Roster
//!
//! Team-based reviewer assignment backed by a local SQLite database.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use roster_core::{Config, ReviewService};
use roster_db::{Database, DatabaseConfig};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{PrArgs, StatsArgs, TeamArgs, UserArgs};

/// Roster: reviewer assignment for team-based code review
#[derive(Parser, Debug)]
#[command(name = "roster")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// SQLite database file (overrides config and env)
    #[arg(long, global = true, env = "ROSTER_DATABASE_PATH")]
    database: Option<PathBuf>,

    /// Config file to load instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Register and inspect teams
    Team(TeamArgs),

    /// Activate, deactivate and inspect users
    User(UserArgs),

    /// Create, merge and reassign pull requests
    #[command(visible_alias = "pull-request")]
    Pr(PrArgs),

    /// Aggregate counts
    Stats(StatsArgs),

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    // Load configuration with overrides
    let config = Config::load_with_overrides(cli.config.clone(), cli.database.clone())
        .context("Failed to load configuration")?;

    tracing::debug!(
        database = ?config.database.path,
        reviewers_per_pull_request = config.assignment.reviewers_per_pull_request,
        request_timeout = ?config.service.request_timeout,
        "Configuration loaded"
    );

    if let Commands::Config = cli.command {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(ExitCode::SUCCESS);
    }

    let db_config = DatabaseConfig::from_settings(&config.database)?;
    let db = Database::connect(db_config.clone())
        .await
        .with_context(|| format!("Failed to open database {}", db_config.path.display()))?;
    let service = ReviewService::new(db.storage(), &config);

    let status = match &cli.command {
        Commands::Team(args) => args.execute(&service).await?,
        Commands::User(args) => args.execute(&service).await?,
        Commands::Pr(args) => args.execute(&service).await?,
        Commands::Stats(args) => args.execute(&service).await?,
        Commands::Config => ExitCode::SUCCESS,
    };

    db.close().await;
    Ok(status)
}
