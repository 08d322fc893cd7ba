//! Team commands

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Subcommand};
use roster_core::{ErrorCode, ErrorDetails, Team};
use serde::Serialize;

use super::{emit, Service};

/// Team commands
#[derive(Args, Debug)]
pub struct TeamArgs {
    #[command(subcommand)]
    pub command: TeamCommand,
}

#[derive(Subcommand, Debug)]
pub enum TeamCommand {
    /// Register a team with its members from a JSON file
    Add {
        /// JSON file shaped like {"team_name": ..., "members": [...]}; "-" reads stdin
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Show a team and its members
    Get {
        /// Team name
        team_name: String,
    },
}

#[derive(Serialize)]
struct TeamResponse {
    team: Team,
}

impl TeamArgs {
    /// Execute the team command
    pub async fn execute(&self, service: &Service) -> anyhow::Result<ExitCode> {
        match &self.command {
            TeamCommand::Add { file } => {
                let result = match read_team(file)? {
                    Ok(team) => service.add_team(team).await,
                    Err(details) => Err(details),
                };
                emit(result.map(|team| TeamResponse { team }))
            }
            TeamCommand::Get { team_name } => {
                let result = service.get_team(team_name).await;
                emit(result.map(|team| TeamResponse { team }))
            }
        }
    }
}

/// Read a team payload; malformed JSON is a caller error, not a process failure
fn read_team(path: &Path) -> anyhow::Result<Result<Team, ErrorDetails>> {
    let contents = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read team from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read team file {}", path.display()))?
    };
    Ok(parse_team(&contents))
}

fn parse_team(contents: &str) -> Result<Team, ErrorDetails> {
    serde_json::from_str(contents)
        .map_err(|e| ErrorDetails::new(ErrorCode::InvalidInput, format!("malformed team: {}", e)))
}
