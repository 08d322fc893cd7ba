//! Statistics commands

use std::process::ExitCode;

use clap::{Args, Subcommand};

use super::{emit, Service};

/// Statistics commands
#[derive(Args, Debug)]
pub struct StatsArgs {
    #[command(subcommand)]
    pub command: StatsCommand,
}

#[derive(Subcommand, Debug)]
pub enum StatsCommand {
    /// User counts, overall and per team
    Users,

    /// Pull request counts by status
    PullRequests,

    /// Busiest reviewers and active users without reviews
    Reviewers,
}

impl StatsArgs {
    /// Execute the statistics command
    pub async fn execute(&self, service: &Service) -> anyhow::Result<ExitCode> {
        match self.command {
            StatsCommand::Users => emit(service.user_stats().await),
            StatsCommand::PullRequests => emit(service.pull_request_stats().await),
            StatsCommand::Reviewers => emit(service.reviewer_stats().await),
        }
    }
}
