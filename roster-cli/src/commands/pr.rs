//! Pull request commands

use std::process::ExitCode;

use clap::{Args, Subcommand};
use roster_core::{CreatePullRequest, PullRequest, ReassignReviewer};
use serde::Serialize;

use super::{emit, Service};

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
        pull_request_id: String,

        /// Pull request title
        #[arg(short, long, default_value = "")]
        name: String,

        /// Author user id
        #[arg(short, long)]
        author: String,
    },

    /// Mark a pull request merged
    Merge {
        /// Pull request id
        pull_request_id: String,
    },

    /// Replace one reviewer with another member of their team
    Reassign {
        /// Pull request id
        pull_request_id: String,

        /// Reviewer to replace
        #[arg(short, long)]
        old_reviewer: String,
    },
}

#[derive(Serialize)]
struct PullRequestResponse {
    pr: PullRequest,
}

impl PrArgs {
    /// Execute the pull request command
    pub async fn execute(&self, service: &Service) -> anyhow::Result<ExitCode> {
        match &self.command {
            PrCommand::Create {
                pull_request_id,
                name,
                author,
            } => {
                let result = service
                    .create_pull_request(CreatePullRequest::new(
                        pull_request_id.as_str(),
                        name.as_str(),
                        author.as_str(),
                    ))
                    .await;
                emit(result.map(|pr| PullRequestResponse { pr }))
            }
            PrCommand::Merge { pull_request_id } => {
                let result = service.merge_pull_request(pull_request_id).await;
                emit(result.map(|pr| PullRequestResponse { pr }))
            }
            PrCommand::Reassign {
                pull_request_id,
                old_reviewer,
            } => {
                let result = service
                    .reassign_reviewer(ReassignReviewer {
                        pull_request_id: pull_request_id.clone(),
                        old_reviewer_id: old_reviewer.clone(),
                    })
                    .await;
                emit(result)
            }
        }
    }
}
