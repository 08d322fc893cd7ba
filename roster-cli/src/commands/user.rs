//! User commands

use std::process::ExitCode;

use clap::{Args, Subcommand};
use roster_core::{PullRequestShort, SetUserActive, User};
use serde::Serialize;

use super::{emit, Service};

/// User commands
#[derive(Args, Debug)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommand,
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Make a user eligible for review again
    Activate {
        /// User id
        user_id: String,
    },

    /// Take a user out of review and hand their open reviews to teammates
    Deactivate {
        /// User id
        user_id: String,
    },

    /// List pull requests the user reviews
    Reviews {
        /// User id
        user_id: String,
    },
}

#[derive(Serialize)]
struct UserResponse {
    user: User,
}

#[derive(Serialize)]
struct ReviewsResponse {
    user_id: String,
    pull_requests: Vec<PullRequestShort>,
}

impl UserArgs {
    /// Execute the user command
    pub async fn execute(&self, service: &Service) -> anyhow::Result<ExitCode> {
        match &self.command {
            UserCommand::Activate { user_id } => set_active(service, user_id, true).await,
            UserCommand::Deactivate { user_id } => set_active(service, user_id, false).await,
            UserCommand::Reviews { user_id } => {
                let result = service.user_reviews(user_id).await;
                emit(result.map(|pull_requests| ReviewsResponse {
                    user_id: user_id.clone(),
                    pull_requests,
                }))
            }
        }
    }
}

async fn set_active(service: &Service, user_id: &str, is_active: bool) -> anyhow::Result<ExitCode> {
    let result = service
        .set_user_active(SetUserActive {
            user_id: user_id.to_string(),
            is_active,
        })
        .await;
    emit(result.map(|user| UserResponse { user }))
}
