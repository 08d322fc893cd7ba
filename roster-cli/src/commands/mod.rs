//! CLI command implementations
//!
//! Every command prints one JSON document on stdout. Failures reported by
//! the review service are printed as `{"error": {"code", "message"}}` and
//! turn into a non-zero exit status.

pub mod pr;
pub mod stats;
pub mod team;
pub mod user;

use std::process::ExitCode;

use roster_core::{ErrorDetails, ReviewService};
use roster_db::SqliteStorage;
use serde::Serialize;

pub use pr::PrArgs;
pub use stats::StatsArgs;
pub use team::TeamArgs;
pub use user::UserArgs;

/// Review service over the SQLite adapter
pub type Service = ReviewService<SqliteStorage>;

#[derive(Serialize)]
struct ErrorResponse<'a> {
    error: &'a ErrorDetails,
}

/// Serialize a service outcome; the flag is `true` on success
pub fn render<T: Serialize>(result: &Result<T, ErrorDetails>) -> serde_json::Result<(String, bool)> {
    match result {
        Ok(value) => Ok((serde_json::to_string_pretty(value)?, true)),
        Err(error) => Ok((serde_json::to_string_pretty(&ErrorResponse { error })?, false)),
    }
}

/// Print a service outcome and pick the exit status
pub fn emit<T: Serialize>(result: Result<T, ErrorDetails>) -> anyhow::Result<ExitCode> {
    let (body, ok) = render(&result)?;
    println!("{}", body);
    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
