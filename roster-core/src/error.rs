//! Error types for Roster
//!
//! Failures fall into two tiers. Business errors are expected outcomes
//! (duplicate team, merged pull request, ...) and carry a stable
//! [`ErrorCode`]. Technical errors (storage failures, exhausted conflict
//! retries, deadlines) all collapse into `SERVICE_UNAVAILABLE` and never
//! leak their detail to the caller.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::{Entity, StorageError};

/// Message returned for every technical failure
pub const UNAVAILABLE_MESSAGE: &str = "service unavailable, try again later";

/// Error raised inside the engines and the review service
#[derive(Error, Debug)]
pub enum ServiceError {
    /// A team with the same name is already registered
    #[error("team already exists")]
    TeamExists,

    /// A user with the same id is already registered
    #[error("user already exists")]
    UserExists,

    /// A pull request with the same id is already registered
    #[error("pull request already exists")]
    PrExists,

    /// The pull request is merged and its reviewer set is frozen
    #[error("can't reassign reviewer on merged pull request")]
    PrMerged,

    /// The reviewer to replace does not review this pull request
    #[error("reviewer is not assigned to this pull request")]
    NotAssigned,

    /// No active teammate is available as a replacement
    #[error("no active replacement candidate in team")]
    NoCandidate,

    /// A referenced record does not exist, or a required field was empty
    #[error("{0}")]
    NotFound(String),

    /// Malformed request payload
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The operation did not finish before its deadline
    #[error("deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),

    /// Failure reported by the storage adapter
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ServiceError {
    /// Stable code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            ServiceError::TeamExists => ErrorCode::TeamExists,
            ServiceError::UserExists => ErrorCode::UserExists,
            ServiceError::PrExists => ErrorCode::PrExists,
            ServiceError::PrMerged => ErrorCode::PrMerged,
            ServiceError::NotAssigned => ErrorCode::NotAssigned,
            ServiceError::NoCandidate => ErrorCode::NoCandidate,
            ServiceError::NotFound(_) => ErrorCode::NotFound,
            ServiceError::InvalidInput(_) => ErrorCode::InvalidInput,
            ServiceError::DeadlineExceeded(_) => ErrorCode::ServiceUnavailable,
            ServiceError::Storage(err) => match err {
                StorageError::UniqueViolation(Entity::Team) => ErrorCode::TeamExists,
                StorageError::UniqueViolation(Entity::User) => ErrorCode::UserExists,
                StorageError::UniqueViolation(Entity::PullRequest) => ErrorCode::PrExists,
                // A duplicate (pr, reviewer) pair means a selector bug, not a user mistake
                StorageError::UniqueViolation(Entity::ReviewerAssignment) => {
                    ErrorCode::ServiceUnavailable
                }
                StorageError::ForeignKeyViolation(_) | StorageError::NotFound(_) => {
                    ErrorCode::NotFound
                }
                StorageError::Conflict(_) | StorageError::Backend(_) => {
                    ErrorCode::ServiceUnavailable
                }
            },
        }
    }

    /// Whether this is a technical failure rather than a business outcome
    pub fn is_technical(&self) -> bool {
        self.code() == ErrorCode::ServiceUnavailable
    }

    /// Whether the storage reported a write-write conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, ServiceError::Storage(StorageError::Conflict(_)))
    }

    /// Caller-facing code and message
    pub fn details(&self) -> ErrorDetails {
        let code = self.code();
        let message = match (code, self) {
            (ErrorCode::ServiceUnavailable, _) => UNAVAILABLE_MESSAGE.to_string(),
            (ErrorCode::TeamExists, _) => ServiceError::TeamExists.to_string(),
            (ErrorCode::UserExists, _) => ServiceError::UserExists.to_string(),
            (ErrorCode::PrExists, _) => ServiceError::PrExists.to_string(),
            (ErrorCode::NotFound, ServiceError::Storage(_)) => "resource not found".to_string(),
            _ => self.to_string(),
        };
        ErrorDetails { code, message }
    }
}

/// Stable business error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    TeamExists,
    UserExists,
    PrExists,
    PrMerged,
    NotAssigned,
    NoCandidate,
    NotFound,
    InvalidInput,
    ServiceUnavailable,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::TeamExists => "TEAM_EXISTS",
            ErrorCode::UserExists => "USER_EXISTS",
            ErrorCode::PrExists => "PR_EXISTS",
            ErrorCode::PrMerged => "PR_MERGED",
            ErrorCode::NotAssigned => "NOT_ASSIGNED",
            ErrorCode::NoCandidate => "NO_CANDIDATE",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::ServiceUnavailable => "SERVICE_UNAVAILABLE",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error payload handed to callers of the review service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
}

impl ErrorDetails {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ErrorDetails {}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML for [`crate::Config`]
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// An override carried a value that cannot be used
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}
