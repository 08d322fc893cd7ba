//! Storage abstraction consumed by the engines and the review service.
//!
//! `Storage` covers pool-level reads and single-statement writes.
//! Everything that must be atomic goes through a `StorageTx` obtained from
//! [`Storage::begin`]. Implementations must roll back a transaction that is
//! dropped without [`StorageTx::commit`], so cancelling an operation never
//! leaves partial writes behind.

#[cfg(test)]
pub(crate) mod memory;

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    CreatePullRequest, PullRequest, PullRequestShort, PullRequestStats, ReviewerStats, Team,
    TeamMember, User, UserStats,
};

/// Order in which storage draws the eligible pool before capping it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolOrder {
    /// Fresh random draw on every call
    Random,
    /// Ascending user id
    ById,
}

/// Record kinds guarded by uniqueness constraints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Team,
    User,
    PullRequest,
    ReviewerAssignment,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Entity::Team => "team",
            Entity::User => "user",
            Entity::PullRequest => "pull request",
            Entity::ReviewerAssignment => "reviewer assignment",
        };
        f.write_str(name)
    }
}

/// Failures signalled by a storage adapter
#[derive(Error, Debug)]
pub enum StorageError {
    /// Insert hit a uniqueness constraint
    #[error("{0} already exists")]
    UniqueViolation(Entity),

    /// Insert referenced a record that does not exist
    #[error("referenced record does not exist: {0}")]
    ForeignKeyViolation(String),

    /// Update matched no row
    #[error("not found: {0}")]
    NotFound(String),

    /// Concurrent writer holds the lock; the unit of work may be retried
    #[error("write conflict: {0}")]
    Conflict(String),

    /// Anything else: connectivity, I/O, decoding
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StorageError {
    /// Wrap an arbitrary backend failure with the operation that hit it
    pub fn backend(context: &str, err: impl fmt::Display) -> Self {
        StorageError::Backend(format!("{}: {}", context, err))
    }
}

/// Result type alias for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Pool-level access to team, user and pull request records
#[async_trait]
pub trait Storage: Send + Sync {
    /// Transaction handle type
    type Tx: StorageTx + 'static;

    /// Open a transaction
    async fn begin(&self) -> StorageResult<Self::Tx>;

    /// Team with its members in registration order.
    ///
    /// `None` when no such team exists; a registered team with no members is
    /// `Some` with an empty member list.
    async fn select_team(&self, team_name: &str) -> StorageResult<Option<Team>>;

    async fn select_user(&self, user_id: &str) -> StorageResult<Option<User>>;

    async fn select_pull_request(&self, pull_request_id: &str)
        -> StorageResult<Option<PullRequest>>;

    /// Pull requests the user currently reviews, ordered by pull request id
    async fn select_user_reviews(&self, user_id: &str) -> StorageResult<Vec<PullRequestShort>>;

    /// Flip an OPEN pull request to MERGED and stamp `merged_at`.
    ///
    /// Returns `false` without error when the pull request is already merged
    /// or does not exist.
    async fn mark_pull_request_merged(&self, pull_request_id: &str) -> StorageResult<bool>;

    async fn select_user_stats(&self) -> StorageResult<UserStats>;

    async fn select_pull_request_stats(&self) -> StorageResult<PullRequestStats>;

    /// Review load for active users; `limit` bounds `top_reviewers`
    async fn select_reviewer_stats(&self, limit: usize) -> StorageResult<ReviewerStats>;
}

/// Transaction-scoped reads and writes
#[async_trait]
pub trait StorageTx: Send + Sized {
    async fn insert_team(&mut self, team_name: &str) -> StorageResult<()>;

    async fn insert_team_member(&mut self, team_name: &str, member: &TeamMember)
        -> StorageResult<()>;

    async fn select_user(&mut self, user_id: &str) -> StorageResult<Option<User>>;

    /// Set the active flag; [`StorageError::NotFound`] when the user does not exist
    async fn update_user_active(&mut self, user_id: &str, is_active: bool) -> StorageResult<()>;

    /// Up to `limit` active members of `team_name` other than `exclude_user_id`,
    /// drawn in `order`
    async fn select_eligible_reviewers(
        &mut self,
        team_name: &str,
        exclude_user_id: &str,
        order: PoolOrder,
        limit: usize,
    ) -> StorageResult<Vec<String>>;

    /// Insert an OPEN pull request stamped with the current time
    async fn insert_pull_request(&mut self, pull_request: &CreatePullRequest)
        -> StorageResult<()>;

    async fn select_pull_request(&mut self, pull_request_id: &str)
        -> StorageResult<Option<PullRequest>>;

    async fn insert_reviewer(&mut self, pull_request_id: &str, reviewer_id: &str)
        -> StorageResult<()>;

    /// Remove one assignment; `false` when the pair was not present
    async fn delete_reviewer(&mut self, pull_request_id: &str, reviewer_id: &str)
        -> StorageResult<bool>;

    /// Current reviewer ids of a pull request in assignment order
    async fn select_reviewers(&mut self, pull_request_id: &str) -> StorageResult<Vec<String>>;

    /// Pull requests the user currently reviews, ordered by pull request id
    async fn select_user_reviews(&mut self, user_id: &str)
        -> StorageResult<Vec<PullRequestShort>>;

    async fn commit(self) -> StorageResult<()>;

    async fn rollback(self) -> StorageResult<()>;
}
