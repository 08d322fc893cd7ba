//! `Storage` implementation over a SQLite pool

use async_trait::async_trait;
use roster_core::{
    CreatePullRequest, PoolOrder, PullRequest, PullRequestShort, PullRequestStats, ReviewerStats,
    Storage, StorageResult, StorageTx, Team, TeamMember, User, UserStats,
};
use sqlx::pool::PoolConnection;
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::error::classify;
use crate::repos::{pull_requests, reviewers, stats, teams, users};

/// Pool-backed storage adapter
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn connection(&self) -> StorageResult<PoolConnection<Sqlite>> {
        self.pool
            .acquire()
            .await
            .map_err(|e| classify("acquire connection", e))
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    type Tx = SqliteTx;

    /// Takes the write lock up front. A deferred transaction that reads and
    /// then writes fails with SQLITE_BUSY on upgrade instead of waiting out
    /// the busy timeout.
    async fn begin(&self) -> StorageResult<SqliteTx> {
        let tx = self
            .pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(|e| classify("begin transaction", e))?;
        Ok(SqliteTx { tx })
    }

    async fn select_team(&self, team_name: &str) -> StorageResult<Option<Team>> {
        let mut conn = self.connection().await?;
        teams::select(&mut conn, team_name).await
    }

    async fn select_user(&self, user_id: &str) -> StorageResult<Option<User>> {
        let mut conn = self.connection().await?;
        users::select(&mut conn, user_id).await
    }

    async fn select_pull_request(
        &self,
        pull_request_id: &str,
    ) -> StorageResult<Option<PullRequest>> {
        let mut conn = self.connection().await?;
        pull_requests::select(&mut conn, pull_request_id).await
    }

    async fn select_user_reviews(&self, user_id: &str) -> StorageResult<Vec<PullRequestShort>> {
        let mut conn = self.connection().await?;
        pull_requests::select_reviewed_by(&mut conn, user_id).await
    }

    async fn mark_pull_request_merged(&self, pull_request_id: &str) -> StorageResult<bool> {
        let mut conn = self.connection().await?;
        pull_requests::mark_merged(&mut conn, pull_request_id).await
    }

    async fn select_user_stats(&self) -> StorageResult<UserStats> {
        let mut conn = self.connection().await?;
        stats::users(&mut conn).await
    }

    async fn select_pull_request_stats(&self) -> StorageResult<PullRequestStats> {
        let mut conn = self.connection().await?;
        stats::pull_requests(&mut conn).await
    }

    async fn select_reviewer_stats(&self, limit: usize) -> StorageResult<ReviewerStats> {
        let mut conn = self.connection().await?;
        stats::reviewers(&mut conn, limit).await
    }
}

/// Open SQLite transaction; rolled back by sqlx when dropped uncommitted
pub struct SqliteTx {
    tx: Transaction<'static, Sqlite>,
}

#[async_trait]
impl StorageTx for SqliteTx {
    async fn insert_team(&mut self, team_name: &str) -> StorageResult<()> {
        teams::insert(&mut self.tx, team_name).await
    }

    async fn insert_team_member(
        &mut self,
        team_name: &str,
        member: &TeamMember,
    ) -> StorageResult<()> {
        teams::insert_member(&mut self.tx, team_name, member).await
    }

    async fn select_user(&mut self, user_id: &str) -> StorageResult<Option<User>> {
        users::select(&mut self.tx, user_id).await
    }

    async fn update_user_active(&mut self, user_id: &str, is_active: bool) -> StorageResult<()> {
        users::update_active(&mut self.tx, user_id, is_active).await
    }

    async fn select_eligible_reviewers(
        &mut self,
        team_name: &str,
        exclude_user_id: &str,
        order: PoolOrder,
        limit: usize,
    ) -> StorageResult<Vec<String>> {
        users::select_eligible(&mut self.tx, team_name, exclude_user_id, order, limit).await
    }

    async fn insert_pull_request(&mut self, pull_request: &CreatePullRequest) -> StorageResult<()> {
        pull_requests::insert(&mut self.tx, pull_request).await
    }

    async fn select_pull_request(
        &mut self,
        pull_request_id: &str,
    ) -> StorageResult<Option<PullRequest>> {
        pull_requests::select(&mut self.tx, pull_request_id).await
    }

    async fn insert_reviewer(
        &mut self,
        pull_request_id: &str,
        reviewer_id: &str,
    ) -> StorageResult<()> {
        reviewers::insert(&mut self.tx, pull_request_id, reviewer_id).await
    }

    async fn delete_reviewer(
        &mut self,
        pull_request_id: &str,
        reviewer_id: &str,
    ) -> StorageResult<bool> {
        reviewers::delete(&mut self.tx, pull_request_id, reviewer_id).await
    }

    async fn select_reviewers(&mut self, pull_request_id: &str) -> StorageResult<Vec<String>> {
        reviewers::select_for_pull_request(&mut self.tx, pull_request_id).await
    }

    async fn select_user_reviews(&mut self, user_id: &str) -> StorageResult<Vec<PullRequestShort>> {
        pull_requests::select_reviewed_by(&mut self.tx, user_id).await
    }

    async fn commit(self) -> StorageResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| classify("commit transaction", e))
    }

    async fn rollback(self) -> StorageResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| classify("rollback transaction", e))
    }
}
