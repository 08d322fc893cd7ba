//! In-memory implementation of `Storage` used by the engine and service tests.
//!
//! Transactions take the table lock for their whole lifetime and work on a
//! copy of the tables, so concurrent transactions serialize and a dropped or
//! rolled back transaction leaves no trace. Constraint checks mirror the
//! SQLite schema. Fault hooks let tests fail a chosen write, report lock
//! conflicts, or slow writes down.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rand::seq::SliceRandom;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{Entity, PoolOrder, Storage, StorageError, StorageResult, StorageTx};
use crate::models::{
    CreatePullRequest, PrStatus, PullRequest, PullRequestShort, PullRequestStats,
    ReviewerLoad, ReviewerStats, Team, TeamMember, TeamUserCount, User, UserStats,
};

#[derive(Debug, Clone, Default)]
struct Tables {
    teams: Vec<String>,
    users: Vec<User>,
    /// Stored with an empty reviewer list; reviewers live in `reviewers`
    pull_requests: Vec<PullRequest>,
    /// (pull request id, reviewer id) in assignment order
    reviewers: Vec<(String, String)>,
}

impl Tables {
    fn team(&self, team_name: &str) -> Option<Team> {
        if !self.teams.iter().any(|t| t == team_name) {
            return None;
        }
        let members = self
            .users
            .iter()
            .filter(|u| u.team_name == team_name)
            .map(|u| TeamMember {
                id: u.id.clone(),
                username: u.username.clone(),
                is_active: u.is_active,
            })
            .collect();
        Some(Team::new(team_name, members))
    }

    fn user(&self, user_id: &str) -> Option<User> {
        self.users.iter().find(|u| u.id == user_id).cloned()
    }

    fn reviewers_of(&self, pull_request_id: &str) -> Vec<String> {
        self.reviewers
            .iter()
            .filter(|(pr, _)| pr == pull_request_id)
            .map(|(_, reviewer)| reviewer.clone())
            .collect()
    }

    fn pull_request(&self, pull_request_id: &str) -> Option<PullRequest> {
        self.pull_requests
            .iter()
            .find(|pr| pr.id == pull_request_id)
            .map(|pr| PullRequest {
                assigned_reviewers: self.reviewers_of(&pr.id),
                ..pr.clone()
            })
    }

    fn user_reviews(&self, user_id: &str) -> Vec<PullRequestShort> {
        let mut reviews: Vec<PullRequestShort> = self
            .pull_requests
            .iter()
            .filter(|pr| {
                self.reviewers
                    .iter()
                    .any(|(p, r)| *p == pr.id && r == user_id)
            })
            .map(|pr| PullRequestShort {
                id: pr.id.clone(),
                name: pr.name.clone(),
                author_id: pr.author_id.clone(),
                status: pr.status,
            })
            .collect();
        reviews.sort_by(|a, b| a.id.cmp(&b.id));
        reviews
    }
}

#[derive(Debug, Default)]
struct Faults {
    deletes_seen: AtomicUsize,
    /// 1-based index of the reviewer delete that fails; 0 disables
    fail_delete_at: AtomicUsize,
    /// Number of upcoming `begin` calls that report a conflict
    begin_conflicts: AtomicUsize,
    write_delay_ms: AtomicU64,
}

impl Faults {
    async fn before_write(&self) {
        let delay = self.write_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
    }
}

/// Shared in-memory tables
#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryStorage {
    tables: Arc<Mutex<Tables>>,
    faults: Arc<Faults>,
}

impl MemoryStorage {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Fail the `nth` reviewer delete (counted from now, 1-based)
    pub(crate) fn fail_reviewer_delete_at(&self, nth: usize) {
        self.faults.deletes_seen.store(0, Ordering::SeqCst);
        self.faults.fail_delete_at.store(nth, Ordering::SeqCst);
    }

    /// Report a conflict from the next `count` calls to `begin`
    pub(crate) fn conflict_on_begin(&self, count: usize) {
        self.faults.begin_conflicts.store(count, Ordering::SeqCst);
    }

    /// Sleep before every transactional write
    pub(crate) fn delay_writes(&self, delay: Duration) {
        self.faults
            .write_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// Number of reviewer deletes attempted since the last fault reset
    pub(crate) fn reviewer_deletes_seen(&self) -> usize {
        self.faults.deletes_seen.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    type Tx = MemoryTx;

    async fn begin(&self) -> StorageResult<MemoryTx> {
        let pending = self.faults.begin_conflicts.load(Ordering::SeqCst);
        if pending > 0 {
            self.faults.begin_conflicts.store(pending - 1, Ordering::SeqCst);
            return Err(StorageError::Conflict("database is locked".into()));
        }

        let guard = self.tables.clone().lock_owned().await;
        let working = guard.clone();
        Ok(MemoryTx {
            guard,
            working,
            faults: self.faults.clone(),
        })
    }

    async fn select_team(&self, team_name: &str) -> StorageResult<Option<Team>> {
        Ok(self.tables.lock().await.team(team_name))
    }

    async fn select_user(&self, user_id: &str) -> StorageResult<Option<User>> {
        Ok(self.tables.lock().await.user(user_id))
    }

    async fn select_pull_request(
        &self,
        pull_request_id: &str,
    ) -> StorageResult<Option<PullRequest>> {
        Ok(self.tables.lock().await.pull_request(pull_request_id))
    }

    async fn select_user_reviews(&self, user_id: &str) -> StorageResult<Vec<PullRequestShort>> {
        Ok(self.tables.lock().await.user_reviews(user_id))
    }

    async fn mark_pull_request_merged(&self, pull_request_id: &str) -> StorageResult<bool> {
        let mut tables = self.tables.lock().await;
        match tables
            .pull_requests
            .iter_mut()
            .find(|pr| pr.id == pull_request_id && pr.status == PrStatus::Open)
        {
            Some(pr) => {
                pr.status = PrStatus::Merged;
                pr.merged_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn select_user_stats(&self) -> StorageResult<UserStats> {
        let tables = self.tables.lock().await;
        let active = tables.users.iter().filter(|u| u.is_active).count() as u64;
        let mut teams: Vec<String> = tables.users.iter().map(|u| u.team_name.clone()).collect();
        teams.sort();
        teams.dedup();
        let users_by_team = teams
            .into_iter()
            .map(|team_name| TeamUserCount {
                users_count: tables
                    .users
                    .iter()
                    .filter(|u| u.team_name == team_name)
                    .count() as u64,
                team_name,
            })
            .collect();
        Ok(UserStats {
            total_users: tables.users.len() as u64,
            active_users: active,
            inactive_users: tables.users.len() as u64 - active,
            users_by_team,
        })
    }

    async fn select_pull_request_stats(&self) -> StorageResult<PullRequestStats> {
        let tables = self.tables.lock().await;
        let merged = tables
            .pull_requests
            .iter()
            .filter(|pr| pr.status == PrStatus::Merged)
            .count() as u64;
        let total = tables.pull_requests.len() as u64;
        Ok(PullRequestStats {
            total_prs: total,
            open_prs: total - merged,
            merged_prs: merged,
        })
    }

    async fn select_reviewer_stats(&self, limit: usize) -> StorageResult<ReviewerStats> {
        let tables = self.tables.lock().await;
        let mut loads: Vec<ReviewerLoad> = tables
            .users
            .iter()
            .filter(|u| u.is_active)
            .map(|u| ReviewerLoad {
                user_id: u.id.clone(),
                username: u.username.clone(),
                review_count: tables.reviewers.iter().filter(|(_, r)| *r == u.id).count()
                    as u64,
            })
            .collect();
        loads.sort_by(|a, b| {
            b.review_count
                .cmp(&a.review_count)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });

        let mut users_without_reviews: Vec<String> = loads
            .iter()
            .filter(|l| l.review_count == 0)
            .map(|l| l.user_id.clone())
            .collect();
        users_without_reviews.sort();

        let top_reviewers = loads
            .into_iter()
            .filter(|l| l.review_count > 0)
            .take(limit)
            .collect();

        Ok(ReviewerStats {
            top_reviewers,
            users_without_reviews,
        })
    }
}

/// Transaction over a private copy of the tables
pub(crate) struct MemoryTx {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
    faults: Arc<Faults>,
}

#[async_trait]
impl StorageTx for MemoryTx {
    async fn insert_team(&mut self, team_name: &str) -> StorageResult<()> {
        self.faults.before_write().await;
        if self.working.teams.iter().any(|t| t == team_name) {
            return Err(StorageError::UniqueViolation(Entity::Team));
        }
        self.working.teams.push(team_name.to_string());
        Ok(())
    }

    async fn insert_team_member(
        &mut self,
        team_name: &str,
        member: &TeamMember,
    ) -> StorageResult<()> {
        self.faults.before_write().await;
        if !self.working.teams.iter().any(|t| t == team_name) {
            return Err(StorageError::ForeignKeyViolation(format!("team {}", team_name)));
        }
        if self.working.user(&member.id).is_some() {
            return Err(StorageError::UniqueViolation(Entity::User));
        }
        self.working.users.push(User {
            id: member.id.clone(),
            username: member.username.clone(),
            team_name: team_name.to_string(),
            is_active: member.is_active,
        });
        Ok(())
    }

    async fn select_user(&mut self, user_id: &str) -> StorageResult<Option<User>> {
        Ok(self.working.user(user_id))
    }

    async fn update_user_active(&mut self, user_id: &str, is_active: bool) -> StorageResult<()> {
        self.faults.before_write().await;
        match self.working.users.iter_mut().find(|u| u.id == user_id) {
            Some(user) => {
                user.is_active = is_active;
                Ok(())
            }
            None => Err(StorageError::NotFound(format!("user {}", user_id))),
        }
    }

    async fn select_eligible_reviewers(
        &mut self,
        team_name: &str,
        exclude_user_id: &str,
        order: PoolOrder,
        limit: usize,
    ) -> StorageResult<Vec<String>> {
        let mut ids: Vec<String> = self
            .working
            .users
            .iter()
            .filter(|u| u.team_name == team_name && u.is_active && u.id != exclude_user_id)
            .map(|u| u.id.clone())
            .collect();
        match order {
            PoolOrder::Random => ids.shuffle(&mut rand::rng()),
            PoolOrder::ById => ids.sort(),
        }
        ids.truncate(limit);
        Ok(ids)
    }

    async fn insert_pull_request(&mut self, pull_request: &CreatePullRequest) -> StorageResult<()> {
        self.faults.before_write().await;
        if self.working.pull_request(&pull_request.id).is_some() {
            return Err(StorageError::UniqueViolation(Entity::PullRequest));
        }
        if self.working.user(&pull_request.author_id).is_none() {
            return Err(StorageError::ForeignKeyViolation(format!(
                "author {}",
                pull_request.author_id
            )));
        }
        self.working.pull_requests.push(PullRequest {
            id: pull_request.id.clone(),
            name: pull_request.name.clone(),
            author_id: pull_request.author_id.clone(),
            status: PrStatus::Open,
            assigned_reviewers: Vec::new(),
            created_at: Some(Utc::now()),
            merged_at: None,
        });
        Ok(())
    }

    async fn select_pull_request(
        &mut self,
        pull_request_id: &str,
    ) -> StorageResult<Option<PullRequest>> {
        Ok(self.working.pull_request(pull_request_id))
    }

    async fn insert_reviewer(
        &mut self,
        pull_request_id: &str,
        reviewer_id: &str,
    ) -> StorageResult<()> {
        self.faults.before_write().await;
        if self.working.pull_request(pull_request_id).is_none() {
            return Err(StorageError::ForeignKeyViolation(format!(
                "pull request {}",
                pull_request_id
            )));
        }
        if self.working.user(reviewer_id).is_none() {
            return Err(StorageError::ForeignKeyViolation(format!("reviewer {}", reviewer_id)));
        }
        if self
            .working
            .reviewers
            .iter()
            .any(|(p, r)| p == pull_request_id && r == reviewer_id)
        {
            return Err(StorageError::UniqueViolation(Entity::ReviewerAssignment));
        }
        self.working
            .reviewers
            .push((pull_request_id.to_string(), reviewer_id.to_string()));
        Ok(())
    }

    async fn delete_reviewer(
        &mut self,
        pull_request_id: &str,
        reviewer_id: &str,
    ) -> StorageResult<bool> {
        self.faults.before_write().await;
        let seen = self.faults.deletes_seen.fetch_add(1, Ordering::SeqCst) + 1;
        if self.faults.fail_delete_at.load(Ordering::SeqCst) == seen {
            return Err(StorageError::Backend("injected reviewer delete failure".into()));
        }

        let before = self.working.reviewers.len();
        self.working
            .reviewers
            .retain(|(p, r)| !(p == pull_request_id && r == reviewer_id));
        Ok(self.working.reviewers.len() != before)
    }

    async fn select_reviewers(&mut self, pull_request_id: &str) -> StorageResult<Vec<String>> {
        Ok(self.working.reviewers_of(pull_request_id))
    }

    async fn select_user_reviews(&mut self, user_id: &str) -> StorageResult<Vec<PullRequestShort>> {
        Ok(self.working.user_reviews(user_id))
    }

    async fn commit(self) -> StorageResult<()> {
        let MemoryTx {
            mut guard, working, ..
        } = self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self) -> StorageResult<()> {
        Ok(())
    }
}
