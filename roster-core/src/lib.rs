//! Roster Core - reviewer assignment engine for team-based code review
//!
//! This crate owns the rules for picking reviewers from the author's team,
//! swapping reviewers out when they become inactive, and the transactional
//! protocol that keeps every multi-record write atomic. Persistence is
//! consumed through the [`storage::Storage`] trait.

pub mod assignment;
pub mod cascade;
pub mod config;
pub mod error;
pub mod models;
pub mod reassignment;
pub mod selector;
pub mod service;
pub mod storage;

pub use assignment::AssignmentEngine;
pub use cascade::{CascadeReport, DeactivationCascade};
pub use config::{AssignmentConfig, Config, DatabaseSettings, ServiceConfig};
pub use error::{ConfigError, ErrorCode, ErrorDetails, ServiceError};
pub use models::{
    CreatePullRequest, PrStatus, PullRequest, PullRequestShort, PullRequestStats,
    Reassignment, ReassignReviewer, ReviewerLoad, ReviewerStats, SetUserActive, Team,
    TeamMember, TeamUserCount, User, UserStats,
};
pub use reassignment::ReassignmentEngine;
pub use selector::{CandidateOrder, DeclaredOrder, EligibilitySelector, ShuffledOrder};
pub use service::ReviewService;
pub use storage::{Entity, PoolOrder, Storage, StorageError, StorageResult, StorageTx};
