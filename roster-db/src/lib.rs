//! Database layer for Roster
//!
//! SQLite persistence for teams, users, pull requests and reviewer
//! assignments, exposed through the [`roster_core::Storage`] trait.

pub mod db;
pub mod error;
mod repos;
pub mod storage;

pub use db::{Database, DatabaseConfig};
pub use error::{Error, Result};
pub use storage::{SqliteStorage, SqliteTx};
