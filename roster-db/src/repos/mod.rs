//! Query modules
//!
//! Every query takes a `&mut SqliteConnection` so the same SQL serves pooled
//! reads and statements inside a transaction.

pub(crate) mod pull_requests;
pub(crate) mod reviewers;
pub(crate) mod stats;
pub(crate) mod teams;
pub(crate) mod users;
