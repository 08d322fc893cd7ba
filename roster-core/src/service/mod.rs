//! Review service
//!
//! Validates requests, runs the engines inside storage transactions and
//! translates every failure into an [`ErrorDetails`]. This is the only
//! layer that logs errors; the engines just propagate them.

mod pull_requests;
mod stats;
mod teams;
mod transaction;
mod users;

#[cfg(test)]
mod fixtures;

use std::future::Future;
use std::sync::Arc;

use crate::assignment::AssignmentEngine;
use crate::cascade::DeactivationCascade;
use crate::config::{Config, ServiceConfig};
use crate::error::{ErrorDetails, ServiceError};
use crate::reassignment::ReassignmentEngine;
use crate::selector::{CandidateOrder, EligibilitySelector, ShuffledOrder};
use crate::storage::Storage;

/// Entry point for every team, user and pull request operation
#[derive(Debug)]
pub struct ReviewService<S: Storage> {
    storage: S,
    assignment: AssignmentEngine,
    reassignment: ReassignmentEngine,
    cascade: DeactivationCascade,
    settings: ServiceConfig,
}

impl<S: Storage> ReviewService<S> {
    /// Service drawing reviewers in random order
    pub fn new(storage: S, config: &Config) -> Self {
        Self::with_order(storage, config, Arc::new(ShuffledOrder))
    }

    /// Service with an explicit candidate ordering policy
    pub fn with_order(storage: S, config: &Config, order: Arc<dyn CandidateOrder>) -> Self {
        let selector = EligibilitySelector::new(order, config.assignment.candidate_pool_limit);
        let reassignment = ReassignmentEngine::new(selector.clone());
        Self {
            storage,
            assignment: AssignmentEngine::new(
                selector,
                config.assignment.reviewers_per_pull_request,
            ),
            cascade: DeactivationCascade::new(reassignment.clone()),
            reassignment,
            settings: config.service.clone(),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Run one operation under the request deadline and translate its outcome.
    ///
    /// When the deadline fires the operation future is dropped, which drops
    /// any open transaction and so rolls it back.
    async fn run<T, F>(&self, operation: &'static str, work: F) -> Result<T, ErrorDetails>
    where
        F: Future<Output = Result<T, ServiceError>>,
    {
        let deadline = self.settings.request_timeout;
        let outcome = match tokio::time::timeout(deadline, work).await {
            Ok(result) => result,
            Err(_) => Err(ServiceError::DeadlineExceeded(deadline)),
        };
        outcome.map_err(|err| translate(operation, err))
    }
}

/// Log a failure at the level its tier calls for and strip it down for the caller
fn translate(operation: &'static str, err: ServiceError) -> ErrorDetails {
    let details = err.details();
    if err.is_technical() {
        tracing::error!(operation, error = %err, "Operation failed");
    } else {
        tracing::info!(operation, code = %details.code, error = %err, "Operation rejected");
    }
    details
}

/// Reject an empty required field the same way a missing record is rejected
fn require(value: &str, field: &str) -> Result<(), ServiceError> {
    if value.is_empty() {
        return Err(ServiceError::NotFound(format!("empty {}", field)));
    }
    Ok(())
}
