//! Deactivation cascade
//!
//! When a user goes inactive, every open pull request they review gets a
//! replacement reviewer, or loses that reviewer when no teammate qualifies.
//! Everything runs inside the transaction that flipped the active flag, so
//! a failure on any pull request undoes the whole deactivation.

use crate::error::ServiceError;
use crate::models::{PrStatus, User};
use crate::reassignment::ReassignmentEngine;
use crate::storage::StorageTx;

/// What a deactivation did to the user's review assignments
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CascadeReport {
    /// (pull request id, new reviewer id)
    pub replaced: Vec<(String, String)>,
    /// Pull requests that lost the reviewer without replacement
    pub unassigned: Vec<String>,
    /// Merged pull requests left untouched
    pub skipped_merged: Vec<String>,
}

impl CascadeReport {
    pub fn is_empty(&self) -> bool {
        self.replaced.is_empty() && self.unassigned.is_empty() && self.skipped_merged.is_empty()
    }
}

/// Moves a deactivated user's open reviews to teammates
#[derive(Debug, Clone)]
pub struct DeactivationCascade {
    reassignment: ReassignmentEngine,
}

impl DeactivationCascade {
    pub fn new(reassignment: ReassignmentEngine) -> Self {
        Self { reassignment }
    }

    /// Release every open review held by `user`.
    ///
    /// `tx` must be the transaction that marked the user inactive. The first
    /// error aborts the walk and is returned as is; the caller rolls back.
    pub async fn on_deactivate<T: StorageTx>(
        &self,
        tx: &mut T,
        user: &User,
    ) -> Result<CascadeReport, ServiceError> {
        let reviews = tx.select_user_reviews(&user.id).await?;
        let mut report = CascadeReport::default();

        for pull_request in reviews {
            if pull_request.status == PrStatus::Merged {
                report.skipped_merged.push(pull_request.id);
                continue;
            }

            let replacement = self
                .reassignment
                .reassign(
                    tx,
                    &pull_request.id,
                    &user.id,
                    &pull_request.author_id,
                    &user.team_name,
                )
                .await?;

            match replacement {
                Some(new_reviewer) => report.replaced.push((pull_request.id, new_reviewer)),
                None => {
                    tx.delete_reviewer(&pull_request.id, &user.id).await?;
                    tracing::info!(
                        pull_request_id = %pull_request.id,
                        user_id = %user.id,
                        "Removed reviewer without replacement"
                    );
                    report.unassigned.push(pull_request.id);
                }
            }
        }

        Ok(report)
    }
}
