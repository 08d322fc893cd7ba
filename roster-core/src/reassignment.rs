//! Reviewer reassignment
//!
//! Replaces one reviewer on one pull request with a teammate who is neither
//! the author, the reviewer being replaced, nor already assigned. The swap
//! (delete old pair, insert new pair) happens inside the caller's
//! transaction; the engine never begins or commits one itself, which lets
//! the deactivation cascade fold many swaps into a single unit.

use std::collections::HashSet;

use crate::error::ServiceError;
use crate::selector::EligibilitySelector;
use crate::storage::StorageTx;

/// Swaps a reviewer for an eligible teammate
#[derive(Debug, Clone)]
pub struct ReassignmentEngine {
    selector: EligibilitySelector,
}

impl ReassignmentEngine {
    pub fn new(selector: EligibilitySelector) -> Self {
        Self { selector }
    }

    /// Replace `old_reviewer_id` on `pull_request_id`.
    ///
    /// Candidates come from `team_name` excluding the author, so the old
    /// reviewer can show up among them and is skipped here. Returns the new
    /// reviewer, or `None` without writing anything when nobody qualifies.
    ///
    /// The pull request is re-read inside the transaction: a merged pull
    /// request yields [`ServiceError::PrMerged`] even if the caller checked
    /// its status earlier.
    pub async fn reassign<T: StorageTx>(
        &self,
        tx: &mut T,
        pull_request_id: &str,
        old_reviewer_id: &str,
        author_id: &str,
        team_name: &str,
    ) -> Result<Option<String>, ServiceError> {
        let pull_request = tx
            .select_pull_request(pull_request_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("pull request not found".into()))?;
        if pull_request.is_merged() {
            return Err(ServiceError::PrMerged);
        }

        let candidates = self
            .selector
            .find_candidates(tx, team_name, author_id)
            .await?;
        let current: HashSet<String> = tx
            .select_reviewers(pull_request_id)
            .await?
            .into_iter()
            .collect();

        let Some(replacement) = candidates
            .into_iter()
            .find(|candidate| candidate != old_reviewer_id && !current.contains(candidate))
        else {
            tracing::debug!(
                pull_request_id,
                old_reviewer_id,
                "No replacement reviewer available"
            );
            return Ok(None);
        };

        tx.delete_reviewer(pull_request_id, old_reviewer_id).await?;
        tx.insert_reviewer(pull_request_id, &replacement).await?;

        tracing::info!(
            pull_request_id,
            old_reviewer_id,
            new_reviewer_id = %replacement,
            "Reassigned reviewer"
        );
        Ok(Some(replacement))
    }
}
