//! Initial reviewer assignment for a new pull request

use crate::error::ServiceError;
use crate::models::User;
use crate::selector::EligibilitySelector;
use crate::storage::StorageTx;

/// Picks the first reviewers for a freshly inserted pull request
#[derive(Debug, Clone)]
pub struct AssignmentEngine {
    selector: EligibilitySelector,
    reviewers_per_pull_request: usize,
}

impl AssignmentEngine {
    pub fn new(selector: EligibilitySelector, reviewers_per_pull_request: usize) -> Self {
        Self {
            selector,
            reviewers_per_pull_request,
        }
    }

    /// Assign up to `reviewers_per_pull_request` teammates of `author`.
    ///
    /// Must run in the transaction that inserted the pull request. Fewer
    /// candidates than the cap (including none at all) is a valid outcome.
    /// Any write failure is returned so the caller rolls back the creation.
    pub async fn assign<T: StorageTx>(
        &self,
        tx: &mut T,
        pull_request_id: &str,
        author: &User,
    ) -> Result<Vec<String>, ServiceError> {
        let mut reviewers = self
            .selector
            .find_candidates(tx, &author.team_name, &author.id)
            .await?;
        reviewers.truncate(self.reviewers_per_pull_request);

        for reviewer_id in &reviewers {
            tx.insert_reviewer(pull_request_id, reviewer_id).await?;
        }

        tracing::info!(
            pull_request_id,
            author_id = %author.id,
            reviewers = ?reviewers,
            "Assigned reviewers"
        );
        Ok(reviewers)
    }
}
