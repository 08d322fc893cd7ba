//! Eligibility selector
//!
//! Produces the candidate reviewers for a team: active members other than
//! the excluded user, capped at the pool limit. The order of the result is
//! deliberately unstable in production so review load spreads across the
//! team; the ordering policy is a [`CandidateOrder`] so tests can pin it
//! down.

use std::fmt::Debug;
use std::sync::Arc;

use rand::seq::SliceRandom;

use crate::storage::{PoolOrder, StorageResult, StorageTx};

/// Ordering policy for eligible candidates
pub trait CandidateOrder: Send + Sync + Debug {
    /// Order storage draws the capped pool in
    fn pool_order(&self) -> PoolOrder;

    /// Reorder the drawn pool in place
    fn arrange(&self, candidates: &mut [String]);
}

/// Uniform random shuffle
#[derive(Debug, Clone, Copy, Default)]
pub struct ShuffledOrder;

impl CandidateOrder for ShuffledOrder {
    fn pool_order(&self) -> PoolOrder {
        PoolOrder::Random
    }

    fn arrange(&self, candidates: &mut [String]) {
        candidates.shuffle(&mut rand::rng());
    }
}

/// Ascending user id, stable across calls
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclaredOrder;

impl CandidateOrder for DeclaredOrder {
    fn pool_order(&self) -> PoolOrder {
        PoolOrder::ById
    }

    fn arrange(&self, _candidates: &mut [String]) {}
}

/// Finds reviewer candidates within a team
#[derive(Debug, Clone)]
pub struct EligibilitySelector {
    order: Arc<dyn CandidateOrder>,
    pool_limit: usize,
}

impl EligibilitySelector {
    /// Create a selector returning at most `pool_limit` candidates
    pub fn new(order: Arc<dyn CandidateOrder>, pool_limit: usize) -> Self {
        Self { order, pool_limit }
    }

    /// Active members of `team_name` other than `exclude_user_id`.
    ///
    /// Storage applies the cap after ordering, so with a random draw every
    /// eligible member can be picked even on teams larger than the pool.
    /// An empty result is not an error.
    pub async fn find_candidates<T: StorageTx>(
        &self,
        tx: &mut T,
        team_name: &str,
        exclude_user_id: &str,
    ) -> StorageResult<Vec<String>> {
        let mut candidates = tx
            .select_eligible_reviewers(
                team_name,
                exclude_user_id,
                self.order.pool_order(),
                self.pool_limit,
            )
            .await?;
        self.order.arrange(&mut candidates);

        tracing::debug!(
            team_name,
            exclude_user_id,
            candidates = ?candidates,
            "Selected reviewer candidates"
        );
        Ok(candidates)
    }
}
