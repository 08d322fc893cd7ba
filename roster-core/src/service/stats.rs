use super::ReviewService;
use crate::error::ErrorDetails;
use crate::models::{PullRequestStats, ReviewerStats, UserStats};
use crate::storage::Storage;

/// Size of the busiest-reviewers list
const TOP_REVIEWERS: usize = 10;

impl<S: Storage> ReviewService<S> {
    pub async fn user_stats(&self) -> Result<UserStats, ErrorDetails> {
        self.run("user_stats", async { Ok(self.storage.select_user_stats().await?) })
            .await
    }

    pub async fn pull_request_stats(&self) -> Result<PullRequestStats, ErrorDetails> {
        self.run("pull_request_stats", async {
            Ok(self.storage.select_pull_request_stats().await?)
        })
        .await
    }

    /// Review load of active users
    pub async fn reviewer_stats(&self) -> Result<ReviewerStats, ErrorDetails> {
        self.run("reviewer_stats", async {
            Ok(self.storage.select_reviewer_stats(TOP_REVIEWERS).await?)
        })
        .await
    }
}
