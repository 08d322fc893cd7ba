use super::{require, ReviewService};
use crate::cascade::CascadeReport;
use crate::error::{ErrorDetails, ServiceError};
use crate::models::{PullRequestShort, SetUserActive, User};
use crate::storage::{Storage, StorageTx};

impl<S: Storage> ReviewService<S> {
    /// Flip a user's active flag.
    ///
    /// Deactivation releases the user's open reviews in the same
    /// transaction, so either the flag and every reassignment land together
    /// or nothing changes.
    pub async fn set_user_active(&self, request: SetUserActive) -> Result<User, ErrorDetails> {
        self.run("set_user_active", async {
            require(&request.user_id, "user_id")?;

            let request = &request;
            let report = self
                .in_transaction("set_user_active", move |mut tx| {
                    let request = request.clone();
                    Box::pin(async move {
                        let result = self.update_active_in_tx(&mut tx, &request).await;
                        (tx, result)
                    })
                })
                .await?;

            if let Some(report) = report {
                tracing::info!(
                    user_id = %request.user_id,
                    replaced = ?report.replaced,
                    unassigned = ?report.unassigned,
                    skipped_merged = report.skipped_merged.len(),
                    "Deactivated user"
                );
            } else {
                tracing::info!(user_id = %request.user_id, "Activated user");
            }

            self.storage
                .select_user(&request.user_id)
                .await?
                .ok_or_else(|| ServiceError::NotFound("user not found".into()))
        })
        .await
    }

    async fn update_active_in_tx(
        &self,
        tx: &mut S::Tx,
        request: &SetUserActive,
    ) -> Result<Option<CascadeReport>, ServiceError> {
        tx.update_user_active(&request.user_id, request.is_active)
            .await?;
        if request.is_active {
            return Ok(None);
        }

        let user = tx
            .select_user(&request.user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("user not found".into()))?;
        let report = self.cascade.on_deactivate(tx, &user).await?;
        Ok(Some(report))
    }

    /// Pull requests the user currently reviews.
    ///
    /// An unknown user id yields an empty list rather than an error.
    pub async fn user_reviews(&self, user_id: &str) -> Result<Vec<PullRequestShort>, ErrorDetails> {
        self.run("user_reviews", async {
            require(user_id, "user_id")?;
            Ok(self.storage.select_user_reviews(user_id).await?)
        })
        .await
    }
}
