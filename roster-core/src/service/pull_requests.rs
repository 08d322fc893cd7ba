use super::{require, ReviewService};
use crate::error::{ErrorDetails, ServiceError};
use crate::models::{CreatePullRequest, PullRequest, ReassignReviewer, Reassignment};
use crate::storage::{Storage, StorageTx};

impl<S: Storage> ReviewService<S> {
    /// Open a pull request and assign its first reviewers atomically
    pub async fn create_pull_request(
        &self,
        request: CreatePullRequest,
    ) -> Result<PullRequest, ErrorDetails> {
        self.run("create_pull_request", async {
            require(&request.author_id, "author_id")?;
            require(&request.id, "pull_request_id")?;

            if self.storage.select_pull_request(&request.id).await?.is_some() {
                return Err(ServiceError::PrExists);
            }

            let request = &request;
            self.in_transaction("create_pull_request", move |mut tx| {
                let request = request.clone();
                Box::pin(async move {
                    let result = self.create_in_tx(&mut tx, &request).await;
                    (tx, result)
                })
            })
            .await?;

            self.load_pull_request(&request.id).await
        })
        .await
    }

    async fn create_in_tx(
        &self,
        tx: &mut S::Tx,
        request: &CreatePullRequest,
    ) -> Result<(), ServiceError> {
        let author = tx
            .select_user(&request.author_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("author not found".into()))?;
        tx.insert_pull_request(request).await?;
        self.assignment.assign(tx, &request.id, &author).await?;
        Ok(())
    }

    /// Mark a pull request merged; merging twice returns the same record
    pub async fn merge_pull_request(&self, pull_request_id: &str) -> Result<PullRequest, ErrorDetails> {
        self.run("merge_pull_request", async {
            require(pull_request_id, "pull_request_id")?;

            if self.storage.mark_pull_request_merged(pull_request_id).await? {
                tracing::info!(pull_request_id, "Merged pull request");
            }
            self.load_pull_request(pull_request_id).await
        })
        .await
    }

    /// Replace one reviewer of an open pull request with a teammate of theirs
    pub async fn reassign_reviewer(
        &self,
        request: ReassignReviewer,
    ) -> Result<Reassignment, ErrorDetails> {
        self.run("reassign_reviewer", async {
            require(&request.pull_request_id, "pull_request_id")?;
            require(&request.old_reviewer_id, "old_reviewer_id")?;

            let request = &request;
            let replaced_by = self
                .in_transaction("reassign_reviewer", move |mut tx| {
                    let request = request.clone();
                    Box::pin(async move {
                        let result = self.reassign_in_tx(&mut tx, &request).await;
                        (tx, result)
                    })
                })
                .await?;

            let pull_request = self.load_pull_request(&request.pull_request_id).await?;
            Ok(Reassignment {
                pull_request,
                replaced_by,
            })
        })
        .await
    }

    async fn reassign_in_tx(
        &self,
        tx: &mut S::Tx,
        request: &ReassignReviewer,
    ) -> Result<String, ServiceError> {
        let pull_request = tx
            .select_pull_request(&request.pull_request_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("pull request not found".into()))?;
        if pull_request.is_merged() {
            return Err(ServiceError::PrMerged);
        }
        if !pull_request.has_reviewer(&request.old_reviewer_id) {
            return Err(ServiceError::NotAssigned);
        }

        let reviewer = tx
            .select_user(&request.old_reviewer_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("reviewer not found".into()))?;

        self.reassignment
            .reassign(
                tx,
                &pull_request.id,
                &reviewer.id,
                &pull_request.author_id,
                &reviewer.team_name,
            )
            .await?
            .ok_or(ServiceError::NoCandidate)
    }

    async fn load_pull_request(&self, pull_request_id: &str) -> Result<PullRequest, ServiceError> {
        self.storage
            .select_pull_request(pull_request_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("pull request not found".into()))
    }
}
