//! Transaction plumbing shared by the mutating operations

use std::future::Future;
use std::pin::Pin;

use super::ReviewService;
use crate::error::ServiceError;
use crate::storage::{Storage, StorageTx};

/// Unit of work run against an open transaction.
///
/// The transaction is handed back alongside the result so the caller can
/// commit or roll it back.
pub(super) type TxFuture<'a, T, R> =
    Pin<Box<dyn Future<Output = (T, Result<R, ServiceError>)> + Send + 'a>>;

impl<S: Storage> ReviewService<S> {
    /// Run `work` in a fresh transaction, committing on success.
    ///
    /// A storage conflict anywhere in the unit, commit included, discards
    /// the transaction and runs `work` again on a new one, up to
    /// `max_conflict_retries` extra attempts.
    pub(super) async fn in_transaction<'a, R, F>(
        &'a self,
        operation: &'static str,
        mut work: F,
    ) -> Result<R, ServiceError>
    where
        R: Send,
        F: FnMut(S::Tx) -> TxFuture<'a, S::Tx, R>,
    {
        let mut attempt: u32 = 0;
        loop {
            let outcome = match self.storage.begin().await {
                Ok(tx) => {
                    let (tx, result) = work(tx).await;
                    finish(operation, tx, result).await
                }
                Err(err) => Err(err.into()),
            };

            match outcome {
                Err(err) if err.is_conflict() && attempt < self.settings.max_conflict_retries => {
                    attempt += 1;
                    let backoff = self.settings.conflict_backoff * attempt;
                    tracing::warn!(
                        operation,
                        attempt,
                        backoff = ?backoff,
                        error = %err,
                        "Write conflict, retrying transaction"
                    );
                    tokio::time::sleep(backoff).await;
                }
                other => return other,
            }
        }
    }
}

async fn finish<T: StorageTx, R>(
    operation: &'static str,
    tx: T,
    result: Result<R, ServiceError>,
) -> Result<R, ServiceError> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::error!(
                    operation,
                    error = %rollback_err,
                    "Failed to roll back transaction"
                );
            }
            Err(err)
        }
    }
}
