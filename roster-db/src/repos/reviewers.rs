//! Reviewer assignment queries

use roster_core::{Entity, StorageResult};
use sqlx::SqliteConnection;

use crate::error::{classify, classify_insert};

pub(crate) async fn insert(
    conn: &mut SqliteConnection,
    pull_request_id: &str,
    reviewer_id: &str,
) -> StorageResult<()> {
    sqlx::query("INSERT INTO pr_reviewers (pull_request_id, reviewer_id) VALUES (?, ?)")
        .bind(pull_request_id)
        .bind(reviewer_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| classify_insert(Entity::ReviewerAssignment, "insert reviewer", e))?;
    Ok(())
}

pub(crate) async fn delete(
    conn: &mut SqliteConnection,
    pull_request_id: &str,
    reviewer_id: &str,
) -> StorageResult<bool> {
    let result =
        sqlx::query("DELETE FROM pr_reviewers WHERE pull_request_id = ? AND reviewer_id = ?")
            .bind(pull_request_id)
            .bind(reviewer_id)
            .execute(&mut *conn)
            .await
            .map_err(|e| classify("delete reviewer", e))?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn select_for_pull_request(
    conn: &mut SqliteConnection,
    pull_request_id: &str,
) -> StorageResult<Vec<String>> {
    let rows: Vec<(String,)> =
        sqlx::query_as("SELECT reviewer_id FROM pr_reviewers WHERE pull_request_id = ? ORDER BY rowid")
            .bind(pull_request_id)
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| classify("select reviewers", e))?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}
