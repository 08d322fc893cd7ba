//! Pull request queries

use chrono::{DateTime, Utc};
use roster_core::{
    CreatePullRequest, Entity, PrStatus, PullRequest, PullRequestShort, StorageError,
    StorageResult,
};
use sqlx::SqliteConnection;

use super::reviewers;
use crate::error::{classify, classify_insert};

#[derive(sqlx::FromRow)]
struct PullRequestRow {
    pull_request_id: String,
    pull_request_name: String,
    author_id: String,
    status: String,
    created_at: DateTime<Utc>,
    merged_at: Option<DateTime<Utc>>,
}

#[derive(sqlx::FromRow)]
struct ShortRow {
    pull_request_id: String,
    pull_request_name: String,
    author_id: String,
    status: String,
}

fn parse_status(raw: &str) -> StorageResult<PrStatus> {
    raw.parse()
        .map_err(|e: String| StorageError::backend("decode pull request status", e))
}

pub(crate) async fn insert(
    conn: &mut SqliteConnection,
    pull_request: &CreatePullRequest,
) -> StorageResult<()> {
    sqlx::query(
        r#"
        INSERT INTO pull_requests (pull_request_id, pull_request_name, author_id, status, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&pull_request.id)
    .bind(&pull_request.name)
    .bind(&pull_request.author_id)
    .bind(PrStatus::Open.as_str())
    .bind(Utc::now())
    .execute(&mut *conn)
    .await
    .map_err(|e| classify_insert(Entity::PullRequest, "insert pull request", e))?;
    Ok(())
}

/// Pull request with its reviewers in assignment order
pub(crate) async fn select(
    conn: &mut SqliteConnection,
    pull_request_id: &str,
) -> StorageResult<Option<PullRequest>> {
    let row = sqlx::query_as::<_, PullRequestRow>(
        r#"
        SELECT pull_request_id, pull_request_name, author_id, status, created_at, merged_at
        FROM pull_requests
        WHERE pull_request_id = ?
        "#,
    )
    .bind(pull_request_id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| classify("select pull request", e))?;

    let Some(row) = row else {
        return Ok(None);
    };
    let assigned_reviewers = reviewers::select_for_pull_request(conn, pull_request_id).await?;

    Ok(Some(PullRequest {
        status: parse_status(&row.status)?,
        id: row.pull_request_id,
        name: row.pull_request_name,
        author_id: row.author_id,
        assigned_reviewers,
        created_at: Some(row.created_at),
        merged_at: row.merged_at,
    }))
}

/// OPEN -> MERGED; `false` when nothing matched
pub(crate) async fn mark_merged(
    conn: &mut SqliteConnection,
    pull_request_id: &str,
) -> StorageResult<bool> {
    let result = sqlx::query(
        "UPDATE pull_requests SET status = ?, merged_at = ? WHERE pull_request_id = ? AND status = ?",
    )
    .bind(PrStatus::Merged.as_str())
    .bind(Utc::now())
    .bind(pull_request_id)
    .bind(PrStatus::Open.as_str())
    .execute(&mut *conn)
    .await
    .map_err(|e| classify("merge pull request", e))?;
    Ok(result.rows_affected() > 0)
}

/// Pull requests `user_id` reviews, ordered by pull request id
pub(crate) async fn select_reviewed_by(
    conn: &mut SqliteConnection,
    user_id: &str,
) -> StorageResult<Vec<PullRequestShort>> {
    let rows = sqlx::query_as::<_, ShortRow>(
        r#"
        SELECT p.pull_request_id, p.pull_request_name, p.author_id, p.status
        FROM pull_requests p
        JOIN pr_reviewers r ON r.pull_request_id = p.pull_request_id
        WHERE r.reviewer_id = ?
        ORDER BY p.pull_request_id
        "#,
    )
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| classify("select user reviews", e))?;

    rows.into_iter()
        .map(|row| {
            Ok(PullRequestShort {
                status: parse_status(&row.status)?,
                id: row.pull_request_id,
                name: row.pull_request_name,
                author_id: row.author_id,
            })
        })
        .collect()
}
