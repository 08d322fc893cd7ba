//! Aggregate counts for the statistics reads

use roster_core::{
    PullRequestStats, ReviewerLoad, ReviewerStats, StorageResult, TeamUserCount, UserStats,
};
use sqlx::SqliteConnection;

use crate::error::classify;

pub(crate) async fn users(conn: &mut SqliteConnection) -> StorageResult<UserStats> {
    let (total, active): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(SUM(CASE WHEN is_active = 1 THEN 1 ELSE 0 END), 0) FROM users",
    )
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| classify("count users", e))?;

    let by_team: Vec<(String, i64)> = sqlx::query_as(
        "SELECT team_name, COUNT(*) FROM users GROUP BY team_name ORDER BY team_name",
    )
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| classify("count users by team", e))?;

    Ok(UserStats {
        total_users: total as u64,
        active_users: active as u64,
        inactive_users: (total - active) as u64,
        users_by_team: by_team
            .into_iter()
            .map(|(team_name, count)| TeamUserCount {
                team_name,
                users_count: count as u64,
            })
            .collect(),
    })
}

pub(crate) async fn pull_requests(conn: &mut SqliteConnection) -> StorageResult<PullRequestStats> {
    let (total, merged): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(SUM(CASE WHEN status = 'MERGED' THEN 1 ELSE 0 END), 0) FROM pull_requests",
    )
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| classify("count pull requests", e))?;

    Ok(PullRequestStats {
        total_prs: total as u64,
        open_prs: (total - merged) as u64,
        merged_prs: merged as u64,
    })
}

/// Review load of active users; at most `limit` entries in `top_reviewers`
pub(crate) async fn reviewers(
    conn: &mut SqliteConnection,
    limit: usize,
) -> StorageResult<ReviewerStats> {
    let rows: Vec<(String, String, i64)> = sqlx::query_as(
        r#"
        SELECT u.user_id, u.username, COUNT(r.reviewer_id) AS review_count
        FROM users u
        LEFT JOIN pr_reviewers r ON r.reviewer_id = u.user_id
        WHERE u.is_active = 1
        GROUP BY u.user_id, u.username
        ORDER BY review_count DESC, u.user_id
        "#,
    )
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| classify("count reviews", e))?;

    let (busy, idle): (Vec<_>, Vec<_>) = rows.into_iter().partition(|(_, _, count)| *count > 0);

    let top_reviewers = busy
        .into_iter()
        .take(limit)
        .map(|(user_id, username, count)| ReviewerLoad {
            user_id,
            username,
            review_count: count as u64,
        })
        .collect();
    let mut users_without_reviews: Vec<String> =
        idle.into_iter().map(|(user_id, _, _)| user_id).collect();
    users_without_reviews.sort();

    Ok(ReviewerStats {
        top_reviewers,
        users_without_reviews,
    })
}
