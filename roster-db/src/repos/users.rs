//! User queries

use roster_core::{PoolOrder, StorageError, StorageResult, User};
use sqlx::SqliteConnection;

use crate::error::classify;

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: String,
    username: String,
    team_name: String,
    is_active: bool,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.user_id,
            username: row.username,
            team_name: row.team_name,
            is_active: row.is_active,
        }
    }
}

pub(crate) async fn select(conn: &mut SqliteConnection, user_id: &str) -> StorageResult<Option<User>> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT user_id, username, team_name, is_active FROM users WHERE user_id = ?",
    )
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| classify("select user", e))?;
    Ok(row.map(User::from))
}

pub(crate) async fn update_active(
    conn: &mut SqliteConnection,
    user_id: &str,
    is_active: bool,
) -> StorageResult<()> {
    let result = sqlx::query("UPDATE users SET is_active = ? WHERE user_id = ?")
        .bind(is_active)
        .bind(user_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| classify("update user active", e))?;

    if result.rows_affected() == 0 {
        return Err(StorageError::NotFound(format!("user {}", user_id)));
    }
    Ok(())
}

/// Up to `limit` active teammates other than `exclude_user_id`
pub(crate) async fn select_eligible(
    conn: &mut SqliteConnection,
    team_name: &str,
    exclude_user_id: &str,
    order: PoolOrder,
    limit: usize,
) -> StorageResult<Vec<String>> {
    let sql = match order {
        PoolOrder::Random => {
            r#"
            SELECT user_id FROM users
            WHERE team_name = ? AND is_active = 1 AND user_id != ?
            ORDER BY RANDOM()
            LIMIT ?
            "#
        }
        PoolOrder::ById => {
            r#"
            SELECT user_id FROM users
            WHERE team_name = ? AND is_active = 1 AND user_id != ?
            ORDER BY user_id
            LIMIT ?
            "#
        }
    };
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);

    let rows: Vec<(String,)> = sqlx::query_as(sql)
        .bind(team_name)
        .bind(exclude_user_id)
        .bind(limit)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| classify("select eligible reviewers", e))?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}
