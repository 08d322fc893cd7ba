//! Team and membership queries

use roster_core::{Entity, StorageResult, Team, TeamMember};
use sqlx::SqliteConnection;

use crate::error::{classify, classify_insert};

#[derive(sqlx::FromRow)]
struct MemberRow {
    user_id: String,
    username: String,
    is_active: bool,
}

pub(crate) async fn insert(conn: &mut SqliteConnection, team_name: &str) -> StorageResult<()> {
    sqlx::query("INSERT INTO teams (team_name) VALUES (?)")
        .bind(team_name)
        .execute(&mut *conn)
        .await
        .map_err(|e| classify_insert(Entity::Team, "insert team", e))?;
    Ok(())
}

pub(crate) async fn insert_member(
    conn: &mut SqliteConnection,
    team_name: &str,
    member: &TeamMember,
) -> StorageResult<()> {
    sqlx::query("INSERT INTO users (user_id, username, team_name, is_active) VALUES (?, ?, ?, ?)")
        .bind(&member.id)
        .bind(&member.username)
        .bind(team_name)
        .bind(member.is_active)
        .execute(&mut *conn)
        .await
        .map_err(|e| classify_insert(Entity::User, "insert team member", e))?;
    Ok(())
}

/// Team with members in registration order; `None` when the team is unknown
pub(crate) async fn select(
    conn: &mut SqliteConnection,
    team_name: &str,
) -> StorageResult<Option<Team>> {
    let exists: Option<(String,)> = sqlx::query_as("SELECT team_name FROM teams WHERE team_name = ?")
        .bind(team_name)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| classify("select team", e))?;
    if exists.is_none() {
        return Ok(None);
    }

    let members = sqlx::query_as::<_, MemberRow>(
        "SELECT user_id, username, is_active FROM users WHERE team_name = ? ORDER BY rowid",
    )
    .bind(team_name)
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| classify("select team members", e))?
    .into_iter()
    .map(|row| TeamMember {
        id: row.user_id,
        username: row.username,
        is_active: row.is_active,
    })
    .collect();

    Ok(Some(Team::new(team_name, members)))
}
