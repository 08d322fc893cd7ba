//! Error types for database operations

use roster_core::{Entity, StorageError};
use sqlx::error::DatabaseError;
use thiserror::Error;

/// Errors raised while opening or migrating the database
#[derive(Error, Debug)]
pub enum Error {
    /// SQLx database error
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No usable database location
    #[error("Invalid database configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for database operations
pub type Result<T> = std::result::Result<T, Error>;

/// SQLITE_BUSY and SQLITE_LOCKED; extended codes share the low byte
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

/// Map a driver error onto the storage taxonomy
pub(crate) fn classify(context: &str, err: sqlx::Error) -> StorageError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_foreign_key_violation() {
            return StorageError::ForeignKeyViolation(format!("{}: {}", context, db.message()));
        }
        if is_lock_contention(db.as_ref()) {
            return StorageError::Conflict(format!("{}: {}", context, db.message()));
        }
    }
    StorageError::backend(context, err)
}

/// Like [`classify`], reporting uniqueness violations against `entity`
pub(crate) fn classify_insert(entity: Entity, context: &str, err: sqlx::Error) -> StorageError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StorageError::UniqueViolation(entity)
        }
        _ => classify(context, err),
    }
}

fn is_lock_contention(db: &dyn DatabaseError) -> bool {
    db.code()
        .and_then(|code| code.parse::<i32>().ok())
        .map(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_errors_are_backend() {
        let err = classify("select user", sqlx::Error::RowNotFound);
        assert!(matches!(err, StorageError::Backend(ref msg) if msg.starts_with("select user")));

        let err = classify_insert(Entity::Team, "insert team", sqlx::Error::PoolTimedOut);
        assert!(matches!(err, StorageError::Backend(_)));
    }
}
