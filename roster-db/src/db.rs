//! Database connection and configuration

use std::path::PathBuf;
use std::time::Duration;

use roster_core::DatabaseSettings;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::ConnectOptions;

use crate::error::{Error, Result};
use crate::storage::SqliteStorage;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Path to SQLite database file
    pub path: PathBuf,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// How long a connection waits on a locked database
    pub busy_timeout: Duration,
}

impl DatabaseConfig {
    /// Create a new database config with the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let defaults = DatabaseSettings::default();
        Self {
            path: path.into(),
            max_connections: defaults.max_connections,
            busy_timeout: defaults.busy_timeout,
        }
    }

    /// Build from the `[database]` config section
    pub fn from_settings(settings: &DatabaseSettings) -> Result<Self> {
        let path = settings.resolved_path().ok_or_else(|| {
            Error::InvalidConfig("could not determine cache directory".to_string())
        })?;
        Ok(Self {
            path,
            max_connections: settings.max_connections,
            busy_timeout: settings.busy_timeout,
        })
    }
}

/// Database connection pool
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open the database, creating it if needed, and apply pending migrations
    pub async fn connect(config: DatabaseConfig) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = config.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(config.busy_timeout)
            .disable_statement_logging();

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        tracing::debug!(path = %config.path.display(), "Opened database");
        Ok(Self { pool })
    }

    /// Storage adapter sharing this pool
    pub fn storage(&self) -> SqliteStorage {
        SqliteStorage::new(self.pool.clone())
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection
    pub async fn close(self) {
        self.pool.close().await;
    }
}
