//! Configuration management for Roster
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (ROSTER_*)
//! 3. Config file (~/.config/roster/config.toml, or $ROSTER_CONFIG)
//! 4. Default values

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use humantime_serde::re::humantime;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Database connection settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// SQLite file; `None` means the per-user cache directory
    pub path: Option<PathBuf>,

    /// Upper bound on pooled connections
    pub max_connections: u32,

    /// How long SQLite waits on a locked database before reporting busy
    #[serde(with = "humantime_serde")]
    pub busy_timeout: Duration,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: None,
            max_connections: 5,
            busy_timeout: Duration::from_secs(5),
        }
    }
}

impl DatabaseSettings {
    /// Configured path, falling back to `~/.cache/roster/roster.db`
    pub fn resolved_path(&self) -> Option<PathBuf> {
        self.path
            .clone()
            .or_else(|| dirs::cache_dir().map(|p| p.join("roster").join("roster.db")))
    }
}

/// Reviewer selection knobs
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AssignmentConfig {
    /// Reviewers picked when a pull request is created
    pub reviewers_per_pull_request: usize,

    /// Candidates considered per selection, applied after shuffling
    pub candidate_pool_limit: usize,
}

impl Default for AssignmentConfig {
    fn default() -> Self {
        Self {
            reviewers_per_pull_request: 2,
            candidate_pool_limit: 10,
        }
    }
}

/// Request execution settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Deadline for one operation, transaction included
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,

    /// Extra attempts after a storage write conflict
    pub max_conflict_retries: u32,

    /// Base delay between conflict retries, multiplied by the attempt number
    #[serde(with = "humantime_serde")]
    pub conflict_backoff: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(5),
            max_conflict_retries: 3,
            conflict_backoff: Duration::from_millis(25),
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseSettings,
    pub assignment: AssignmentConfig,
    pub service: ServiceConfig,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_config_path() {
            Some(path) if path.exists() => Self::load_from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path
    ///
    /// `$ROSTER_CONFIG` when set, otherwise `~/.config/roster/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("ROSTER_CONFIG") {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|p| p.join("roster").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - ROSTER_DATABASE_PATH: SQLite file
    /// - ROSTER_REVIEWERS_PER_PR: reviewers picked per new pull request
    /// - ROSTER_CANDIDATE_POOL_LIMIT: candidates considered per selection
    /// - ROSTER_REQUEST_TIMEOUT: operation deadline, e.g. "5s"
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(path) = lookup("ROSTER_DATABASE_PATH") {
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(value) = lookup("ROSTER_REVIEWERS_PER_PR") {
            self.assignment.reviewers_per_pull_request =
                parse_value("ROSTER_REVIEWERS_PER_PR", &value)?;
        }

        if let Some(value) = lookup("ROSTER_CANDIDATE_POOL_LIMIT") {
            self.assignment.candidate_pool_limit =
                parse_value("ROSTER_CANDIDATE_POOL_LIMIT", &value)?;
        }

        if let Some(value) = lookup("ROSTER_REQUEST_TIMEOUT") {
            self.service.request_timeout =
                humantime::parse_duration(&value).map_err(|e| ConfigError::InvalidValue {
                    key: "ROSTER_REQUEST_TIMEOUT".to_string(),
                    reason: e.to_string(),
                })?;
        }

        self.validate()?;
        Ok(self)
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, database_path: Option<PathBuf>) -> Self {
        if let Some(path) = database_path {
            self.database.path = Some(path);
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(
        config_path: Option<PathBuf>,
        database_path: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let base = match config_path {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::load()?,
        };
        Ok(base.with_env_overrides()?.with_cli_overrides(database_path))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.assignment.candidate_pool_limit == 0 {
            return Err(ConfigError::InvalidValue {
                key: "assignment.candidate_pool_limit".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.service.request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "service.request_timeout".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.assignment.reviewers_per_pull_request, 2);
        assert_eq!(config.assignment.candidate_pool_limit, 10);
        assert_eq!(config.service.request_timeout, Duration::from_secs(5));
        assert_eq!(config.service.max_conflict_retries, 3);
        assert!(config.database.path.is_none());
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[database]
path = "/var/lib/roster/roster.db"
max_connections = 8
busy_timeout = "2s"

[assignment]
reviewers_per_pull_request = 3
candidate_pool_limit = 20

[service]
request_timeout = "750ms"
max_conflict_retries = 1
conflict_backoff = "10ms"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(
            config.database.path,
            Some(PathBuf::from("/var/lib/roster/roster.db"))
        );
        assert_eq!(config.database.max_connections, 8);
        assert_eq!(config.database.busy_timeout, Duration::from_secs(2));
        assert_eq!(config.assignment.reviewers_per_pull_request, 3);
        assert_eq!(config.assignment.candidate_pool_limit, 20);
        assert_eq!(config.service.request_timeout, Duration::from_millis(750));
        assert_eq!(config.service.conflict_backoff, Duration::from_millis(10));
    }

    #[test]
    fn test_partial_toml() {
        let toml = r#"
[assignment]
reviewers_per_pull_request = 1
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.assignment.reviewers_per_pull_request, 1);
        // Everything else keeps its default
        assert_eq!(config.assignment.candidate_pool_limit, 10);
        assert_eq!(config.service, ServiceConfig::default());
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::default()
            .with_overrides_from(env(&[
                ("ROSTER_DATABASE_PATH", "/tmp/r.db"),
                ("ROSTER_REVIEWERS_PER_PR", "4"),
                ("ROSTER_REQUEST_TIMEOUT", "2s 500ms"),
            ]))
            .unwrap();

        assert_eq!(config.database.path, Some(PathBuf::from("/tmp/r.db")));
        assert_eq!(config.assignment.reviewers_per_pull_request, 4);
        assert_eq!(config.service.request_timeout, Duration::from_millis(2500));
    }

    #[test]
    fn test_invalid_env_value() {
        let err = Config::default()
            .with_overrides_from(env(&[("ROSTER_CANDIDATE_POOL_LIMIT", "lots")]))
            .unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "ROSTER_CANDIDATE_POOL_LIMIT")
        );

        let err = Config::default()
            .with_overrides_from(env(&[("ROSTER_CANDIDATE_POOL_LIMIT", "0")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_cli_overrides_env() {
        let config = Config::default()
            .with_overrides_from(env(&[("ROSTER_DATABASE_PATH", "/tmp/env.db")]))
            .unwrap()
            .with_cli_overrides(Some(PathBuf::from("/tmp/cli.db")));
        assert_eq!(config.database.path, Some(PathBuf::from("/tmp/cli.db")));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[service]\nmax_conflict_retries = 0").unwrap();

        let config = Config::load_from_file(file.path()).unwrap();
        assert_eq!(config.service.max_conflict_retries, 0);

        let mut broken = tempfile::NamedTempFile::new().unwrap();
        writeln!(broken, "[service\nmax_conflict_retries = 0").unwrap();
        assert!(matches!(
            Config::load_from_file(broken.path()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_resolved_path_prefers_configured() {
        let settings = DatabaseSettings {
            path: Some(PathBuf::from("/data/roster.db")),
            ..Default::default()
        };
        assert_eq!(settings.resolved_path(), Some(PathBuf::from("/data/roster.db")));
    }
}
