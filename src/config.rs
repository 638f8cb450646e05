//! Configuration for the wordbook app.
//!
//! Read from a TOML file; every key is optional and falls back to its default.

use crate::models::{PolicyError, SchedulerPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid [scheduler] section in {path}: {source}")]
    InvalidPolicy {
        path: PathBuf,
        source: PolicyError,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub scheduler: SchedulerPolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Defaults to `wordbook.sqlite3` in the platform data directory
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Config {
    /// Loads `path`, or the platform config file when `path` is `None`.
    ///
    /// A missing platform file yields the defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::config_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config
            .scheduler
            .validate()
            .map_err(|source| ConfigError::InvalidPolicy {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(config)
    }

    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "wordbook")
            .map(|d| d.config_dir().join("config.toml"))
    }

    /// Explicit database path, else the platform data directory, else the working directory
    pub fn db_path(&self) -> PathBuf {
        self.database
            .path
            .clone()
            .or_else(|| {
                directories::ProjectDirs::from("", "", "wordbook")
                    .map(|d| d.data_dir().join("wordbook.sqlite3"))
            })
            .unwrap_or_else(|| PathBuf::from("wordbook.sqlite3"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.scheduler, SchedulerPolicy::default());
    }

    #[test]
    fn test_partial_scheduler_section() {
        let config: Config = toml::from_str(
            r#"
            [database]
            path = "/tmp/words.sqlite3"

            [scheduler]
            known_flat_multiplier = 2.0
            "#,
        )
        .unwrap();

        assert_eq!(config.db_path(), PathBuf::from("/tmp/words.sqlite3"));
        assert_eq!(config.scheduler.known_flat_multiplier, 2.0);
        assert_eq!(config.scheduler.min_ease_factor, 1.3);
        assert_eq!(config.scheduler.unsure_interval_multiplier, 1.2);
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[scheduler]\nmin_ease_factor = 1.5").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.scheduler.min_ease_factor, 1.5);
    }

    #[test]
    fn test_missing_or_broken_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            Config::load(Some(&missing)),
            Err(ConfigError::Io { .. })
        ));

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "[scheduler\n").unwrap();
        assert!(matches!(
            Config::load(Some(&broken)),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_invalid_scheduler_section_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        for (name, scheduler) in [
            ("bonus", "known_ease_bonus = -2.0"),
            ("penalty", "unknown_ease_penalty = -0.2"),
            ("floor", "min_ease_factor = 3.0"),
            ("multiplier", "unsure_interval_multiplier = 0.8"),
            ("interval", "initial_interval = 0"),
        ] {
            let path = dir.path().join(format!("{name}.toml"));
            std::fs::write(&path, format!("[scheduler]\n{scheduler}\n")).unwrap();
            assert!(
                matches!(
                    Config::load(Some(&path)),
                    Err(ConfigError::InvalidPolicy { .. })
                ),
                "{scheduler} should be rejected"
            );
        }
    }
}
