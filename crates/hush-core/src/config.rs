use hush_storage::FilterStore;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::presentation::Presentation;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to get config dir")]
    NoConfigDir,

    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Settings read from `config.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HushConfig {
    /// Database file is `<database_name>SQLite.db` in the data directory
    pub database_name: String,
    /// Explicit database file, overrides `database_name`
    pub database_path: Option<PathBuf>,
    /// How push notifications surface while the app is in the foreground
    pub presentation_options: Vec<String>,
    pub log_level: String,
}

impl Default for HushConfig {
    fn default() -> Self {
        Self {
            database_name: String::from("hush"),
            database_path: None,
            presentation_options: vec![String::from("badge")],
            log_level: String::from("info"),
        }
    }
}

impl HushConfig {
    /// `<config_dir>/hush/config.toml`
    ///
    /// # Errors
    ///
    /// Returns an error if the platform config directory cannot be determined
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let mut path = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        path.push("hush");
        path.push("config.toml");
        Ok(path)
    }

    /// Load from the default location
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_path()?)
    }

    /// Load from `path`; a missing file yields the defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write to `path`, creating parent directories
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        std::fs::write(path, content).map_err(write_err)?;
        log::info!("Config saved to {}", path.display());
        Ok(())
    }

    /// Resolved database file
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| FilterStore::default_db_path(&self.database_name))
    }

    /// Foreground presentation for push notifications
    #[must_use]
    pub fn presentation(&self) -> Presentation {
        Presentation::from_options(&self.presentation_options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = HushConfig::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, HushConfig::default());
        assert!(config.presentation().badge);
        assert!(!config.presentation().alert);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "database_name = \"woot\"\npresentation_options = [\"alert\", \"sound\"]\n",
        )
        .unwrap();

        let config = HushConfig::load_from(&path).unwrap();
        assert_eq!(config.database_name, "woot");
        assert_eq!(config.log_level, "info");
        assert!(config.database_path().ends_with("wootSQLite.db"));
        assert!(config.presentation().alert);
        assert!(!config.presentation().badge);
    }

    #[test]
    fn test_database_path_override() {
        let config = HushConfig {
            database_path: Some(PathBuf::from("/tmp/custom.db")),
            ..HushConfig::default()
        };
        assert_eq!(config.database_path(), PathBuf::from("/tmp/custom.db"));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = HushConfig {
            log_level: String::from("debug"),
            ..HushConfig::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(HushConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "database_name = [").unwrap();
        assert!(matches!(
            HushConfig::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
