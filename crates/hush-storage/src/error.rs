use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the filter store
#[derive(Debug, Error)]
pub enum StorageError {
    /// The store was used before `open` (or after `close`)
    #[error("Local database not opened yet.")]
    NotOpen,

    /// A time bound did not match `HH:mm`
    #[error("Invalid time format: '{0}'")]
    InvalidTimeFormat(String),

    /// Named filters cannot use a key reserved for the time window
    #[error("Filter key '{0}' is reserved")]
    ReservedKey(String),

    /// Named filters need a non-blank key
    #[error("Filter key must not be empty")]
    EmptyKey,

    #[error("Failed to create database directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Database lock poisoned")]
    Poisoned,

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

impl StorageError {
    /// Whether this error reflects a rejected input rather than a storage failure
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidTimeFormat(_) | Self::ReservedKey(_) | Self::EmptyKey
        )
    }
}
