//! Filter storage over a single SQLite table.
//!
//! Time window rows and named filter rows live in the same key/value table and
//! are split into domain-specific modules.

mod named_filters;
mod time_window;

use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::error::StorageError;
use crate::migrations;
use crate::models::FILTER_TABLE;

/// Key/value filter store
///
/// The store starts closed; every operation fails with
/// [`StorageError::NotOpen`] until [`FilterStore::open`] succeeds. The
/// connection sits behind a mutex so the store can be shared with whatever
/// thread delivers notifications.
pub struct FilterStore {
    path: Option<PathBuf>,
    conn: Mutex<Option<Connection>>,
}

impl FilterStore {
    /// Create a store backed by the database file at `path` (not opened yet)
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self {
            path: Some(path),
            conn: Mutex::new(None),
        }
    }

    /// Create a store backed by a private in-memory database (not opened yet)
    ///
    /// Contents are lost on `close`.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            path: None,
            conn: Mutex::new(None),
        }
    }

    /// Open the store at `path` and create the filter table
    ///
    /// # Errors
    ///
    /// Returns an error if the directory, connection, or table cannot be created
    pub fn open_at(path: PathBuf) -> Result<Self, StorageError> {
        let store = Self::new(path);
        store.open()?;
        store.ensure_schema()?;
        Ok(store)
    }

    /// Default database file for a configured database name
    #[must_use]
    pub fn default_db_path(database_name: &str) -> PathBuf {
        let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("hush");
        path.push(format!("{database_name}SQLite.db"));
        path
    }

    /// Database file path, `None` for in-memory stores
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Open the underlying connection; a no-op when already open
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory or the connection cannot be created
    pub fn open(&self) -> Result<(), StorageError> {
        let mut guard = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        if guard.is_some() {
            return Ok(());
        }

        let conn = match &self.path {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent).map_err(|source| {
                        StorageError::CreateDir {
                            path: parent.to_path_buf(),
                            source,
                        }
                    })?;
                }
                let conn = Connection::open(path)?;
                log::info!("Filter database opened at: {}", path.display());
                conn
            }
            None => {
                log::debug!("Filter database opened in memory");
                Connection::open_in_memory()?
            }
        };

        *guard = Some(conn);
        Ok(())
    }

    /// Close the connection; later operations fail until reopened
    ///
    /// A poisoned lock still closes the connection.
    pub fn close(&self) {
        let mut guard = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.take().is_some() {
            log::debug!("Filter database closed");
        }
    }

    /// Whether the connection is currently open
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.conn
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Idempotently create the filter table
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotOpen` if the store is closed, or a SQLite error
    pub fn ensure_schema(&self) -> Result<(), StorageError> {
        self.with_conn(|conn| migrations::init_schema(conn))
    }

    /// Run `f` against the open connection
    pub(crate) fn with_conn<T>(
        &self,
        f: impl FnOnce(&mut Connection) -> Result<T, StorageError>,
    ) -> Result<T, StorageError> {
        let mut guard = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        let conn = guard.as_mut().ok_or(StorageError::NotOpen)?;
        f(conn)
    }

    /// Upsert a single row; last write wins
    pub(crate) fn upsert_row(conn: &Connection, key: &str, value: &str) -> Result<(), StorageError> {
        conn.execute(
            &format!("INSERT OR REPLACE INTO {FILTER_TABLE} (key, value) VALUES (?1, ?2)"),
            params![key, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_closed_store_rejects_operations() {
        let store = FilterStore::in_memory();
        assert!(!store.is_open());
        assert!(matches!(store.ensure_schema(), Err(StorageError::NotOpen)));
        assert!(matches!(
            store.named_filter_rows(),
            Err(StorageError::NotOpen)
        ));
    }

    #[test]
    fn test_open_is_idempotent() {
        let store = FilterStore::in_memory();
        store.open().unwrap();
        store.ensure_schema().unwrap();
        store.set_named_filter("promo", true).unwrap();

        // A second open must not swap out the live connection
        store.open().unwrap();
        assert_eq!(store.named_filter_rows().unwrap().len(), 1);
    }

    #[test]
    fn test_close_then_reopen_file_store_keeps_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("hushSQLite.db");

        let store = FilterStore::open_at(path.clone()).unwrap();
        store.upsert_time_window("22:00", "06:00").unwrap();
        store.close();
        assert!(!store.is_open());
        assert!(matches!(
            store.time_window_rows(),
            Err(StorageError::NotOpen)
        ));

        store.open().unwrap();
        let rows = store.time_window_rows().unwrap();
        assert_eq!(rows.start_from.as_deref(), Some("22:00"));
        assert_eq!(store.path(), Some(path.as_path()));
    }

    #[test]
    fn test_close_after_poisoned_lock() {
        let store = Arc::new(FilterStore::in_memory());
        store.open().unwrap();

        let poisoner = Arc::clone(&store);
        let result = thread::spawn(move || {
            let _ = poisoner
                .with_conn(|_| -> Result<(), StorageError> { panic!("writer crashed") });
        })
        .join();
        assert!(result.is_err());

        assert!(store.is_open());
        assert!(matches!(
            store.named_filter_rows(),
            Err(StorageError::Poisoned)
        ));

        store.close();
        assert!(!store.is_open());
    }

    #[test]
    fn test_shared_store_across_threads() {
        let store = Arc::new(FilterStore::in_memory());
        store.open().unwrap();
        store.ensure_schema().unwrap();

        let keys: Vec<String> = (0..8).map(|i| format!("topic{i}")).collect();

        let mut handles = Vec::new();
        for writer in 0..4 {
            let store = Arc::clone(&store);
            let keys = keys.clone();
            handles.push(thread::spawn(move || {
                for round in 0..20 {
                    for key in &keys {
                        store
                            .set_named_filter(key, (writer + round) % 2 == 0)
                            .unwrap();
                    }
                }
            }));
        }
        for _ in 0..2 {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                for _ in 0..50 {
                    let rows = store.named_filter_rows().unwrap();
                    assert!(rows.len() <= 8);
                    assert!(rows.values().all(|v| v == "true" || v == "false"));
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let count: i64 = store
            .with_conn(|conn| {
                Ok(conn.query_row(
                    &format!("SELECT COUNT(*) FROM {FILTER_TABLE}"),
                    [],
                    |row| row.get(0),
                )?)
            })
            .unwrap();
        assert_eq!(count, 8);
        assert_eq!(store.named_filter_rows().unwrap().len(), 8);

        // Last write wins regardless of what the writers left behind
        store.set_named_filter("topic3", true).unwrap();
        store.clear_named_filter("topic3").unwrap();
        let rows = store.named_filter_rows().unwrap();
        assert_eq!(rows.get("topic3").map(String::as_str), Some("false"));
        assert_eq!(rows.len(), 8);
    }

    #[test]
    fn test_default_db_path_uses_database_name() {
        let path = FilterStore::default_db_path("woot");
        assert!(path.ends_with("hush/wootSQLite.db"));
    }
}
