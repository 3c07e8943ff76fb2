//! Client-facing filter management.

use hush_storage::{FilterRow, FilterStore, StorageError, TimeWindowRows};
use serde::Serialize;
use std::sync::Arc;

/// Result of a batch filter operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterReport {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

impl FilterReport {
    #[must_use]
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub fn record_success(&mut self) {
        self.successful += 1;
    }

    pub fn record_failure(&mut self, error: String) {
        self.failed += 1;
        self.errors.push(error);
    }

    /// Whether every key was applied
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Explicit filter operations requested by the user or the app
///
/// Unlike the decision path, these surface every error to the caller.
pub struct FilterManager {
    store: Arc<FilterStore>,
}

impl FilterManager {
    #[must_use]
    pub fn new(store: Arc<FilterStore>) -> Self {
        Self { store }
    }

    /// Quiet notifications between `start_from` and `end_at` (`HH:mm`)
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidTimeFormat` for malformed times, or a
    /// storage error if the store is closed or the write fails
    pub fn add_time_filter(&self, start_from: &str, end_at: &str) -> Result<(), StorageError> {
        self.store.upsert_time_window(start_from, end_at)
    }

    /// Turn the quiet hours off, keeping the configured bounds
    ///
    /// # Errors
    ///
    /// Returns an error if the store is closed or the write fails
    pub fn remove_time_filter(&self) -> Result<(), StorageError> {
        self.store.disable_time_window()
    }

    /// Current time window rows
    ///
    /// # Errors
    ///
    /// Returns an error if the store is closed or the read fails
    pub fn time_filter(&self) -> Result<TimeWindowRows, StorageError> {
        self.store.time_window_rows()
    }

    /// Block notifications tagged with any of `keys`
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotOpen` if the store is closed; per-key
    /// failures are collected in the report
    pub fn add_filters<S: AsRef<str>>(&self, keys: &[S]) -> Result<FilterReport, StorageError> {
        self.apply(keys, true)
    }

    /// Unblock notifications tagged with `keys`
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotOpen` if the store is closed; per-key
    /// failures are collected in the report
    pub fn remove_filters<S: AsRef<str>>(&self, keys: &[S]) -> Result<FilterReport, StorageError> {
        self.apply(keys, false)
    }

    /// Named filters only
    ///
    /// # Errors
    ///
    /// Returns an error if the store is closed or the read fails
    pub fn get_filters(&self) -> Result<Vec<FilterRow>, StorageError> {
        self.store.named_filters()
    }

    fn apply<S: AsRef<str>>(&self, keys: &[S], blocked: bool) -> Result<FilterReport, StorageError> {
        if !self.store.is_open() {
            return Err(StorageError::NotOpen);
        }

        let mut report = FilterReport::new(keys.len());
        for key in keys {
            let key = key.as_ref();
            let result = if blocked {
                self.store.set_named_filter(key, true)
            } else {
                self.store.clear_named_filter(key)
            };

            match result {
                Ok(()) => report.record_success(),
                Err(e) => {
                    log::warn!("Filter '{key}' not updated: {e}");
                    report.record_failure(format!(
                        "Unexpected error occurred while updating filter '{key}': {e}"
                    ));
                }
            }
        }

        log::info!(
            "{} filters: {}/{} applied",
            if blocked { "Added" } else { "Removed" },
            report.successful,
            report.total
        );
        Ok(report)
    }
}
