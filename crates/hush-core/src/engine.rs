//! Display decision for a single incoming notification.

use hush_storage::{FilterStore, StorageError, TimeWindowRows};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::message::{IncomingMessage, NotificationIds, NotificationPayload};
use crate::named_filter::is_allowed_by_named_filters;
use crate::time_window::{TimeOfDay, TimeWindow};

/// Read access to persisted filter state
pub trait FilterSource {
    /// Make sure the backing table exists
    ///
    /// # Errors
    ///
    /// Returns an error if the store is not open or the table cannot be created
    fn ensure_schema(&self) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns an error if the rows cannot be read
    fn time_window_rows(&self) -> Result<TimeWindowRows, StorageError>;

    /// # Errors
    ///
    /// Returns an error if the rows cannot be read
    fn named_filter_rows(&self) -> Result<BTreeMap<String, String>, StorageError>;
}

impl FilterSource for FilterStore {
    fn ensure_schema(&self) -> Result<(), StorageError> {
        FilterStore::ensure_schema(self)
    }

    fn time_window_rows(&self) -> Result<TimeWindowRows, StorageError> {
        FilterStore::time_window_rows(self)
    }

    fn named_filter_rows(&self) -> Result<BTreeMap<String, String>, StorageError> {
        FilterStore::named_filter_rows(self)
    }
}

impl<T: FilterSource + ?Sized> FilterSource for Arc<T> {
    fn ensure_schema(&self) -> Result<(), StorageError> {
        (**self).ensure_schema()
    }

    fn time_window_rows(&self) -> Result<TimeWindowRows, StorageError> {
        (**self).time_window_rows()
    }

    fn named_filter_rows(&self) -> Result<BTreeMap<String, String>, StorageError> {
        (**self).named_filter_rows()
    }
}

/// Outcome of evaluating one message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub display: bool,
    pub time_ok: bool,
    pub named_ok: bool,
    pub shown_ok: bool,
    pub ids: NotificationIds,
    pub payload: NotificationPayload,
}

/// Combines the time window, named filters and the message override
pub struct DecisionEngine<S> {
    source: S,
}

impl<S: FilterSource> DecisionEngine<S> {
    #[must_use]
    pub fn new(source: S) -> Self {
        Self { source }
    }

    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Whether `message` should be displayed at `now`
    #[must_use]
    pub fn should_display(&self, message: &IncomingMessage, now: TimeOfDay) -> bool {
        self.decide(message, now).display
    }

    /// Evaluate `message` at `now`
    ///
    /// Never fails: storage problems are logged and the affected filter is
    /// treated as absent, so the notification is shown.
    #[must_use]
    pub fn decide(&self, message: &IncomingMessage, now: TimeOfDay) -> Decision {
        let (time_ok, named_ok) = match self.source.ensure_schema() {
            Ok(()) => (
                self.time_allows(now),
                self.named_filters_allow(&message.filter_keys),
            ),
            Err(e) => {
                log::warn!("Filter store unavailable, showing notification: {e}");
                (true, true)
            }
        };
        let shown_ok = message.is_shown_override.unwrap_or(true);
        let display = time_ok && named_ok && shown_ok;

        log::debug!(
            "Decision for notification {}: display={display} (time={time_ok}, filters={named_ok}, shown={shown_ok})",
            message.ids().notification_id
        );

        Decision {
            display,
            time_ok,
            named_ok,
            shown_ok,
            ids: message.ids(),
            payload: message.payload(),
        }
    }

    fn time_allows(&self, now: TimeOfDay) -> bool {
        match self.source.time_window_rows() {
            Ok(rows) => TimeWindow::from_rows(&rows).allows(now),
            Err(e) => {
                log::warn!("Failed to read time filter: {e}");
                true
            }
        }
    }

    fn named_filters_allow(&self, keys: &[String]) -> bool {
        if keys.is_empty() {
            return true;
        }
        match self.source.named_filter_rows() {
            Ok(stored) => is_allowed_by_named_filters(&stored, keys),
            Err(e) => {
                log::warn!("Failed to read named filters: {e}");
                true
            }
        }
    }
}
