use rusqlite::params;

use crate::error::StorageError;
use crate::models::{
    validate_time_format, TimeWindowRows, ALLOWED_VALUE, BLOCKED_VALUE, FILTER_TABLE, KEY_END_AT,
    KEY_START_FROM, KEY_TIME_FILTER_ON,
};

use super::FilterStore;

impl FilterStore {
    /// Read the three time window rows
    ///
    /// # Errors
    ///
    /// Returns an error if the store is closed or the query fails
    pub fn time_window_rows(&self) -> Result<TimeWindowRows, StorageError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT key, value FROM {FILTER_TABLE} WHERE key IN (?1, ?2, ?3)"
            ))?;

            let rows = stmt
                .query_map(
                    params![KEY_START_FROM, KEY_END_AT, KEY_TIME_FILTER_ON],
                    |row| Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?)),
                )?
                .collect::<Result<Vec<_>, _>>()?;

            let mut window = TimeWindowRows::default();
            for (key, value) in rows {
                match key.as_str() {
                    KEY_START_FROM => window.start_from = value,
                    KEY_END_AT => window.end_at = value,
                    KEY_TIME_FILTER_ON => window.enabled = value,
                    _ => {}
                }
            }
            Ok(window)
        })
    }

    /// Store a quiet-hours window and switch it on
    ///
    /// Both bounds and the switch are written in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidTimeFormat` if either bound is not `HH:mm`,
    /// otherwise an error if the store is closed or the write fails
    pub fn upsert_time_window(&self, start_from: &str, end_at: &str) -> Result<(), StorageError> {
        validate_time_format(start_from)?;
        validate_time_format(end_at)?;

        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            Self::upsert_row(&tx, KEY_START_FROM, start_from)?;
            Self::upsert_row(&tx, KEY_END_AT, end_at)?;
            Self::upsert_row(&tx, KEY_TIME_FILTER_ON, BLOCKED_VALUE)?;
            tx.commit()?;
            Ok(())
        })?;

        log::info!("Time filter set: {start_from} - {end_at}");
        Ok(())
    }

    /// Switch the time window off, keeping its bounds
    ///
    /// # Errors
    ///
    /// Returns an error if the store is closed or the write fails
    pub fn disable_time_window(&self) -> Result<(), StorageError> {
        self.with_conn(|conn| Self::upsert_row(conn, KEY_TIME_FILTER_ON, ALLOWED_VALUE))?;
        log::info!("Time filter disabled");
        Ok(())
    }
}
