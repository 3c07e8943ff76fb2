use rusqlite::params;
use std::collections::BTreeMap;

use crate::error::StorageError;
use crate::models::{
    FilterRow, ALLOWED_VALUE, BLOCKED_VALUE, FILTER_TABLE, KEY_END_AT, KEY_START_FROM,
    KEY_TIME_FILTER_ON, RESERVED_KEYS,
};

use super::FilterStore;

impl FilterStore {
    /// All named filter rows, ordered by key
    ///
    /// # Errors
    ///
    /// Returns an error if the store is closed or the query fails
    pub fn named_filters(&self) -> Result<Vec<FilterRow>, StorageError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT key, value FROM {FILTER_TABLE}
                 WHERE key NOT IN (?1, ?2, ?3)
                 ORDER BY key"
            ))?;

            let rows = stmt
                .query_map(
                    params![KEY_START_FROM, KEY_END_AT, KEY_TIME_FILTER_ON],
                    |row| {
                        Ok(FilterRow {
                            key: row.get(0)?,
                            value: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                        })
                    },
                )?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Named filters as a key -> value map
    ///
    /// # Errors
    ///
    /// Returns an error if the store is closed or the query fails
    pub fn named_filter_rows(&self) -> Result<BTreeMap<String, String>, StorageError> {
        Ok(self
            .named_filters()?
            .into_iter()
            .map(|row| (row.key, row.value))
            .collect())
    }

    /// Mark a named filter as blocked or allowed
    ///
    /// # Errors
    ///
    /// Returns an error if the key is empty or reserved, the store is closed,
    /// or the write fails
    pub fn set_named_filter(&self, key: &str, blocked: bool) -> Result<(), StorageError> {
        let key = validate_filter_key(key)?;
        let value = if blocked { BLOCKED_VALUE } else { ALLOWED_VALUE };
        self.with_conn(|conn| Self::upsert_row(conn, key, value))?;
        log::debug!("Named filter '{key}' = {value}");
        Ok(())
    }

    /// Reset a named filter to allowed
    ///
    /// The row is kept so the filter still shows up in listings.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is empty or reserved, the store is closed,
    /// or the write fails
    pub fn clear_named_filter(&self, key: &str) -> Result<(), StorageError> {
        self.set_named_filter(key, false)
    }
}

fn validate_filter_key(key: &str) -> Result<&str, StorageError> {
    let key = key.trim();
    if key.is_empty() {
        return Err(StorageError::EmptyKey);
    }
    if RESERVED_KEYS.contains(&key) {
        return Err(StorageError::ReservedKey(key.to_string()));
    }
    Ok(key)
}

#[cfg(test)]
mod tests {
    use crate::{FilterRow, FilterStore, StorageError};

    fn open_store() -> FilterStore {
        let store = FilterStore::in_memory();
        store.open().unwrap();
        store.ensure_schema().unwrap();
        store
    }

    #[test]
    fn test_set_and_list_named_filters() {
        let store = open_store();
        store.set_named_filter("promo", true).unwrap();
        store.set_named_filter("news", false).unwrap();
        store.upsert_time_window("22:00", "06:00").unwrap();

        let rows = store.named_filters().unwrap();
        assert_eq!(
            rows,
            vec![FilterRow::new("news", "false"), FilterRow::new("promo", "true")]
        );
    }

    #[test]
    fn test_set_named_filter_last_write_wins() {
        let store = open_store();
        store.set_named_filter("promo", true).unwrap();
        store.set_named_filter("promo", false).unwrap();
        store.set_named_filter("promo", true).unwrap();

        let rows = store.named_filter_rows().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows.get("promo").map(String::as_str), Some("true"));
    }

    #[test]
    fn test_clear_named_filter_keeps_row_unblocked() {
        let store = open_store();
        store.set_named_filter("promo", true).unwrap();
        store.clear_named_filter("promo").unwrap();

        let rows = store.named_filter_rows().unwrap();
        assert_eq!(rows.get("promo").map(String::as_str), Some("false"));
    }

    #[test]
    fn test_named_filter_key_is_trimmed() {
        let store = open_store();
        store.set_named_filter("  vip ", true).unwrap();
        assert!(store.named_filter_rows().unwrap().contains_key("vip"));
    }

    #[test]
    fn test_reserved_and_empty_keys_rejected() {
        let store = open_store();
        assert!(matches!(
            store.set_named_filter("is_time_filter_on", true),
            Err(StorageError::ReservedKey(_))
        ));
        assert!(matches!(
            store.clear_named_filter("   "),
            Err(StorageError::EmptyKey)
        ));
        assert!(store.named_filters().unwrap().is_empty());
    }
}
