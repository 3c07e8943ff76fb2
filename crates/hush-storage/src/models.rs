use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::error::StorageError;

/// Table holding every filter row
pub const FILTER_TABLE: &str = "notification_extensions_filter";

pub const KEY_START_FROM: &str = "filter_start_from";
pub const KEY_END_AT: &str = "filter_end_at";
pub const KEY_TIME_FILTER_ON: &str = "is_time_filter_on";

/// Keys that belong to the time window rather than to named filters
pub const RESERVED_KEYS: [&str; 3] = [KEY_START_FROM, KEY_END_AT, KEY_TIME_FILTER_ON];

/// Stored value marking a named filter (or the time window switch) as active
pub const BLOCKED_VALUE: &str = "true";
pub const ALLOWED_VALUE: &str = "false";

/// A single persisted key/value row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRow {
    pub key: String,
    pub value: String,
}

impl FilterRow {
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Whether this row holds the blocked sentinel
    #[must_use]
    pub fn is_blocked(&self) -> bool {
        self.value == BLOCKED_VALUE
    }
}

/// Raw time window rows; a missing row maps to `None`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindowRows {
    pub start_from: Option<String>,
    pub end_at: Option<String>,
    pub enabled: Option<String>,
}

impl TimeWindowRows {
    /// Whether the master switch row is present and on
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.as_deref() == Some(BLOCKED_VALUE)
    }
}

fn time_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{1,2}):(\d{1,2})$").expect("time pattern is valid")
    })
}

/// Check that `value` is an `HH:mm` time of day
///
/// # Errors
///
/// Returns `StorageError::InvalidTimeFormat` if the string is not two
/// ':'-delimited integers forming a valid hour and minute
pub fn validate_time_format(value: &str) -> Result<(), StorageError> {
    let invalid = || StorageError::InvalidTimeFormat(value.to_string());
    let caps = time_pattern().captures(value).ok_or_else(invalid)?;

    let hour: u32 = caps[1].parse().map_err(|_| invalid())?;
    let minute: u32 = caps[2].parse().map_err(|_| invalid())?;
    if hour > 23 || minute > 59 {
        return Err(invalid());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_time_format_accepts_hh_mm() {
        assert!(validate_time_format("09:00").is_ok());
        assert!(validate_time_format("23:59").is_ok());
        assert!(validate_time_format("7:05").is_ok());
    }

    #[test]
    fn test_validate_time_format_rejects_garbage() {
        for bad in ["", "0900", "09:00:00", "ab:cd", "24:00", "12:60", " 09:00", "-1:30"] {
            let err = validate_time_format(bad).unwrap_err();
            assert!(matches!(err, StorageError::InvalidTimeFormat(_)), "{bad}");
        }
    }

    #[test]
    fn test_time_window_rows_enabled_flag() {
        let mut rows = TimeWindowRows::default();
        assert!(!rows.is_enabled());
        rows.enabled = Some("false".to_string());
        assert!(!rows.is_enabled());
        rows.enabled = Some("true".to_string());
        assert!(rows.is_enabled());
    }

    #[test]
    fn test_filter_row_blocked() {
        assert!(FilterRow::new("promo", "true").is_blocked());
        assert!(!FilterRow::new("promo", "false").is_blocked());
    }
}
