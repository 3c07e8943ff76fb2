//! Quiet-hours evaluation.
//!
//! The configured window is the span during which notifications are held
//! back. Windows whose start is later than their end wrap past midnight.

use chrono::{NaiveTime, Timelike};
use hush_storage::TimeWindowRows;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const MINUTES_PER_DAY: u32 = 24 * 60;
const NOON: u32 = 12 * 60;

/// A stored time bound could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Malformed datetime saved as time filter: '{input}'")]
pub struct TimeParseError {
    pub input: String,
}

/// Hour and minute within a day
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay {
    minutes: u32,
}

impl TimeOfDay {
    /// Build from an hour (0-23) and minute (0-59)
    #[must_use]
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self {
            minutes: hour * 60 + minute,
        })
    }

    /// Current local time of day
    #[must_use]
    pub fn now() -> Self {
        Self::from(chrono::Local::now().time())
    }

    #[must_use]
    pub fn hour(self) -> u32 {
        self.minutes / 60
    }

    #[must_use]
    pub fn minute(self) -> u32 {
        self.minutes % 60
    }

    /// Minutes elapsed since midnight
    #[must_use]
    pub fn minutes_since_midnight(self) -> u32 {
        self.minutes
    }
}

impl From<NaiveTime> for TimeOfDay {
    fn from(time: NaiveTime) -> Self {
        Self {
            minutes: time.hour() * 60 + time.minute(),
        }
    }
}

impl FromStr for TimeOfDay {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveTime::parse_from_str(s.trim(), "%H:%M")
            .map(Self::from)
            .map_err(|_| TimeParseError {
                input: s.to_string(),
            })
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// Quiet-hours window rebuilt from the stored rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeWindow {
    pub start_from: Option<TimeOfDay>,
    pub end_at: Option<TimeOfDay>,
    pub enabled: bool,
}

impl TimeWindow {
    /// An enabled window between two bounds
    #[must_use]
    pub fn new(start_from: TimeOfDay, end_at: TimeOfDay) -> Self {
        Self {
            start_from: Some(start_from),
            end_at: Some(end_at),
            enabled: true,
        }
    }

    /// A window that restricts nothing
    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Rebuild the window from stored rows
    ///
    /// Unparsable bounds are logged and dropped, which leaves the window
    /// unrestricted.
    #[must_use]
    pub fn from_rows(rows: &TimeWindowRows) -> Self {
        if !rows.is_enabled() {
            return Self::disabled();
        }

        Self {
            start_from: parse_bound(rows.start_from.as_deref()),
            end_at: parse_bound(rows.end_at.as_deref()),
            enabled: true,
        }
    }

    /// See [`is_within_allowed_window`]
    #[must_use]
    pub fn allows(&self, now: TimeOfDay) -> bool {
        is_within_allowed_window(self, now)
    }
}

fn parse_bound(value: Option<&str>) -> Option<TimeOfDay> {
    let value = value?;
    match value.parse() {
        Ok(time) => Some(time),
        Err(e) => {
            log::warn!("Ignoring time filter bound: {e}");
            None
        }
    }
}

/// Whether a notification may be shown at `now`
///
/// Returns `false` only while `now` lies strictly inside an enabled window.
/// Both bounds themselves are allowed.
#[must_use]
pub fn is_within_allowed_window(window: &TimeWindow, now: TimeOfDay) -> bool {
    let (Some(start_from), Some(end_at)) = (window.start_from, window.end_at) else {
        return true;
    };
    if !window.enabled {
        return true;
    }

    let start = start_from.minutes_since_midnight();
    let mut end = end_at.minutes_since_midnight();
    let mut now = now.minutes_since_midnight();

    if start > end {
        // Lay the wrapped window out on a continuous two-day timeline
        end += MINUTES_PER_DAY;
        if now < NOON {
            now += MINUTES_PER_DAY;
        }
    }

    !(start < now && now < end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    fn window(start: &str, end: &str) -> TimeWindow {
        TimeWindow::new(t(start), t(end))
    }

    #[test]
    fn test_time_of_day_parse_and_display() {
        assert_eq!(t("09:05").to_string(), "09:05");
        assert_eq!(t("7:30"), TimeOfDay::new(7, 30).unwrap());
        assert_eq!(t(" 23:59 ").minutes_since_midnight(), 23 * 60 + 59);
    }

    #[test]
    fn test_time_of_day_parse_rejects_garbage() {
        let err = "25:00".parse::<TimeOfDay>().unwrap_err();
        assert_eq!(err.input, "25:00");
        assert!("noon".parse::<TimeOfDay>().is_err());
        assert!(TimeOfDay::new(24, 0).is_none());
        assert!(TimeOfDay::new(12, 60).is_none());
    }

    #[test]
    fn test_disabled_window_allows_everything() {
        let mut w = window("00:00", "23:59");
        w.enabled = false;
        for now in ["00:00", "00:01", "12:00", "23:58"] {
            assert!(is_within_allowed_window(&w, t(now)), "{now}");
        }
        assert!(TimeWindow::disabled().allows(t("12:00")));
    }

    #[test]
    fn test_missing_bound_allows_everything() {
        let w = TimeWindow {
            start_from: Some(t("09:00")),
            end_at: None,
            enabled: true,
        };
        assert!(w.allows(t("12:00")));
    }

    #[test]
    fn test_same_day_window() {
        let w = window("09:00", "17:00");
        assert!(!w.allows(t("12:00")));
        assert!(w.allows(t("08:59")));
        assert!(w.allows(t("09:00")));
        assert!(w.allows(t("17:00")));
        assert!(!w.allows(t("16:59")));
        assert!(w.allows(t("17:01")));
    }

    #[test]
    fn test_wrapping_window() {
        let w = window("22:00", "06:00");
        assert!(!w.allows(t("23:30")));
        assert!(!w.allows(t("00:00")));
        assert!(!w.allows(t("05:59")));
        assert!(w.allows(t("06:00")));
        assert!(w.allows(t("07:00")));
        assert!(w.allows(t("12:00")));
        assert!(w.allows(t("21:59")));
        assert!(w.allows(t("22:00")));
    }

    #[test]
    fn test_from_rows_enabled() {
        let rows = TimeWindowRows {
            start_from: Some("22:00".to_string()),
            end_at: Some("06:00".to_string()),
            enabled: Some("true".to_string()),
        };
        assert_eq!(TimeWindow::from_rows(&rows), window("22:00", "06:00"));
    }

    #[test]
    fn test_from_rows_soft_disabled() {
        let rows = TimeWindowRows {
            start_from: Some("22:00".to_string()),
            end_at: Some("06:00".to_string()),
            enabled: Some("false".to_string()),
        };
        let w = TimeWindow::from_rows(&rows);
        assert!(!w.enabled);
        assert!(w.allows(t("23:30")));
    }

    #[test]
    fn test_from_rows_malformed_fails_open() {
        let rows = TimeWindowRows {
            start_from: Some("ten pm".to_string()),
            end_at: Some("06:00".to_string()),
            enabled: Some("true".to_string()),
        };
        let w = TimeWindow::from_rows(&rows);
        assert_eq!(w.start_from, None);
        assert!(w.allows(t("23:30")));
    }
}
