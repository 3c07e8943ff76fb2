use hush_storage::BLOCKED_VALUE;
use std::collections::BTreeMap;

/// Split a raw `filter` field into keys
///
/// One trailing comma is tolerated, tokens are trimmed and blanks dropped.
#[must_use]
pub fn parse_filter_keys(raw: &str) -> Vec<String> {
    let raw = raw.trim_end();
    let raw = raw.strip_suffix(',').unwrap_or(raw);

    raw.split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(String::from)
        .collect()
}

/// Whether a message tagged with `requested` keys passes the named filters
///
/// Suppressed as soon as any requested key is stored as blocked. Keys with no
/// stored row pass through.
#[must_use]
pub fn is_allowed_by_named_filters(stored: &BTreeMap<String, String>, requested: &[String]) -> bool {
    if requested.is_empty() {
        return true;
    }

    let blocked = requested
        .iter()
        .find(|key| stored.get(*key).is_some_and(|value| value == BLOCKED_VALUE));

    match blocked {
        Some(key) => {
            log::debug!("Notification blocked by filter '{key}'");
            false
        }
        None => true,
    }
}
