use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::named_filter::parse_filter_keys;

/// Where a notification came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageSource {
    Push,
    Local,
}

impl MessageSource {
    /// Listener event fired when a notification arrives
    #[must_use]
    pub fn received_event(self) -> &'static str {
        match self {
            Self::Push => "pushNotificationReceived",
            Self::Local => "localNotificationReceived",
        }
    }

    /// Listener event fired when the user acts on a notification
    #[must_use]
    pub fn action_event(self) -> &'static str {
        match self {
            Self::Push => "pushNotificationActionPerformed",
            Self::Local => "localNotificationActionPerformed",
        }
    }
}

/// Platform identifiers for a notification and its group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationIds {
    pub notification_id: i32,
    pub group_id: i32,
}

/// An inbound push or local notification
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IncomingMessage {
    pub title: Option<String>,
    pub body: Option<String>,
    pub filter_keys: Vec<String>,
    pub is_shown_override: Option<bool>,
    pub silent: bool,
    pub object_id: i32,
    pub sender_id: i32,
    pub code: i32,
    /// Every field as delivered
    pub data: BTreeMap<String, String>,
}

impl IncomingMessage {
    /// Build a message from a delivered string map
    pub fn from_data<I, K, V>(data: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let data: BTreeMap<String, String> = data
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        let is_shown_override = data
            .get("isShown")
            .or_else(|| data.get("is_shown"))
            .and_then(|value| parse_flag(value));

        Self {
            title: data.get("title").cloned(),
            body: data.get("body").cloned(),
            filter_keys: data
                .get("filter")
                .map(|raw| parse_filter_keys(raw))
                .unwrap_or_default(),
            is_shown_override,
            silent: data.get("silent").and_then(|v| parse_flag(v)) == Some(true),
            object_id: numeric_field(&data, "objectId"),
            sender_id: numeric_field(&data, "senderId"),
            code: numeric_field(&data, "code"),
            data,
        }
    }

    /// Notification and group identifiers
    ///
    /// Notifications about the same object and code share a group.
    #[must_use]
    pub fn ids(&self) -> NotificationIds {
        NotificationIds {
            notification_id: self
                .object_id
                .wrapping_add(self.code)
                .wrapping_add(self.sender_id),
            group_id: self.object_id.wrapping_add(self.code),
        }
    }

    /// Normalized payload handed to renderers and listeners
    #[must_use]
    pub fn payload(&self) -> NotificationPayload {
        let ids = self.ids();
        NotificationPayload {
            id: ids.notification_id,
            group_id: ids.group_id,
            title: self.title.clone().unwrap_or_default(),
            body: self.body.clone().unwrap_or_default(),
            data: self.data.clone(),
        }
    }
}

/// Normalized notification content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub id: i32,
    pub group_id: i32,
    pub title: String,
    pub body: String,
    pub data: BTreeMap<String, String>,
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        other => {
            log::debug!("Ignoring non-boolean flag value: {other}");
            None
        }
    }
}

fn numeric_field(data: &BTreeMap<String, String>, key: &str) -> i32 {
    let Some(raw) = data.get(key) else {
        return 0;
    };
    raw.trim().parse().unwrap_or_else(|_| {
        log::warn!("Non-numeric {key} '{raw}', using 0");
        0
    })
}
