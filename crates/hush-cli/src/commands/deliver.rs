//! Run a notification payload through the filters, the way a platform
//! delivery callback would.

use anyhow::{Context, Result};
use hush_core::{
    AppState, DecisionEngine, HushConfig, MessageSource, NotificationHub, TimeOfDay,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::Read;

use super::open_store;
use crate::console::{ConsoleListener, ConsoleRenderer};

pub struct DeliverOptions {
    pub payload: String,
    pub local: bool,
    pub foreground: bool,
    pub at: Option<String>,
    pub action: Option<String>,
    pub input: Option<String>,
}

pub fn handle_deliver(config: &HushConfig, options: &DeliverOptions) -> Result<()> {
    let raw = read_payload(&options.payload)?;
    let data = payload_from_json(&raw)?;

    let now = match &options.at {
        Some(at) => at.parse::<TimeOfDay>()?,
        None => TimeOfDay::now(),
    };
    let source = if options.local {
        MessageSource::Local
    } else {
        MessageSource::Push
    };

    let store = open_store(config)?;
    let mut hub = NotificationHub::new(
        DecisionEngine::new(store),
        Box::new(ConsoleRenderer),
        config.presentation(),
    );
    if options.foreground {
        hub.set_app_state(AppState::Foreground);
    }
    hub.attach_listener(Box::new(ConsoleListener));

    if let Some(action) = &options.action {
        hub.on_action(action, options.input.as_deref(), data, source);
        return Ok(());
    }

    let outcome = hub.on_message_at(data, source, now);
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

fn read_payload(location: &str) -> Result<String> {
    if location == "-" {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("Failed to read payload from stdin")?;
        return Ok(raw);
    }
    std::fs::read_to_string(location).with_context(|| format!("Failed to read payload {location}"))
}

/// Flatten a JSON object into the string map delivered by the platform
fn payload_from_json(raw: &str) -> Result<BTreeMap<String, String>> {
    let value: Value = serde_json::from_str(raw).context("Payload is not valid JSON")?;
    let Value::Object(fields) = value else {
        anyhow::bail!("Payload must be a JSON object");
    };

    Ok(fields
        .into_iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| {
            let v = match v {
                Value::String(s) => s,
                other => other.to_string(),
            };
            (k, v)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_from_json_stringifies_values() {
        let data = payload_from_json(
            r#"{"title": "Hi", "objectId": 5, "isShown": false, "filter": "vip,", "extra": null}"#,
        )
        .unwrap();
        assert_eq!(data["title"], "Hi");
        assert_eq!(data["objectId"], "5");
        assert_eq!(data["isShown"], "false");
        assert_eq!(data["filter"], "vip,");
        assert!(!data.contains_key("extra"));
    }

    #[test]
    fn test_payload_from_json_rejects_non_objects() {
        assert!(payload_from_json("[1, 2]").is_err());
        assert!(payload_from_json("not json").is_err());
    }

    #[test]
    fn test_read_payload_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload.json");
        std::fs::write(&path, r#"{"title": "x"}"#).unwrap();
        let raw = read_payload(path.to_str().unwrap()).unwrap();
        assert_eq!(payload_from_json(&raw).unwrap()["title"], "x");
    }

    #[test]
    fn test_deliver_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let payload = dir.path().join("payload.json");
        std::fs::write(&payload, r#"{"title": "VIP", "filter": "vip"}"#).unwrap();

        let config = HushConfig {
            database_path: Some(dir.path().join("filters.db")),
            ..HushConfig::default()
        };
        let options = DeliverOptions {
            payload: payload.to_string_lossy().into_owned(),
            local: false,
            foreground: false,
            at: Some(String::from("12:00")),
            action: None,
            input: None,
        };
        handle_deliver(&config, &options).unwrap();

        let bad_time = DeliverOptions {
            at: Some(String::from("noon")),
            ..options
        };
        assert!(handle_deliver(&config, &bad_time).is_err());
    }
}
