//! Stdout stand-ins for the platform renderer and the web-view listeners.

use hush_core::{ListenerChannel, NotificationPayload, NotificationRenderer, Presentation};
use serde_json::Value;

pub struct ConsoleRenderer;

impl NotificationRenderer for ConsoleRenderer {
    fn show(&self, notification: &NotificationPayload, presentation: Presentation) {
        let mut flags = Vec::new();
        if presentation.alert {
            flags.push("alert");
        }
        if presentation.badge {
            flags.push("badge");
        }
        if presentation.sound {
            flags.push("sound");
        }
        println!(
            "[notify #{} group {}] {}: {} ({})",
            notification.id,
            notification.group_id,
            notification.title,
            notification.body,
            flags.join(", ")
        );
    }

    fn show_group_summary(&self, group_id: i32) {
        log::debug!("Group summary {group_id} refreshed");
    }

    fn cancel(&self, notification_id: i32) {
        println!("[cancel #{notification_id}]");
    }

    fn set_badge(&self, count: u32) {
        println!("[badge {count}]");
    }
}

pub struct ConsoleListener;

impl ListenerChannel for ConsoleListener {
    fn notify_listeners(&self, event: &str, data: &Value, retain_until_consumed: bool) {
        let retained = if retain_until_consumed { " (retained)" } else { "" };
        println!("[event {event}{retained}] {data}");
    }
}
