//! Composition root wiring the decision engine to the platform.
//!
//! The platform layer hands every delivered message to
//! [`NotificationHub::on_message`]; the hub decides, renders through the
//! [`NotificationRenderer`] and relays events to the web view through the
//! [`ListenerChannel`]. Events raised while no listener is attached are kept
//! in a pending queue and flushed in order on [`NotificationHub::attach_listener`].

use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, VecDeque};

use crate::engine::{Decision, DecisionEngine, FilterSource};
use crate::message::{IncomingMessage, MessageSource, NotificationPayload};
use crate::presentation::Presentation;
use crate::time_window::TimeOfDay;

/// Platform action identifiers mapped onto `tap`
const TAP_ACTIONS: [&str; 2] = ["com.apple.UNNotificationDefaultActionIdentifier", "tap"];
/// Platform action identifiers mapped onto `dismiss`
const DISMISS_ACTIONS: [&str; 2] = ["com.apple.UNNotificationDismissActionIdentifier", "dismiss"];

/// Whether the host application is on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AppState {
    Foreground,
    #[default]
    Background,
}

/// Platform sink that draws notifications and the badge
pub trait NotificationRenderer: Send {
    fn show(&self, notification: &NotificationPayload, presentation: Presentation);

    /// Summary entry clustering notifications with the same group id
    fn show_group_summary(&self, group_id: i32);

    fn cancel(&self, notification_id: i32);

    fn set_badge(&self, count: u32);
}

/// Web-view listener channel
pub trait ListenerChannel: Send {
    fn notify_listeners(&self, event: &str, data: &Value, retain_until_consumed: bool);
}

/// An event addressed to the listener channel
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListenerEvent {
    pub name: String,
    pub data: Value,
    pub retain_until_consumed: bool,
}

/// What the hub did with one message
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryOutcome {
    pub decision: Decision,
    pub rendered: bool,
    /// The notification id was already delivered and got replaced
    pub duplicate: bool,
    /// Delivered to the listener channel
    pub relayed: bool,
    /// Held in the pending queue until a listener attaches
    pub queued: bool,
    pub badge: u32,
}

/// Ledger entry for a notification the platform currently holds
#[derive(Debug, Clone)]
struct Delivered {
    payload: NotificationPayload,
    /// Counted in the badge when it was first delivered
    badged: bool,
}

pub struct NotificationHub<S> {
    engine: DecisionEngine<S>,
    renderer: Box<dyn NotificationRenderer>,
    listener: Option<Box<dyn ListenerChannel>>,
    pending: VecDeque<ListenerEvent>,
    app_state: AppState,
    foreground_presentation: Presentation,
    delivered: BTreeMap<i32, Delivered>,
    badge: u32,
}

impl<S: FilterSource> NotificationHub<S> {
    /// Build a hub with no listener attached yet
    ///
    /// `foreground_presentation` controls how push notifications surface while
    /// the app is on screen; local notifications always surface fully.
    #[must_use]
    pub fn new(
        engine: DecisionEngine<S>,
        renderer: Box<dyn NotificationRenderer>,
        foreground_presentation: Presentation,
    ) -> Self {
        Self {
            engine,
            renderer,
            listener: None,
            pending: VecDeque::new(),
            app_state: AppState::default(),
            foreground_presentation,
            delivered: BTreeMap::new(),
            badge: 0,
        }
    }

    #[must_use]
    pub fn engine(&self) -> &DecisionEngine<S> {
        &self.engine
    }

    #[must_use]
    pub fn app_state(&self) -> AppState {
        self.app_state
    }

    pub fn set_app_state(&mut self, state: AppState) {
        if self.app_state != state {
            log::debug!("App state: {:?} -> {state:?}", self.app_state);
        }
        self.app_state = state;
    }

    #[must_use]
    pub fn badge(&self) -> u32 {
        self.badge
    }

    /// Events waiting for a listener
    #[must_use]
    pub fn pending(&self) -> &VecDeque<ListenerEvent> {
        &self.pending
    }

    /// Attach the listener channel and flush pending events in arrival order
    pub fn attach_listener(&mut self, listener: Box<dyn ListenerChannel>) {
        if !self.pending.is_empty() {
            log::info!("Flushing {} pending listener events", self.pending.len());
        }
        for event in self.pending.drain(..) {
            listener.notify_listeners(&event.name, &event.data, event.retain_until_consumed);
        }
        self.listener = Some(listener);
    }

    /// Detach the listener; later events are queued again
    pub fn detach_listener(&mut self) -> Option<Box<dyn ListenerChannel>> {
        self.listener.take()
    }

    /// Handle a delivered message at the current local time
    pub fn on_message<I, K, V>(&mut self, data: I, source: MessageSource) -> DeliveryOutcome
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.on_message_at(data, source, TimeOfDay::now())
    }

    /// Handle a delivered message as if it arrived at `now`
    ///
    /// Displayed messages are rendered (together with their group summary)
    /// unless the app is in the foreground and the presentation has no alert.
    /// Badge accounting is independent of the banner: a displayed message
    /// counts towards the badge whenever its presentation includes `badge`.
    /// In the foreground the listener always receives the payload with the
    /// decision attached; in the background it only hears about displayed
    /// messages.
    pub fn on_message_at<I, K, V>(
        &mut self,
        data: I,
        source: MessageSource,
        now: TimeOfDay,
    ) -> DeliveryOutcome
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let message = IncomingMessage::from_data(data);
        let decision = self.engine.decide(&message, now);

        let mut outcome = DeliveryOutcome {
            decision,
            rendered: false,
            duplicate: false,
            relayed: false,
            queued: false,
            badge: self.badge,
        };

        if outcome.decision.display {
            let presentation = self.presentation_for(source, message.silent);
            if presentation.alert {
                self.renderer.show(&outcome.decision.payload, presentation);
                self.renderer.show_group_summary(outcome.decision.payload.group_id);
                outcome.rendered = true;
            }
            if presentation.alert || presentation.badge {
                outcome.duplicate = self.record(&outcome.decision.payload, presentation.badge);
            }
        } else {
            log::info!(
                "Suppressed notification {}",
                outcome.decision.ids.notification_id
            );
        }

        if outcome.decision.display || self.app_state == AppState::Foreground {
            let mut data = json!(outcome.decision.payload);
            data["shown"] = Value::Bool(outcome.decision.display);
            let delivered = self.emit(ListenerEvent {
                name: source.received_event().to_string(),
                data,
                retain_until_consumed: source == MessageSource::Local,
            });
            outcome.relayed = delivered;
            outcome.queued = !delivered;
        }

        outcome.badge = self.badge;
        outcome
    }

    /// Relay a user action on a notification
    ///
    /// Platform default identifiers are normalised to `tap` and `dismiss`. A
    /// tapped notification leaves the delivered list.
    pub fn on_action<I, K, V>(
        &mut self,
        action_id: &str,
        input_value: Option<&str>,
        data: I,
        source: MessageSource,
    ) -> ListenerEvent
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let payload = IncomingMessage::from_data(data).payload();
        let action_id = normalize_action_id(action_id);

        if action_id == "tap" {
            self.delivered.remove(&payload.id);
        }

        let mut data = json!({
            "actionId": action_id,
            "notification": payload,
        });
        if let Some(input) = input_value {
            data["inputValue"] = Value::String(input.to_string());
        }

        let event = ListenerEvent {
            name: source.action_event().to_string(),
            data,
            retain_until_consumed: true,
        };
        self.emit(event.clone());
        event
    }

    /// Notifications currently shown by the platform
    #[must_use]
    pub fn delivered(&self) -> Vec<&NotificationPayload> {
        self.delivered.values().map(|entry| &entry.payload).collect()
    }

    /// Withdraw the given notifications; returns how many were delivered
    pub fn remove_delivered(&mut self, ids: &[i32]) -> usize {
        let mut removed = 0;
        let mut unbadged: u32 = 0;
        for id in ids {
            if let Some(entry) = self.delivered.remove(id) {
                self.renderer.cancel(*id);
                removed += 1;
                if entry.badged {
                    unbadged += 1;
                }
            }
        }
        if unbadged > 0 {
            self.badge = self.badge.saturating_sub(unbadged);
            self.renderer.set_badge(self.badge);
        }
        removed
    }

    /// Withdraw every delivered notification and reset the badge
    pub fn remove_all_delivered(&mut self) {
        for id in self.delivered.keys() {
            self.renderer.cancel(*id);
        }
        self.delivered.clear();
        self.badge = 0;
        self.renderer.set_badge(0);
    }

    fn presentation_for(&self, source: MessageSource, silent: bool) -> Presentation {
        if silent {
            return Presentation::SILENT;
        }
        match (self.app_state, source) {
            (AppState::Background, _) | (AppState::Foreground, MessageSource::Local) => {
                Presentation::FULL
            }
            (AppState::Foreground, MessageSource::Push) => self.foreground_presentation,
        }
    }

    /// Put `payload` in the delivered ledger; returns `true` when the id was
    /// already delivered
    ///
    /// A replaced entry keeps its original badge accounting.
    fn record(&mut self, payload: &NotificationPayload, badge: bool) -> bool {
        if let Some(entry) = self.delivered.get_mut(&payload.id) {
            log::debug!("Notification {} replaced in place", payload.id);
            entry.payload = payload.clone();
            return true;
        }

        self.delivered.insert(
            payload.id,
            Delivered {
                payload: payload.clone(),
                badged: badge,
            },
        );
        if badge {
            self.badge = self.badge.saturating_add(1);
            self.renderer.set_badge(self.badge);
        }
        false
    }

    /// Returns `true` when delivered, `false` when queued
    fn emit(&mut self, event: ListenerEvent) -> bool {
        match &self.listener {
            Some(listener) => {
                listener.notify_listeners(&event.name, &event.data, event.retain_until_consumed);
                true
            }
            None => {
                log::debug!("No listener attached, queueing {}", event.name);
                self.pending.push_back(event);
                false
            }
        }
    }
}

fn normalize_action_id(action_id: &str) -> &str {
    if TAP_ACTIONS.contains(&action_id) {
        "tap"
    } else if DISMISS_ACTIONS.contains(&action_id) {
        "dismiss"
    } else {
        action_id
    }
}
