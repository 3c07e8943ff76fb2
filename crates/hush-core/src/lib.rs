pub mod config;
pub mod engine;
pub mod filters;
pub mod hub;
pub mod message;
pub mod named_filter;
pub mod presentation;
pub mod time_window;

pub use config::{ConfigError, HushConfig};
pub use engine::{Decision, DecisionEngine, FilterSource};
pub use filters::{FilterManager, FilterReport};
pub use hub::{
    AppState, DeliveryOutcome, ListenerChannel, ListenerEvent, NotificationHub,
    NotificationRenderer,
};
pub use message::{IncomingMessage, MessageSource, NotificationIds, NotificationPayload};
pub use named_filter::{is_allowed_by_named_filters, parse_filter_keys};
pub use presentation::Presentation;
pub use time_window::{is_within_allowed_window, TimeOfDay, TimeParseError, TimeWindow};
