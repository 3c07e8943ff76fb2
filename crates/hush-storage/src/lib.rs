pub mod db;
pub mod error;
pub mod migrations;
pub mod models;

pub use db::FilterStore;
pub use error::StorageError;
pub use models::{
    validate_time_format, FilterRow, TimeWindowRows, ALLOWED_VALUE, BLOCKED_VALUE,
    FILTER_TABLE, KEY_END_AT, KEY_START_FROM, KEY_TIME_FILTER_ON, RESERVED_KEYS,
};
