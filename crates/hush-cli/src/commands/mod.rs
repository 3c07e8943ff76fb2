pub mod config;
pub mod deliver;
pub mod filters;
pub mod time_filter;

use anyhow::{Context, Result};
use hush_core::HushConfig;
use hush_storage::FilterStore;
use std::sync::Arc;

/// Open the configured filter database and make sure the table exists
fn open_store(config: &HushConfig) -> Result<Arc<FilterStore>> {
    let path = config.database_path();
    let store = FilterStore::open_at(path.clone())
        .with_context(|| format!("Failed to open filter database at {}", path.display()))?;
    Ok(Arc::new(store))
}
