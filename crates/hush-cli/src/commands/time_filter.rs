/// Quiet hours command handlers
use anyhow::Result;
use hush_core::{FilterManager, HushConfig, TimeWindow};

use super::open_store;

pub fn handle_add(config: &HushConfig, start_from: &str, end_at: &str) -> Result<()> {
    let manager = FilterManager::new(open_store(config)?);
    manager.add_time_filter(start_from, end_at)?;
    println!("Quiet hours set: {start_from} - {end_at}");
    Ok(())
}

pub fn handle_remove(config: &HushConfig) -> Result<()> {
    let manager = FilterManager::new(open_store(config)?);
    manager.remove_time_filter()?;
    println!("Quiet hours off");
    Ok(())
}

pub fn handle_show(config: &HushConfig) -> Result<()> {
    let manager = FilterManager::new(open_store(config)?);
    let rows = manager.time_filter()?;

    println!("Quiet Hours");
    println!("{}", "=".repeat(16));
    match (&rows.start_from, &rows.end_at) {
        (Some(start), Some(end)) => println!("Window: {start} - {end}"),
        _ => println!("Window: not set"),
    }
    println!(
        "Status: {}",
        if rows.is_enabled() { "ON" } else { "OFF" }
    );

    let window = TimeWindow::from_rows(&rows);
    if rows.is_enabled() && (window.start_from.is_none() || window.end_at.is_none()) {
        println!("Warning: stored times are unreadable, notifications are not held back");
    }
    Ok(())
}
