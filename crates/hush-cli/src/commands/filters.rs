/// Named filter command handlers
use anyhow::Result;
use hush_core::{FilterManager, FilterReport, HushConfig};
use tabled::{Table, Tabled};

use super::open_store;

#[derive(Tabled)]
struct FilterLine {
    #[tabled(rename = "Filter")]
    key: String,
    #[tabled(rename = "State")]
    state: &'static str,
}

pub fn handle_add(config: &HushConfig, keys: &[String]) -> Result<()> {
    let manager = FilterManager::new(open_store(config)?);
    let report = manager.add_filters(keys)?;
    print_report("Blocked", &report)
}

pub fn handle_remove(config: &HushConfig, keys: &[String]) -> Result<()> {
    let manager = FilterManager::new(open_store(config)?);
    let report = manager.remove_filters(keys)?;
    print_report("Unblocked", &report)
}

pub fn handle_list(config: &HushConfig) -> Result<()> {
    let manager = FilterManager::new(open_store(config)?);
    let filters = manager.get_filters()?;

    if filters.is_empty() {
        println!("No filters stored");
        return Ok(());
    }

    let lines: Vec<FilterLine> = filters
        .into_iter()
        .map(|row| FilterLine {
            state: if row.is_blocked() { "blocked" } else { "allowed" },
            key: row.key,
        })
        .collect();
    println!("{}", Table::new(lines));
    Ok(())
}

fn print_report(verb: &str, report: &FilterReport) -> Result<()> {
    println!("{verb} {}/{} filters", report.successful, report.total);
    if report.is_success() {
        return Ok(());
    }

    println!("\nErrors:");
    for error in &report.errors {
        println!("  - {error}");
    }
    anyhow::bail!("{} filters could not be updated", report.failed)
}
