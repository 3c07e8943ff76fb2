/// Configuration command handlers
use anyhow::Result;
use hush_core::HushConfig;
use std::path::Path;

pub fn handle_show(config: &HushConfig) -> Result<()> {
    println!("Configuration:");
    println!("{}", "=".repeat(14));
    println!("database_name = {}", config.database_name);
    println!("database = {}", config.database_path().display());
    println!(
        "presentation_options = [{}]",
        config.presentation_options.join(", ")
    );
    println!("log_level = {}", config.log_level);
    Ok(())
}

pub fn handle_init(config: &HushConfig, path: &Path) -> Result<()> {
    if path.exists() {
        println!("Config already exists at: {}", path.display());
        return Ok(());
    }
    config.save_to(path)?;
    println!("Config written to: {}", path.display());
    Ok(())
}
