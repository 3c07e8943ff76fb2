mod commands;
mod console;

use anyhow::Result;
use clap::{Parser, Subcommand};
use hush_core::HushConfig;
use std::path::PathBuf;

use commands::deliver::DeliverOptions;

#[derive(Parser)]
#[command(name = "hush")]
#[command(about = "Filter push and local notifications", long_about = None)]
struct Cli {
    /// Config file (defaults to <config dir>/hush/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Database file, overrides the configured one
    #[arg(long, global = true)]
    database: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Quiet hours during which notifications are held back
    TimeFilter {
        #[command(subcommand)]
        action: TimeFilterAction,
    },
    /// Named filters matched against a notification's `filter` field
    Filters {
        #[command(subcommand)]
        action: FiltersAction,
    },
    /// Run a notification payload through the filters
    ///
    /// Each run starts with an empty delivered list, so duplicate detection
    /// and the badge count do not carry over between runs.
    Deliver {
        /// JSON object file with the notification data, `-` for stdin
        #[arg(default_value = "-")]
        payload: String,
        /// Treat the payload as a local notification
        #[arg(short, long)]
        local: bool,
        /// Pretend the app is in the foreground
        #[arg(short, long)]
        foreground: bool,
        /// Evaluate at this time of day (HH:MM) instead of now
        #[arg(long)]
        at: Option<String>,
        /// Report a user action on the notification instead of delivering it
        #[arg(long)]
        action: Option<String>,
        /// Text entered with the action
        #[arg(long, requires = "action")]
        input: Option<String>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum TimeFilterAction {
    /// Set quiet hours and switch them on
    Add {
        /// Start of the quiet hours (HH:MM)
        start_from: String,
        /// End of the quiet hours (HH:MM), may be earlier than the start
        end_at: String,
    },
    /// Switch quiet hours off, keeping the configured times
    Remove,
    /// Show the quiet hours
    Show,
}

#[derive(Subcommand, Debug)]
enum FiltersAction {
    /// Block notifications tagged with these keys
    Add {
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// Unblock notifications tagged with these keys
    Remove {
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// List named filters
    List,
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Print the config file location
    Path,
    /// Write the effective configuration to the config file
    Init,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => HushConfig::default_path()?,
    };
    let mut config = HushConfig::load_from(&config_path)?;
    if let Some(database) = cli.database {
        config.database_path = Some(database);
    }

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .format_timestamp_secs()
    .init();

    match cli.command {
        Commands::TimeFilter { action } => match action {
            TimeFilterAction::Add { start_from, end_at } => {
                commands::time_filter::handle_add(&config, &start_from, &end_at)
            }
            TimeFilterAction::Remove => commands::time_filter::handle_remove(&config),
            TimeFilterAction::Show => commands::time_filter::handle_show(&config),
        },
        Commands::Filters { action } => match action {
            FiltersAction::Add { keys } => commands::filters::handle_add(&config, &keys),
            FiltersAction::Remove { keys } => commands::filters::handle_remove(&config, &keys),
            FiltersAction::List => commands::filters::handle_list(&config),
        },
        Commands::Deliver {
            payload,
            local,
            foreground,
            at,
            action,
            input,
        } => commands::deliver::handle_deliver(
            &config,
            &DeliverOptions {
                payload,
                local,
                foreground,
                at,
                action,
                input,
            },
        ),
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::handle_show(&config),
            ConfigAction::Path => {
                println!("{}", config_path.display());
                Ok(())
            }
            ConfigAction::Init => commands::config::handle_init(&config, &config_path),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_deliver_help_mentions_per_run_state() {
        let cli = Cli::command();
        let deliver = cli.find_subcommand("deliver").unwrap();
        let help = deliver.get_long_about().unwrap().to_string();
        assert!(help.contains("do not carry over between runs"));
    }
}
