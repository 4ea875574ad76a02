//! Configuration management commands for CLI.

use clap::Subcommand;
use lifeboard_core::storage::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the full configuration
    Show,
    /// Get a single value by key
    Get {
        /// Config key (streak.max_lookback_days or stats.window_days)
        key: String,
    },
    /// Set a value by key and persist
    Set {
        /// Config key (streak.max_lookback_days or stats.window_days)
        key: String,
        /// New value
        value: String,
    },
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            let config = Config::load_or_default();
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigAction::Get { key } => {
            let config = Config::load_or_default();
            let value = match key.as_str() {
                "streak.max_lookback_days" => config.streak.max_lookback_days,
                "stats.window_days" => config.stats.window_days,
                other => return Err(format!("unknown config key: {other}").into()),
            };
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load_or_default();
            match key.as_str() {
                "streak.max_lookback_days" => config.streak.max_lookback_days = value.parse()?,
                "stats.window_days" => config.stats.window_days = value.parse()?,
                other => return Err(format!("unknown config key: {other}").into()),
            }
            config.save()?;
            println!("{key} = {value}");
        }
    }
    Ok(())
}
