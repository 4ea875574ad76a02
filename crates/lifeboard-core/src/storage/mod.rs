mod config;
pub mod habit_db;

pub use config::{Config, StatsSettings, StreakSettings};
pub use habit_db::HabitDb;

use std::path::PathBuf;

/// Returns `~/.config/lifeboard[-dev]/` based on LIFEBOARD_ENV.
///
/// Set LIFEBOARD_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("LIFEBOARD_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("lifeboard-dev")
    } else {
        base_dir.join("lifeboard")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
