//! TOML-based engine configuration.
//!
//! Stores the tunables of the streak engine and statistics:
//! - `[streak] max_lookback_days` — backward-scan bound for recomputation
//! - `[stats] window_days` — trailing window for the completion rate
//!
//! Configuration is stored at `~/.config/lifeboard/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::stats::HabitStatsAnalyzer;
use crate::streak::{StreakCalculator, StreakConfig, DEFAULT_MAX_LOOKBACK_DAYS};

/// Streak-engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreakSettings {
    #[serde(default = "default_max_lookback_days")]
    pub max_lookback_days: u32,
}

/// Statistics settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSettings {
    #[serde(default = "default_window_days")]
    pub window_days: u32,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/lifeboard/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub streak: StreakSettings,
    #[serde(default)]
    pub stats: StatsSettings,
}

fn default_max_lookback_days() -> u32 {
    DEFAULT_MAX_LOOKBACK_DAYS
}

fn default_window_days() -> u32 {
    30
}

impl Default for StreakSettings {
    fn default() -> Self {
        Self {
            max_lookback_days: default_max_lookback_days(),
        }
    }
}

impl Default for StatsSettings {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content)?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(Self::path()?, content)?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Streak calculator configured from this config.
    pub fn streak_calculator(&self) -> StreakCalculator {
        StreakCalculator::with_config(StreakConfig {
            max_lookback_days: self.streak.max_lookback_days,
        })
    }

    /// Stats analyzer configured from this config.
    pub fn stats_analyzer(&self) -> HabitStatsAnalyzer {
        HabitStatsAnalyzer::with_window(self.stats.window_days)
    }
}
