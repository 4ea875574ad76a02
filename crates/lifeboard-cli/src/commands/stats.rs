//! Streak and statistics commands for CLI.

use chrono::{Datelike, Local};
use clap::Subcommand;

use super::habit::open_service;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Current and longest streak for a habit
    Streak {
        /// Habit ID
        id: String,
    },
    /// Completion statistics over the configured window
    Show {
        /// Habit ID
        id: String,
    },
    /// Month calendar with scheduled/completed flags
    Calendar {
        /// Habit ID
        id: String,
        /// Year (default: current)
        #[arg(long)]
        year: Option<i32>,
        /// Month 1-12 (default: current)
        #[arg(long)]
        month: Option<u32>,
    },
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let service = open_service()?;
    let today = Local::now().date_naive();

    match action {
        StatsAction::Streak { id } => {
            let detail = service.habit_detail(&id)?;
            println!("{}", serde_json::to_string_pretty(&detail.streak)?);
        }
        StatsAction::Show { id } => {
            let stats = service.completion_stats(&id, today)?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        StatsAction::Calendar { id, year, month } => {
            let calendar = service.month_calendar(
                &id,
                year.unwrap_or_else(|| today.year()),
                month.unwrap_or_else(|| today.month()),
            )?;
            println!("{}", serde_json::to_string_pretty(&calendar)?);
        }
    }
    Ok(())
}
