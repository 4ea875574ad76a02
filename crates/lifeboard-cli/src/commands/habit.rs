//! Habit management commands for CLI.

use chrono::{Local, NaiveDate};
use clap::Subcommand;
use lifeboard_core::habit::{Frequency, TimeOfDay};
use lifeboard_core::service::{HabitService, HabitUpdate, NewHabit};
use lifeboard_core::storage::{Config, HabitDb};

#[derive(Subcommand)]
pub enum HabitAction {
    /// Create a new habit
    Add {
        /// Habit name
        name: String,
        /// Owning user ID
        #[arg(long, default_value = "local")]
        user: String,
        /// Habit description
        #[arg(long)]
        description: Option<String>,
        /// Display color (hex)
        #[arg(long)]
        color: Option<String>,
        /// Icon name
        #[arg(long)]
        icon: Option<String>,
        /// Category label
        #[arg(long)]
        category: Option<String>,
        /// Comma-separated weekdays, 0=Sun..6=Sat (default: every day)
        #[arg(long, conflicts_with_all = ["interval", "start_date"])]
        days: Option<String>,
        /// Repeat every N days counted from --start-date
        #[arg(long, requires = "start_date")]
        interval: Option<i64>,
        /// Start date (YYYY-MM-DD) for an interval habit
        #[arg(long)]
        start_date: Option<NaiveDate>,
        /// morning, afternoon, evening, or anytime (default: anytime)
        #[arg(long, default_value = "anytime")]
        time_of_day: String,
    },
    /// List habits for a user
    List {
        /// Owning user ID
        #[arg(long, default_value = "local")]
        user: String,
        /// Include archived habits
        #[arg(long)]
        include_archived: bool,
    },
    /// Show a habit with its streak record
    Show {
        /// Habit ID
        id: String,
    },
    /// Update a habit
    Update {
        /// Habit ID
        id: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New description
        #[arg(long)]
        description: Option<String>,
        /// New color
        #[arg(long)]
        color: Option<String>,
        /// New icon
        #[arg(long)]
        icon: Option<String>,
        /// New category
        #[arg(long)]
        category: Option<String>,
        /// New weekday list, 0=Sun..6=Sat
        #[arg(long, conflicts_with_all = ["interval", "start_date"])]
        days: Option<String>,
        /// New repeat interval in days
        #[arg(long, requires = "start_date")]
        interval: Option<i64>,
        /// New start date for an interval habit
        #[arg(long)]
        start_date: Option<NaiveDate>,
        /// New time of day
        #[arg(long)]
        time_of_day: Option<String>,
    },
    /// Archive (or restore) a habit
    Archive {
        /// Habit ID
        id: String,
        /// Restore instead of archiving
        #[arg(long)]
        restore: bool,
    },
    /// Toggle the completion for a date
    Complete {
        /// Habit ID
        id: String,
        /// Date to toggle (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

pub(crate) fn open_service() -> Result<HabitService<HabitDb>, Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let db = HabitDb::open()?;
    Ok(HabitService::with_settings(
        db,
        config.streak_calculator(),
        config.stats_analyzer(),
    ))
}

fn parse_days(days: &str) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    days.split(',')
        .map(|part| {
            let day: u8 = part.trim().parse()?;
            if day > 6 {
                return Err(format!("weekday {day} out of range 0..=6").into());
            }
            Ok(day)
        })
        .collect()
}

fn parse_time_of_day(value: &str) -> Result<TimeOfDay, Box<dyn std::error::Error>> {
    match value {
        "morning" => Ok(TimeOfDay::Morning),
        "afternoon" => Ok(TimeOfDay::Afternoon),
        "evening" => Ok(TimeOfDay::Evening),
        "anytime" => Ok(TimeOfDay::Anytime),
        other => Err(format!(
            "unknown time of day '{other}' (expected morning, afternoon, evening, or anytime)"
        )
        .into()),
    }
}

/// Build a frequency from the shared --days/--interval/--start-date flags.
/// Returns None when no schedule flag was given.
fn build_frequency(
    days: Option<String>,
    interval: Option<i64>,
    start_date: Option<NaiveDate>,
) -> Result<Option<Frequency>, Box<dyn std::error::Error>> {
    if let Some(interval) = interval {
        let start_date = start_date.ok_or("--start-date is required with --interval")?;
        let frequency = Frequency::Custom {
            interval,
            start_date,
        };
        frequency.validate()?;
        return Ok(Some(frequency));
    }
    if start_date.is_some() {
        return Err("--interval is required with --start-date".into());
    }
    if let Some(days) = days {
        return Ok(Some(Frequency::Daily {
            days: Some(parse_days(&days)?),
        }));
    }
    Ok(None)
}

pub fn run(action: HabitAction) -> Result<(), Box<dyn std::error::Error>> {
    let service = open_service()?;
    let today = Local::now().date_naive();

    match action {
        HabitAction::Add {
            name,
            user,
            description,
            color,
            icon,
            category,
            days,
            interval,
            start_date,
            time_of_day,
        } => {
            let frequency = build_frequency(days, interval, start_date)?.unwrap_or_default();
            let (habit, record) = service.create_habit(NewHabit {
                user_id: user,
                name,
                description,
                color,
                icon,
                category,
                frequency,
                time_of_day: parse_time_of_day(&time_of_day)?,
            })?;
            println!("{}", serde_json::to_string_pretty(&habit)?);
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        HabitAction::List {
            user,
            include_archived,
        } => {
            let habits = service.habits_for_user(&user, include_archived)?;
            println!("{}", serde_json::to_string_pretty(&habits)?);
        }
        HabitAction::Show { id } => {
            let detail = service.habit_detail(&id)?;
            println!("{}", serde_json::to_string_pretty(&detail)?);
        }
        HabitAction::Update {
            id,
            name,
            description,
            color,
            icon,
            category,
            days,
            interval,
            start_date,
            time_of_day,
        } => {
            let update = HabitUpdate {
                name,
                description,
                color,
                icon,
                category,
                frequency: build_frequency(days, interval, start_date)?,
                time_of_day: time_of_day.as_deref().map(parse_time_of_day).transpose()?,
            };
            let (habit, record) = service.update_habit(&id, update, today)?;
            println!("{}", serde_json::to_string_pretty(&habit)?);
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        HabitAction::Archive { id, restore } => {
            let habit = service.set_archived(&id, !restore)?;
            println!("{}", serde_json::to_string_pretty(&habit)?);
        }
        HabitAction::Complete { id, date } => {
            let outcome = service.toggle_completion(&id, date.unwrap_or(today), today)?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
    }
    Ok(())
}
