//! Habit domain types: habits, frequency rules, completions, streak records.
//!
//! Wire shapes follow the dashboard API: frequency is an internally tagged
//! JSON object (`{"type": "daily", "days": [...]}`) and weekdays are numbered
//! 0=Sunday through 6=Saturday.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// How often a habit is due.
///
/// Tags the engine has no rule for deserialize into [`Frequency::Unknown`],
/// which is always due. The legacy `weekly` type lands here as well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Frequency {
    /// Due on the listed weekdays (0=Sun..6=Sat). No list means every day.
    Daily {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        days: Option<Vec<u8>>,
    },
    /// Due every `interval` days counted from `start_date`, in both directions.
    Custom {
        interval: i64,
        #[serde(rename = "startDate")]
        start_date: NaiveDate,
    },
    /// Unrecognized frequency tag. Treated as due every day.
    #[serde(other)]
    Unknown,
}

impl Frequency {
    /// Reject configurations the schedule evaluator cannot resolve.
    ///
    /// Callers persisting a frequency must validate it first so a bad write
    /// is refused instead of surfacing later during recomputation.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Frequency::Custom { interval, .. } = self {
            if *interval <= 0 {
                return Err(ValidationError::InvalidInterval {
                    interval: *interval,
                });
            }
        }
        Ok(())
    }
}

impl Default for Frequency {
    fn default() -> Self {
        Frequency::Daily { days: None }
    }
}

/// Preferred time of day for a habit. Display metadata only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Anytime,
}

impl Default for TimeOfDay {
    fn default() -> Self {
        TimeOfDay::Anytime
    }
}

/// A tracked habit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habit {
    /// Unique identifier
    pub id: String,
    /// Owning user
    pub user_id: String,
    /// Display name
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Schedule rule. Missing on the wire means due every day.
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(rename = "timeOfDay", default)]
    pub time_of_day: TimeOfDay,
    /// Soft-delete flag. Archived habits keep their completions and record.
    #[serde(default)]
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One completed day for a habit. At most one row per (habit, date);
/// toggling a day off removes the row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub habit_id: String,
    /// Calendar date with no time component.
    pub completed_on: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Per-habit streak state, recomputed after every completion toggle or
/// frequency edit. `longest_streak >= current_streak` holds at rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakRecord {
    pub habit_id: String,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_completed_at: Option<NaiveDate>,
    pub updated_at: DateTime<Utc>,
}
