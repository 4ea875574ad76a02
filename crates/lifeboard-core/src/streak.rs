//! Streak recomputation.
//!
//! Walks backward from a reference date over the habit's scheduled days:
//! non-scheduled days are skipped, completed scheduled days extend the run,
//! and the first scheduled day without a completion ends it. The walk is
//! capped so a frequency that never matches (for example an empty weekday
//! set) still terminates.

use std::collections::HashSet;

use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::habit::{Frequency, StreakRecord};
use crate::schedule::is_scheduled;

/// Default backward-scan bound, roughly three years.
pub const DEFAULT_MAX_LOOKBACK_DAYS: u32 = 1095;

/// Configuration for streak recomputation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreakConfig {
    /// How many days behind `today` the backward scan may reach.
    pub max_lookback_days: u32,
}

impl Default for StreakConfig {
    fn default() -> Self {
        Self {
            max_lookback_days: DEFAULT_MAX_LOOKBACK_DAYS,
        }
    }
}

/// Streak calculator.
///
/// Pure given its inputs: no I/O and no hidden state, so concurrent
/// recomputation for different habits needs no coordination. Callers that
/// persist the returned record must serialize updates per habit.
#[derive(Debug, Clone, Default)]
pub struct StreakCalculator {
    config: StreakConfig,
}

impl StreakCalculator {
    /// Create a calculator with the default lookback bound.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a calculator with custom config.
    pub fn with_config(config: StreakConfig) -> Self {
        Self { config }
    }

    /// Recompute the streak record for one habit.
    ///
    /// `today` is the reference date (normally wall-clock now truncated to
    /// a date), `completion_dates` the habit's distinct completed days in
    /// any order, and `previous` the stored record if one exists. The
    /// returned record carries the reconciled longest streak, which never
    /// decreases relative to `previous`.
    ///
    /// # Errors
    /// Propagates [`ValidationError::InvalidInterval`] from the schedule
    /// evaluator for an invalid custom frequency.
    pub fn recompute(
        &self,
        habit_id: &str,
        today: NaiveDate,
        frequency: &Frequency,
        completion_dates: &[NaiveDate],
        previous: Option<&StreakRecord>,
    ) -> Result<StreakRecord, ValidationError> {
        let completed: HashSet<NaiveDate> = completion_dates.iter().copied().collect();
        let floor = today - Duration::days(i64::from(self.config.max_lookback_days));

        let mut current_streak: u32 = 0;
        let mut check_date = today;
        while check_date >= floor {
            if !is_scheduled(check_date, frequency)? {
                check_date -= Duration::days(1);
                continue;
            }
            if completed.contains(&check_date) {
                current_streak += 1;
                check_date -= Duration::days(1);
            } else {
                // First scheduled day without a completion ends the run.
                break;
            }
        }

        let longest_streak = previous
            .map_or(0, |p| p.longest_streak)
            .max(current_streak);

        Ok(StreakRecord {
            habit_id: habit_id.to_string(),
            current_streak,
            longest_streak,
            last_completed_at: completed.iter().max().copied(),
            updated_at: Utc::now(),
        })
    }
}
