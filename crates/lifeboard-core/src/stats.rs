//! Habit completion analytics.
//!
//! Completion rate is measured against *scheduled* days only: a weekday-only
//! habit is not penalized for untouched weekends. Week and month counters
//! tally raw completions the way the dashboard widgets display them, with
//! weeks starting on Sunday to match the 0=Sunday weekday convention.

use std::collections::HashSet;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::habit::Frequency;
use crate::schedule::is_scheduled;

/// Completion statistics over a trailing window.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletionStats {
    /// Scheduled days inside the window
    pub scheduled_days: u32,
    /// Scheduled days with a completion
    pub completed_days: u32,
    /// completed/scheduled as a percentage (0.0 when nothing was scheduled)
    pub completion_rate: f64,
    /// Completions in the current Sunday-first week
    pub this_week: u32,
    /// Completions in the current calendar month
    pub this_month: u32,
}

/// One cell of a habit month calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub scheduled: bool,
    pub completed: bool,
}

/// Analyzer for per-habit completion statistics.
#[derive(Debug, Clone)]
pub struct HabitStatsAnalyzer {
    /// Trailing window length in days for the completion rate.
    pub window_days: u32,
}

impl Default for HabitStatsAnalyzer {
    fn default() -> Self {
        Self { window_days: 30 }
    }
}

impl HabitStatsAnalyzer {
    /// Create an analyzer with the default 30-day window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an analyzer with a custom window.
    pub fn with_window(window_days: u32) -> Self {
        Self { window_days }
    }

    /// Compute completion statistics as of `today`.
    ///
    /// # Errors
    /// Propagates [`ValidationError::InvalidInterval`] from the schedule
    /// evaluator.
    pub fn completion_stats(
        &self,
        today: NaiveDate,
        frequency: &Frequency,
        completions: &[NaiveDate],
    ) -> Result<CompletionStats, ValidationError> {
        let completed: HashSet<NaiveDate> = completions.iter().copied().collect();

        let mut scheduled_days: u32 = 0;
        let mut completed_days: u32 = 0;
        for offset in 0..self.window_days {
            let date = today - Duration::days(i64::from(offset));
            if is_scheduled(date, frequency)? {
                scheduled_days += 1;
                if completed.contains(&date) {
                    completed_days += 1;
                }
            }
        }
        let completion_rate = if scheduled_days > 0 {
            f64::from(completed_days) / f64::from(scheduled_days) * 100.0
        } else {
            0.0
        };

        let week_start =
            today - Duration::days(i64::from(today.weekday().num_days_from_sunday()));
        let this_week = completed
            .iter()
            .filter(|d| **d >= week_start && **d <= today)
            .count() as u32;

        let month_start = today.with_day(1).unwrap_or(today);
        let this_month = completed
            .iter()
            .filter(|d| **d >= month_start && **d <= today)
            .count() as u32;

        Ok(CompletionStats {
            scheduled_days,
            completed_days,
            completion_rate,
            this_week,
            this_month,
        })
    }

    /// Scheduled/completed flags for every day of a calendar month.
    ///
    /// # Errors
    /// Returns an error for an invalid year/month pair, and propagates
    /// evaluator errors.
    pub fn month_calendar(
        &self,
        year: i32,
        month: u32,
        frequency: &Frequency,
        completions: &[NaiveDate],
    ) -> Result<Vec<CalendarDay>, ValidationError> {
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            ValidationError::InvalidValue {
                field: "month".to_string(),
                message: format!("{year}-{month:02} is not a calendar month"),
            }
        })?;
        let completed: HashSet<NaiveDate> = completions.iter().copied().collect();

        let mut days = Vec::with_capacity(31);
        let mut date = first;
        while date.month() == month {
            days.push(CalendarDay {
                date,
                scheduled: is_scheduled(date, frequency)?,
                completed: completed.contains(&date),
            });
            match date.succ_opt() {
                Some(next) => date = next,
                None => break,
            }
        }
        Ok(days)
    }
}
