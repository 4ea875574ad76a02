//! Habit orchestration over an injected repository.
//!
//! [`HabitService`] owns the trigger events around the pure engine: habit
//! creation seeds a zeroed streak record, completion toggles and frequency
//! edits recompute it, archiving only flips the flag. Storage is reached
//! through the [`HabitStore`] trait so the engine stays decoupled from any
//! particular backing technology.
//!
//! The service performs read-modify-write on streak records. Concurrent
//! callers must serialize updates per habit; different habits need no
//! coordination.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{CoreError, DatabaseError, Result};
use crate::habit::{Completion, Frequency, Habit, StreakRecord, TimeOfDay};
use crate::stats::{CalendarDay, CompletionStats, HabitStatsAnalyzer};
use crate::streak::StreakCalculator;

/// Repository interface over the habit backing store.
pub trait HabitStore {
    fn insert_habit(&self, habit: &Habit) -> Result<(), DatabaseError>;
    fn habit(&self, id: &str) -> Result<Option<Habit>, DatabaseError>;
    fn habits_for_user(&self, user_id: &str) -> Result<Vec<Habit>, DatabaseError>;
    fn update_habit(&self, habit: &Habit) -> Result<(), DatabaseError>;

    /// Distinct completion dates for a habit, optionally bounded to an
    /// inclusive date range.
    fn completion_dates(
        &self,
        habit_id: &str,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Vec<NaiveDate>, DatabaseError>;
    fn has_completion(&self, habit_id: &str, date: NaiveDate) -> Result<bool, DatabaseError>;
    fn insert_completion(&self, completion: &Completion) -> Result<(), DatabaseError>;
    fn delete_completion(&self, habit_id: &str, date: NaiveDate) -> Result<(), DatabaseError>;

    fn streak_record(&self, habit_id: &str) -> Result<Option<StreakRecord>, DatabaseError>;
    fn upsert_streak_record(&self, record: &StreakRecord) -> Result<(), DatabaseError>;
}

/// Input for creating a habit.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewHabit {
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(rename = "timeOfDay", default)]
    pub time_of_day: TimeOfDay,
}

/// Partial update for an existing habit. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HabitUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub category: Option<String>,
    pub frequency: Option<Frequency>,
    #[serde(rename = "timeOfDay")]
    pub time_of_day: Option<TimeOfDay>,
}

/// Result of a completion toggle.
#[derive(Debug, Clone, Serialize)]
pub struct ToggleOutcome {
    /// Whether the date is completed after the toggle
    pub completed: bool,
    pub record: StreakRecord,
}

/// A habit together with its streak record.
#[derive(Debug, Clone, Serialize)]
pub struct HabitDetail {
    pub habit: Habit,
    pub streak: Option<StreakRecord>,
}

/// Habit service orchestrating the engine over a [`HabitStore`].
pub struct HabitService<S: HabitStore> {
    store: S,
    calculator: StreakCalculator,
    analyzer: HabitStatsAnalyzer,
}

impl<S: HabitStore> HabitService<S> {
    /// Create a service with default calculator and analyzer settings.
    pub fn new(store: S) -> Self {
        Self {
            store,
            calculator: StreakCalculator::new(),
            analyzer: HabitStatsAnalyzer::new(),
        }
    }

    /// Create a service with explicit calculator and analyzer settings.
    pub fn with_settings(
        store: S,
        calculator: StreakCalculator,
        analyzer: HabitStatsAnalyzer,
    ) -> Self {
        Self {
            store,
            calculator,
            analyzer,
        }
    }

    /// Access the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create a habit and its zeroed streak record.
    ///
    /// # Errors
    /// Rejects an invalid frequency before writing anything.
    pub fn create_habit(&self, new: NewHabit) -> Result<(Habit, StreakRecord)> {
        new.frequency.validate()?;
        let now = Utc::now();
        let habit = Habit {
            id: Uuid::new_v4().to_string(),
            user_id: new.user_id,
            name: new.name,
            description: new.description,
            color: new.color,
            icon: new.icon,
            category: new.category,
            frequency: new.frequency,
            time_of_day: new.time_of_day,
            archived: false,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_habit(&habit)?;
        let record = StreakRecord {
            habit_id: habit.id.clone(),
            current_streak: 0,
            longest_streak: 0,
            last_completed_at: None,
            updated_at: now,
        };
        self.store.upsert_streak_record(&record)?;
        debug!(habit_id = %habit.id, name = %habit.name, "created habit");
        Ok((habit, record))
    }

    /// Toggle the completion for `date` and recompute the streak as of
    /// `today`.
    pub fn toggle_completion(
        &self,
        habit_id: &str,
        date: NaiveDate,
        today: NaiveDate,
    ) -> Result<ToggleOutcome> {
        let habit = self.require_habit(habit_id)?;
        let completed = if self.store.has_completion(habit_id, date)? {
            self.store.delete_completion(habit_id, date)?;
            false
        } else {
            self.store.insert_completion(&Completion {
                habit_id: habit_id.to_string(),
                completed_on: date,
                created_at: Utc::now(),
            })?;
            true
        };
        debug!(habit_id, %date, completed, "toggled completion");
        let record = self.recompute(&habit, today)?;
        Ok(ToggleOutcome { completed, record })
    }

    /// Apply a partial update and recompute the streak as of `today`.
    ///
    /// # Errors
    /// An invalid frequency in the update is rejected before the store is
    /// touched, leaving both the habit and its record unchanged.
    pub fn update_habit(
        &self,
        habit_id: &str,
        update: HabitUpdate,
        today: NaiveDate,
    ) -> Result<(Habit, StreakRecord)> {
        if let Some(frequency) = &update.frequency {
            frequency.validate()?;
        }
        let mut habit = self.require_habit(habit_id)?;
        if let Some(name) = update.name {
            habit.name = name;
        }
        if let Some(description) = update.description {
            habit.description = Some(description);
        }
        if let Some(color) = update.color {
            habit.color = Some(color);
        }
        if let Some(icon) = update.icon {
            habit.icon = Some(icon);
        }
        if let Some(category) = update.category {
            habit.category = Some(category);
        }
        if let Some(frequency) = update.frequency {
            habit.frequency = frequency;
        }
        if let Some(time_of_day) = update.time_of_day {
            habit.time_of_day = time_of_day;
        }
        habit.updated_at = Utc::now();
        self.store.update_habit(&habit)?;
        let record = self.recompute(&habit, today)?;
        Ok((habit, record))
    }

    /// Replace only the frequency rule and recompute.
    pub fn update_frequency(
        &self,
        habit_id: &str,
        frequency: Frequency,
        today: NaiveDate,
    ) -> Result<StreakRecord> {
        let (_, record) = self.update_habit(
            habit_id,
            HabitUpdate {
                frequency: Some(frequency),
                ..HabitUpdate::default()
            },
            today,
        )?;
        Ok(record)
    }

    /// Archive or restore a habit. Completions and the streak record are
    /// kept; no recompute happens.
    pub fn set_archived(&self, habit_id: &str, archived: bool) -> Result<Habit> {
        let mut habit = self.require_habit(habit_id)?;
        habit.archived = archived;
        habit.updated_at = Utc::now();
        self.store.update_habit(&habit)?;
        debug!(habit_id, archived, "set archived flag");
        Ok(habit)
    }

    /// Habits owned by `user_id`, optionally including archived ones.
    pub fn habits_for_user(&self, user_id: &str, include_archived: bool) -> Result<Vec<Habit>> {
        let mut habits = self.store.habits_for_user(user_id)?;
        if !include_archived {
            habits.retain(|h| !h.archived);
        }
        Ok(habits)
    }

    /// A habit together with its stored streak record.
    pub fn habit_detail(&self, habit_id: &str) -> Result<HabitDetail> {
        let habit = self.require_habit(habit_id)?;
        let streak = self.store.streak_record(habit_id)?;
        Ok(HabitDetail { habit, streak })
    }

    /// Completion statistics for a habit as of `today`.
    pub fn completion_stats(&self, habit_id: &str, today: NaiveDate) -> Result<CompletionStats> {
        let habit = self.require_habit(habit_id)?;
        let completions = self.store.completion_dates(habit_id, None)?;
        Ok(self
            .analyzer
            .completion_stats(today, &habit.frequency, &completions)?)
    }

    /// Month calendar for a habit.
    pub fn month_calendar(
        &self,
        habit_id: &str,
        year: i32,
        month: u32,
    ) -> Result<Vec<CalendarDay>> {
        let habit = self.require_habit(habit_id)?;
        let completions = self.store.completion_dates(habit_id, None)?;
        Ok(self
            .analyzer
            .month_calendar(year, month, &habit.frequency, &completions)?)
    }

    fn require_habit(&self, habit_id: &str) -> Result<Habit> {
        self.store.habit(habit_id)?.ok_or_else(|| {
            CoreError::Database(DatabaseError::HabitNotFound(habit_id.to_string()))
        })
    }

    fn recompute(&self, habit: &Habit, today: NaiveDate) -> Result<StreakRecord> {
        let completions = self.store.completion_dates(&habit.id, None)?;
        let previous = self.store.streak_record(&habit.id)?;
        let record = self.calculator.recompute(
            &habit.id,
            today,
            &habit.frequency,
            &completions,
            previous.as_ref(),
        )?;
        self.store.upsert_streak_record(&record)?;
        debug!(
            habit_id = %habit.id,
            current = record.current_streak,
            longest = record.longest_streak,
            "recomputed streak"
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::HabitDb;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn service() -> HabitService<HabitDb> {
        HabitService::new(HabitDb::open_memory().unwrap())
    }

    fn weekday_habit(service: &HabitService<HabitDb>) -> Habit {
        let (habit, record) = service
            .create_habit(NewHabit {
                user_id: "u-1".into(),
                name: "Exercise".into(),
                frequency: Frequency::Daily {
                    days: Some(vec![1, 2, 3, 4, 5]),
                },
                ..NewHabit::default()
            })
            .unwrap();
        assert_eq!(record.current_streak, 0);
        assert_eq!(record.longest_streak, 0);
        habit
    }

    #[test]
    fn create_rejects_invalid_frequency_without_writing() {
        let service = service();
        let err = service
            .create_habit(NewHabit {
                user_id: "u-1".into(),
                name: "Broken".into(),
                frequency: Frequency::Custom {
                    interval: 0,
                    start_date: date(2024, 1, 1),
                },
                ..NewHabit::default()
            })
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(service.habits_for_user("u-1", true).unwrap().is_empty());
    }

    #[test]
    fn toggle_builds_and_breaks_a_streak() {
        let service = service();
        let habit = weekday_habit(&service);
        let today = date(2024, 3, 10);

        for day in [date(2024, 3, 6), date(2024, 3, 7), date(2024, 3, 8)] {
            let outcome = service.toggle_completion(&habit.id, day, today).unwrap();
            assert!(outcome.completed);
        }
        let detail = service.habit_detail(&habit.id).unwrap();
        assert_eq!(detail.streak.as_ref().unwrap().current_streak, 3);

        // Untoggling Friday leaves a gap right behind the weekend.
        let outcome = service
            .toggle_completion(&habit.id, date(2024, 3, 8), today)
            .unwrap();
        assert!(!outcome.completed);
        assert_eq!(outcome.record.current_streak, 0);
        assert_eq!(outcome.record.longest_streak, 3);
    }

    #[test]
    fn invalid_frequency_update_leaves_state_intact() {
        let service = service();
        let habit = weekday_habit(&service);
        let today = date(2024, 3, 10);
        service
            .toggle_completion(&habit.id, date(2024, 3, 8), today)
            .unwrap();

        let err = service
            .update_frequency(
                &habit.id,
                Frequency::Custom {
                    interval: -7,
                    start_date: date(2024, 1, 1),
                },
                today,
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        let detail = service.habit_detail(&habit.id).unwrap();
        assert_eq!(
            detail.habit.frequency,
            Frequency::Daily {
                days: Some(vec![1, 2, 3, 4, 5])
            }
        );
        assert_eq!(detail.streak.unwrap().current_streak, 1);
    }

    #[test]
    fn frequency_update_recomputes_under_the_new_rule() {
        let service = service();
        let habit = weekday_habit(&service);
        let today = date(2024, 3, 10);
        service
            .toggle_completion(&habit.id, date(2024, 3, 8), today)
            .unwrap();

        // Friday-only schedule: 03-09/03-10 are skipped, 03-08 counts.
        let record = service
            .update_frequency(&habit.id, Frequency::Daily { days: Some(vec![5]) }, today)
            .unwrap();
        assert_eq!(record.current_streak, 1);
    }

    #[test]
    fn archiving_keeps_completions_and_record() {
        let service = service();
        let habit = weekday_habit(&service);
        let today = date(2024, 3, 10);
        service
            .toggle_completion(&habit.id, date(2024, 3, 8), today)
            .unwrap();

        let archived = service.set_archived(&habit.id, true).unwrap();
        assert!(archived.archived);
        assert!(service
            .habits_for_user("u-1", false)
            .unwrap()
            .is_empty());
        assert_eq!(service.habits_for_user("u-1", true).unwrap().len(), 1);

        let detail = service.habit_detail(&habit.id).unwrap();
        assert_eq!(detail.streak.unwrap().current_streak, 1);
        assert_eq!(
            service
                .store()
                .completion_dates(&habit.id, None)
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn unknown_habit_is_reported_as_not_found() {
        let service = service();
        let err = service.habit_detail("missing").unwrap_err();
        assert!(matches!(
            err,
            CoreError::Database(DatabaseError::HabitNotFound(_))
        ));
    }
}
