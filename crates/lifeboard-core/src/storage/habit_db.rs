//! SQLite-based habit, completion, and streak storage.
//!
//! Implements [`HabitStore`] over a single connection. Calendar dates are
//! stored as ISO `YYYY-MM-DD` text and rejected if malformed; audit
//! timestamps are RFC3339 text. The frequency rule is persisted in its JSON
//! wire form, so unrecognized tags read back as `Frequency::Unknown`.

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use super::data_dir;
use crate::error::{CoreError, DatabaseError};
use crate::habit::{Completion, Frequency, Habit, StreakRecord, TimeOfDay};
use crate::service::HabitStore;

const DATE_FMT: &str = "%Y-%m-%d";

/// Parse time of day from database string
fn parse_time_of_day(s: &str) -> TimeOfDay {
    match s {
        "morning" => TimeOfDay::Morning,
        "afternoon" => TimeOfDay::Afternoon,
        "evening" => TimeOfDay::Evening,
        _ => TimeOfDay::Anytime,
    }
}

/// Format time of day for database storage
fn format_time_of_day(t: TimeOfDay) -> &'static str {
    match t {
        TimeOfDay::Morning => "morning",
        TimeOfDay::Afternoon => "afternoon",
        TimeOfDay::Evening => "evening",
        TimeOfDay::Anytime => "anytime",
    }
}

/// Parse a frequency column. Unrecognized or malformed content degrades to
/// `Unknown` (always due) rather than failing the read.
fn parse_frequency(json: &str) -> Frequency {
    serde_json::from_str(json).unwrap_or(Frequency::Unknown)
}

fn format_frequency(frequency: &Frequency) -> Result<String, DatabaseError> {
    serde_json::to_string(frequency)
        .map_err(|e| DatabaseError::QueryFailed(format!("serialize frequency: {e}")))
}

/// Parse datetime from RFC3339 string with fallback to current time
fn parse_datetime_fallback(dt_str: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(dt_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Strictly parse a calendar date column.
fn parse_date(s: &str) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::parse_from_str(s, DATE_FMT)
        .map_err(|e| DatabaseError::QueryFailed(format!("malformed date '{s}': {e}")))
}

/// Build a Habit from a database row
fn row_to_habit(row: &rusqlite::Row) -> Result<Habit, rusqlite::Error> {
    let frequency_json: String = row.get(7)?;
    let time_of_day_str: String = row.get(8)?;
    let created_at_str: String = row.get(10)?;
    let updated_at_str: String = row.get(11)?;

    Ok(Habit {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        color: row.get(4)?,
        icon: row.get(5)?,
        category: row.get(6)?,
        frequency: parse_frequency(&frequency_json),
        time_of_day: parse_time_of_day(&time_of_day_str),
        archived: row.get(9)?,
        created_at: parse_datetime_fallback(&created_at_str),
        updated_at: parse_datetime_fallback(&updated_at_str),
    })
}

/// SQLite database for habit storage.
///
/// Stores habits, completions, and streak records.
pub struct HabitDb {
    conn: Connection,
}

impl HabitDb {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/lifeboard/lifeboard.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, CoreError> {
        let path = data_dir()
            .map_err(|e| CoreError::Custom(e.to_string()))?
            .join("lifeboard.db");
        Self::open_at(path)
    }

    /// Open the database at an explicit path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate().map_err(DatabaseError::from)?;
        debug!(path = %path.display(), "opened habit database");
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    #[cfg(test)]
    pub fn open_memory() -> Result<Self, CoreError> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from)?;
        let db = Self { conn };
        db.migrate().map_err(DatabaseError::from)?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS habits (
                id          TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL,
                name        TEXT NOT NULL,
                description TEXT,
                color       TEXT,
                icon        TEXT,
                category    TEXT,
                frequency   TEXT NOT NULL,
                time_of_day TEXT NOT NULL DEFAULT 'anytime',
                archived    INTEGER NOT NULL DEFAULT 0,
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS completions (
                habit_id     TEXT NOT NULL,
                completed_on TEXT NOT NULL,
                created_at   TEXT NOT NULL,
                PRIMARY KEY (habit_id, completed_on)
            );

            CREATE TABLE IF NOT EXISTS streaks (
                habit_id          TEXT PRIMARY KEY,
                current_streak    INTEGER NOT NULL,
                longest_streak    INTEGER NOT NULL,
                last_completed_at TEXT,
                updated_at        TEXT NOT NULL
            );

            -- Create indexes for common query patterns
            CREATE INDEX IF NOT EXISTS idx_habits_user_id ON habits(user_id);
            CREATE INDEX IF NOT EXISTS idx_completions_habit_id ON completions(habit_id);
            CREATE INDEX IF NOT EXISTS idx_completions_completed_on ON completions(completed_on);",
        )?;
        Ok(())
    }
}

impl HabitStore for HabitDb {
    fn insert_habit(&self, habit: &Habit) -> Result<(), DatabaseError> {
        let frequency = format_frequency(&habit.frequency)?;
        self.conn.execute(
            "INSERT INTO habits (id, user_id, name, description, color, icon, category,
                                 frequency, time_of_day, archived, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                habit.id,
                habit.user_id,
                habit.name,
                habit.description,
                habit.color,
                habit.icon,
                habit.category,
                frequency,
                format_time_of_day(habit.time_of_day),
                habit.archived,
                habit.created_at.to_rfc3339(),
                habit.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn habit(&self, id: &str) -> Result<Option<Habit>, DatabaseError> {
        let habit = self
            .conn
            .query_row(
                "SELECT id, user_id, name, description, color, icon, category,
                        frequency, time_of_day, archived, created_at, updated_at
                 FROM habits WHERE id = ?1",
                params![id],
                row_to_habit,
            )
            .optional()?;
        Ok(habit)
    }

    fn habits_for_user(&self, user_id: &str) -> Result<Vec<Habit>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, name, description, color, icon, category,
                    frequency, time_of_day, archived, created_at, updated_at
             FROM habits WHERE user_id = ?1 ORDER BY created_at",
        )?;
        let rows = stmt.query_map(params![user_id], row_to_habit)?;
        let mut habits = Vec::new();
        for row in rows {
            habits.push(row?);
        }
        Ok(habits)
    }

    fn update_habit(&self, habit: &Habit) -> Result<(), DatabaseError> {
        let frequency = format_frequency(&habit.frequency)?;
        let updated = self.conn.execute(
            "UPDATE habits SET name = ?2, description = ?3, color = ?4, icon = ?5,
                               category = ?6, frequency = ?7, time_of_day = ?8,
                               archived = ?9, updated_at = ?10
             WHERE id = ?1",
            params![
                habit.id,
                habit.name,
                habit.description,
                habit.color,
                habit.icon,
                habit.category,
                frequency,
                format_time_of_day(habit.time_of_day),
                habit.archived,
                habit.updated_at.to_rfc3339(),
            ],
        )?;
        if updated == 0 {
            return Err(DatabaseError::HabitNotFound(habit.id.clone()));
        }
        Ok(())
    }

    fn completion_dates(
        &self,
        habit_id: &str,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Vec<NaiveDate>, DatabaseError> {
        let mut query = String::from(
            "SELECT completed_on FROM completions WHERE habit_id = ?1",
        );
        if range.is_some() {
            query.push_str(" AND completed_on >= ?2 AND completed_on <= ?3");
        }
        query.push_str(" ORDER BY completed_on");

        let mut stmt = self.conn.prepare(&query)?;
        let raw: Vec<String> = match range {
            Some((from, to)) => {
                let rows = stmt.query_map(
                    params![
                        habit_id,
                        from.format(DATE_FMT).to_string(),
                        to.format(DATE_FMT).to_string()
                    ],
                    |row| row.get(0),
                )?;
                rows.collect::<Result<_, _>>()?
            }
            None => {
                let rows = stmt.query_map(params![habit_id], |row| row.get(0))?;
                rows.collect::<Result<_, _>>()?
            }
        };

        raw.iter().map(|s| parse_date(s)).collect()
    }

    fn has_completion(&self, habit_id: &str, date: NaiveDate) -> Result<bool, DatabaseError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM completions WHERE habit_id = ?1 AND completed_on = ?2",
            params![habit_id, date.format(DATE_FMT).to_string()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn insert_completion(&self, completion: &Completion) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO completions (habit_id, completed_on, created_at)
             VALUES (?1, ?2, ?3)",
            params![
                completion.habit_id,
                completion.completed_on.format(DATE_FMT).to_string(),
                completion.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn delete_completion(&self, habit_id: &str, date: NaiveDate) -> Result<(), DatabaseError> {
        self.conn.execute(
            "DELETE FROM completions WHERE habit_id = ?1 AND completed_on = ?2",
            params![habit_id, date.format(DATE_FMT).to_string()],
        )?;
        Ok(())
    }

    fn streak_record(&self, habit_id: &str) -> Result<Option<StreakRecord>, DatabaseError> {
        let row = self
            .conn
            .query_row(
                "SELECT habit_id, current_streak, longest_streak, last_completed_at, updated_at
                 FROM streaks WHERE habit_id = ?1",
                params![habit_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, u32>(1)?,
                        row.get::<_, u32>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((habit_id, current_streak, longest_streak, last_completed, updated_at)) => {
                let last_completed_at = match last_completed {
                    Some(s) => Some(parse_date(&s)?),
                    None => None,
                };
                Ok(Some(StreakRecord {
                    habit_id,
                    current_streak,
                    longest_streak,
                    last_completed_at,
                    updated_at: parse_datetime_fallback(&updated_at),
                }))
            }
            None => Ok(None),
        }
    }

    fn upsert_streak_record(&self, record: &StreakRecord) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO streaks (habit_id, current_streak, longest_streak, last_completed_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(habit_id) DO UPDATE SET
                 current_streak = excluded.current_streak,
                 longest_streak = excluded.longest_streak,
                 last_completed_at = excluded.last_completed_at,
                 updated_at = excluded.updated_at",
            params![
                record.habit_id,
                record.current_streak,
                record.longest_streak,
                record
                    .last_completed_at
                    .map(|d| d.format(DATE_FMT).to_string()),
                record.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_habit(id: &str) -> Habit {
        let now = Utc::now();
        Habit {
            id: id.to_string(),
            user_id: "u-1".to_string(),
            name: "Meditate".to_string(),
            description: Some("10 minutes".to_string()),
            color: Some("#4CAF50".to_string()),
            icon: None,
            category: Some("Mindfulness".to_string()),
            frequency: Frequency::Daily {
                days: Some(vec![1, 3, 5]),
            },
            time_of_day: TimeOfDay::Morning,
            archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn habit_roundtrip_preserves_frequency() {
        let db = HabitDb::open_memory().unwrap();
        db.insert_habit(&sample_habit("h-1")).unwrap();

        let loaded = db.habit("h-1").unwrap().unwrap();
        assert_eq!(loaded.name, "Meditate");
        assert_eq!(
            loaded.frequency,
            Frequency::Daily {
                days: Some(vec![1, 3, 5])
            }
        );
        assert_eq!(loaded.time_of_day, TimeOfDay::Morning);
    }

    #[test]
    fn malformed_frequency_column_reads_back_as_unknown() {
        let db = HabitDb::open_memory().unwrap();
        db.insert_habit(&sample_habit("h-1")).unwrap();
        db.conn()
            .execute(
                "UPDATE habits SET frequency = '{\"type\":\"weekly\",\"timesPerWeek\":2}'
                 WHERE id = 'h-1'",
                [],
            )
            .unwrap();

        let loaded = db.habit("h-1").unwrap().unwrap();
        assert_eq!(loaded.frequency, Frequency::Unknown);
    }

    #[test]
    fn duplicate_completion_is_rejected() {
        let db = HabitDb::open_memory().unwrap();
        let completion = Completion {
            habit_id: "h-1".to_string(),
            completed_on: date(2024, 3, 8),
            created_at: Utc::now(),
        };
        db.insert_completion(&completion).unwrap();
        assert!(db.insert_completion(&completion).is_err());
        assert!(db.has_completion("h-1", date(2024, 3, 8)).unwrap());
    }

    #[test]
    fn completion_dates_respect_range_filter() {
        let db = HabitDb::open_memory().unwrap();
        for day in [date(2024, 3, 1), date(2024, 3, 8), date(2024, 3, 15)] {
            db.insert_completion(&Completion {
                habit_id: "h-1".to_string(),
                completed_on: day,
                created_at: Utc::now(),
            })
            .unwrap();
        }

        let all = db.completion_dates("h-1", None).unwrap();
        assert_eq!(all.len(), 3);

        let bounded = db
            .completion_dates("h-1", Some((date(2024, 3, 5), date(2024, 3, 10))))
            .unwrap();
        assert_eq!(bounded, vec![date(2024, 3, 8)]);
    }

    #[test]
    fn malformed_completion_date_is_rejected_on_read() {
        let db = HabitDb::open_memory().unwrap();
        db.conn()
            .execute(
                "INSERT INTO completions (habit_id, completed_on, created_at)
                 VALUES ('h-1', 'not-a-date', '2024-03-08T00:00:00+00:00')",
                [],
            )
            .unwrap();
        assert!(db.completion_dates("h-1", None).is_err());
    }

    #[test]
    fn streak_record_upsert_overwrites() {
        let db = HabitDb::open_memory().unwrap();
        let mut record = StreakRecord {
            habit_id: "h-1".to_string(),
            current_streak: 2,
            longest_streak: 5,
            last_completed_at: Some(date(2024, 3, 8)),
            updated_at: Utc::now(),
        };
        db.upsert_streak_record(&record).unwrap();

        record.current_streak = 3;
        record.longest_streak = 6;
        db.upsert_streak_record(&record).unwrap();

        let loaded = db.streak_record("h-1").unwrap().unwrap();
        assert_eq!(loaded.current_streak, 3);
        assert_eq!(loaded.longest_streak, 6);
        assert_eq!(loaded.last_completed_at, Some(date(2024, 3, 8)));
    }

    #[test]
    fn updating_a_missing_habit_reports_not_found() {
        let db = HabitDb::open_memory().unwrap();
        let err = db.update_habit(&sample_habit("ghost")).unwrap_err();
        assert!(matches!(err, DatabaseError::HabitNotFound(_)));
    }
}
