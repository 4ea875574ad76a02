//! # Lifeboard Core Library
//!
//! This library provides the habit-tracking core of the Lifeboard personal
//! dashboard. It implements a CLI-first philosophy where all operations are
//! available via a standalone CLI binary, with any outer HTTP or GUI layer
//! being a thin shell over the same core library.
//!
//! ## Architecture
//!
//! - **Schedule Evaluator**: decides whether a habit is due on a calendar
//!   date given its frequency rule
//! - **Streak Calculator**: walks backward over due dates to compute the
//!   current run and reconcile the longest-streak record
//! - **Storage**: SQLite-based habit/completion/streak storage and
//!   TOML-based configuration
//! - **Service**: trigger-event orchestration (create, toggle, reschedule,
//!   archive) over an injected repository
//!
//! ## Key Components
//!
//! - [`is_scheduled`]: The schedule evaluation function
//! - [`StreakCalculator`]: Streak recomputation
//! - [`HabitService`]: Orchestration over a [`HabitStore`]
//! - [`HabitDb`]: SQLite repository implementation

pub mod error;
pub mod habit;
pub mod schedule;
pub mod service;
pub mod stats;
pub mod storage;
pub mod streak;

pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use habit::{Completion, Frequency, Habit, StreakRecord, TimeOfDay};
pub use schedule::is_scheduled;
pub use service::{HabitDetail, HabitService, HabitStore, HabitUpdate, NewHabit, ToggleOutcome};
pub use stats::{CalendarDay, CompletionStats, HabitStatsAnalyzer};
pub use storage::{Config, HabitDb};
pub use streak::{StreakCalculator, StreakConfig};
