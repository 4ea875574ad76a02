//! Schedule evaluation: decides whether a habit is due on a calendar date.

use chrono::{Datelike, NaiveDate};

use crate::error::ValidationError;
use crate::habit::Frequency;

/// Returns whether `frequency` makes a habit due on `date`.
///
/// Works for any date, past or future. `Daily` checks membership of the
/// date's weekday (0=Sun..6=Sat) in the configured day set, defaulting to
/// every day when no set is configured. `Custom` is due every `interval`
/// days from `start_date`; the offset uses floor-mod so dates before the
/// start still land on the same grid. Unrecognized frequency tags are
/// always due.
///
/// # Errors
/// Returns [`ValidationError::InvalidInterval`] for a custom frequency
/// with `interval <= 0`.
pub fn is_scheduled(date: NaiveDate, frequency: &Frequency) -> Result<bool, ValidationError> {
    match frequency {
        Frequency::Daily { days } => match days {
            Some(days) => {
                let weekday = date.weekday().num_days_from_sunday() as u8;
                Ok(days.contains(&weekday))
            }
            None => Ok(true),
        },
        Frequency::Custom {
            interval,
            start_date,
        } => {
            if *interval <= 0 {
                return Err(ValidationError::InvalidInterval {
                    interval: *interval,
                });
            }
            let days_since_start = (date - *start_date).num_days();
            Ok(days_since_start.rem_euclid(*interval) == 0)
        }
        Frequency::Unknown => Ok(true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn weekday_set_uses_sunday_zero_numbering() {
        let weekdays = Frequency::Daily {
            days: Some(vec![1, 2, 3, 4, 5]),
        };
        // 2024-03-06 Wed, 2024-03-09 Sat, 2024-03-10 Sun
        assert!(is_scheduled(date(2024, 3, 6), &weekdays).unwrap());
        assert!(!is_scheduled(date(2024, 3, 9), &weekdays).unwrap());
        assert!(!is_scheduled(date(2024, 3, 10), &weekdays).unwrap());
    }

    #[test]
    fn daily_without_day_set_is_due_every_day() {
        let freq = Frequency::Daily { days: None };
        for offset in 0..7 {
            let d = date(2024, 3, 4) + chrono::Duration::days(offset);
            assert!(is_scheduled(d, &freq).unwrap());
        }
    }

    #[test]
    fn daily_with_empty_day_set_is_never_due() {
        let freq = Frequency::Daily { days: Some(vec![]) };
        assert!(!is_scheduled(date(2024, 3, 6), &freq).unwrap());
    }

    #[test]
    fn custom_interval_due_on_grid_days() {
        let freq = Frequency::Custom {
            interval: 3,
            start_date: date(2024, 1, 1),
        };
        assert!(is_scheduled(date(2024, 1, 1), &freq).unwrap());
        assert!(is_scheduled(date(2024, 1, 4), &freq).unwrap());
        assert!(!is_scheduled(date(2024, 1, 5), &freq).unwrap());
    }

    #[test]
    fn custom_interval_handles_dates_before_start() {
        let freq = Frequency::Custom {
            interval: 3,
            start_date: date(2024, 1, 1),
        };
        // -3 days: on the grid. -1 day: off it.
        assert!(is_scheduled(date(2023, 12, 29), &freq).unwrap());
        assert!(!is_scheduled(date(2023, 12, 31), &freq).unwrap());
    }

    #[test]
    fn custom_interval_zero_or_negative_is_an_error() {
        for interval in [0, -2] {
            let freq = Frequency::Custom {
                interval,
                start_date: date(2024, 1, 1),
            };
            let err = is_scheduled(date(2024, 1, 4), &freq).unwrap_err();
            assert!(matches!(err, ValidationError::InvalidInterval { .. }));
        }
    }

    #[test]
    fn unknown_frequency_is_always_due() {
        assert!(is_scheduled(date(2024, 3, 9), &Frequency::Unknown).unwrap());
        assert!(is_scheduled(date(1999, 12, 31), &Frequency::Unknown).unwrap());
    }

    proptest! {
        #[test]
        fn custom_matches_floor_mod_for_any_offset(offset in -2000i64..2000, interval in 1i64..60) {
            let start = date(2024, 1, 1);
            let freq = Frequency::Custom { interval, start_date: start };
            let d = start + chrono::Duration::days(offset);
            let due = is_scheduled(d, &freq).unwrap();
            prop_assert_eq!(due, offset.rem_euclid(interval) == 0);
        }

        #[test]
        fn evaluation_is_deterministic(offset in -2000i64..2000, day_bits in 0u8..128) {
            let days: Vec<u8> = (0..7).filter(|d| day_bits & (1 << d) != 0).collect();
            let freq = Frequency::Daily { days: Some(days) };
            let d = date(2024, 1, 1) + chrono::Duration::days(offset);
            prop_assert_eq!(
                is_scheduled(d, &freq).unwrap(),
                is_scheduled(d, &freq).unwrap()
            );
        }
    }
}
