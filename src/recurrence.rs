//! Recurrence evaluation: decide whether a recurring task is due on a date.

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

use crate::model::{RecurrenceType, Task, Weekday};

/// Malformed recurrence state encountered during evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RecurrenceError {
    #[error("task is not recurring")]
    NotRecurring,
    #[error("recurring task has no recurrence type")]
    MissingType,
    #[error("weekly task has no recurrence days")]
    EmptyWeekdays,
    #[error("monthly task has no anchor date")]
    MissingAnchor,
}

/// Decide whether a recurring task is due on `reference`.
///
/// Deterministic and side-effect free. Time-of-day is ignored; only the
/// calendar date matters. `daily` tasks are always due; `weekly` tasks are
/// due when the reference weekday appears in the task's day list; `monthly`
/// tasks are due when the reference day-of-month equals the anchor
/// (`scheduled_date`) day-of-month. A monthly task anchored on day 29-31 is
/// simply not due in months without that day.
///
/// Only recurring tasks are legal input; one-off tasks are matched by exact
/// scheduled-date equality elsewhere, never through this function.
pub fn is_due(task: &Task, reference: NaiveDate) -> Result<bool, RecurrenceError> {
    if !task.is_recurring {
        return Err(RecurrenceError::NotRecurring);
    }

    match task.recurrence_type {
        None => Err(RecurrenceError::MissingType),
        Some(RecurrenceType::Daily) => Ok(true),
        Some(RecurrenceType::Weekly) => {
            if task.recurrence_days.is_empty() {
                return Err(RecurrenceError::EmptyWeekdays);
            }
            let weekday = Weekday::from(reference.weekday());
            Ok(task.recurrence_days.contains(&weekday))
        }
        Some(RecurrenceType::Monthly) => {
            let anchor = task.scheduled_date.ok_or(RecurrenceError::MissingAnchor)?;
            Ok(anchor.day() == reference.day())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn recurring(
        recurrence_type: Option<RecurrenceType>,
        recurrence_days: Vec<Weekday>,
        anchor: Option<(i32, u32, u32)>,
    ) -> Task {
        let now = Utc::now();
        Task {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            title: "recurring".to_string(),
            description: None,
            card_color: "#ffffff".to_string(),
            is_recurring: true,
            recurrence_type,
            recurrence_days,
            tags: Vec::new(),
            is_completed: false,
            scheduled_date: anchor.map(|(y, m, d)| {
                Utc.with_ymd_and_hms(y, m, d, 9, 0, 0)
                    .single()
                    .expect("valid anchor date")
            }),
            created_at: now,
            updated_at: now,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn daily_is_always_due() {
        let task = recurring(Some(RecurrenceType::Daily), Vec::new(), None);
        assert_eq!(is_due(&task, date(2026, 8, 6)), Ok(true));
        assert_eq!(is_due(&task, date(2026, 12, 31)), Ok(true));
    }

    #[test]
    fn weekly_matches_listed_weekdays_only() {
        let task = recurring(
            Some(RecurrenceType::Weekly),
            vec![Weekday::Monday, Weekday::Wednesday],
            None,
        );
        // 2026-08-04 is a Tuesday, 2026-08-05 a Wednesday.
        assert_eq!(is_due(&task, date(2026, 8, 4)), Ok(false));
        assert_eq!(is_due(&task, date(2026, 8, 5)), Ok(true));
    }

    #[test]
    fn weekly_without_days_is_malformed() {
        let task = recurring(Some(RecurrenceType::Weekly), Vec::new(), None);
        assert_eq!(
            is_due(&task, date(2026, 8, 5)),
            Err(RecurrenceError::EmptyWeekdays)
        );
    }

    #[test]
    fn monthly_matches_anchor_day_of_month() {
        let task = recurring(Some(RecurrenceType::Monthly), Vec::new(), Some((2026, 1, 15)));
        assert_eq!(is_due(&task, date(2026, 3, 15)), Ok(true));
        assert_eq!(is_due(&task, date(2026, 3, 16)), Ok(false));
    }

    #[test]
    fn monthly_day_31_never_matches_february() {
        let task = recurring(Some(RecurrenceType::Monthly), Vec::new(), Some((2026, 1, 31)));
        // Not an error: months without the anchor day just have no occurrence.
        assert_eq!(is_due(&task, date(2026, 2, 28)), Ok(false));
    }

    #[test]
    fn monthly_without_anchor_is_malformed() {
        let task = recurring(Some(RecurrenceType::Monthly), Vec::new(), None);
        assert_eq!(
            is_due(&task, date(2026, 2, 28)),
            Err(RecurrenceError::MissingAnchor)
        );
    }

    #[test]
    fn non_recurring_task_is_a_contract_violation() {
        let mut task = recurring(Some(RecurrenceType::Daily), Vec::new(), None);
        task.is_recurring = false;
        assert_eq!(
            is_due(&task, date(2026, 8, 6)),
            Err(RecurrenceError::NotRecurring)
        );
    }

    #[test]
    fn recurring_without_type_is_malformed() {
        let task = recurring(None, Vec::new(), None);
        assert_eq!(
            is_due(&task, date(2026, 8, 6)),
            Err(RecurrenceError::MissingType)
        );
    }
}
