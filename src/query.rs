//! Task query planning.
//!
//! The planner turns a resolved owner identity plus request parameters into
//! a declarative [`TaskQuery`] (filter, sort, skip, limit). Execution is the
//! store's responsibility; both backends interpret the same descriptor, so
//! the plan is the single source of truth for what a listing means.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

use crate::model::Weekday;
use crate::pagination::ListParams;

/// Declarative description of a task query, always scoped to one owner.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskQuery {
    pub owner_id: Uuid,
    pub filter: TaskFilter,
    pub sort: TaskSort,
    pub skip: u64,
    pub limit: Option<u64>,
}

/// Filter predicate applied on top of the owner scope.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskFilter {
    /// Every task the owner has.
    All,
    /// Case-insensitive substring match on the title.
    TitleContains(String),
    /// One-off predicate: scheduled within the inclusive window.
    ScheduledWithin {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    /// Composite due-today predicate: tasks scheduled within the window,
    /// unioned with recurring tasks whose rule matches the reference day.
    /// Expressed as a single store-side OR so the result is one snapshot.
    DueOn {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        weekday: Weekday,
        day_of_month: u32,
    },
}

/// Ordering requirement for a query result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskSort {
    /// No ordering requirement (counts).
    Unsorted,
    /// Scheduled date descending, then title ascending; dateless tasks last.
    ScheduledDescTitleAsc,
    /// Scheduled date ascending, dateless tasks last, ties broken by title.
    ScheduledAscDatelessLast,
}

/// Inclusive `[start-of-day, end-of-day]` bounds of `reference` in UTC.
pub fn day_bounds(reference: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = reference.and_time(NaiveTime::MIN).and_utc();
    let end = start + Duration::days(1) - Duration::milliseconds(1);
    (start, end)
}

/// Plan the paginated list query for one owner.
pub fn list_query(owner_id: Uuid, params: &ListParams) -> TaskQuery {
    let filter = match &params.search {
        Some(term) => TaskFilter::TitleContains(term.clone()),
        None => TaskFilter::All,
    };
    TaskQuery {
        owner_id,
        filter,
        sort: TaskSort::ScheduledDescTitleAsc,
        skip: (params.page - 1) * params.limit,
        limit: Some(params.limit),
    }
}

/// Plan the today-count query.
///
/// Counts only one-off tasks scheduled within the reference day; recurring
/// tasks are not part of this count even though the today listing includes
/// them.
pub fn today_count_query(owner_id: Uuid, reference: NaiveDate) -> TaskQuery {
    let (start, end) = day_bounds(reference);
    TaskQuery {
        owner_id,
        filter: TaskFilter::ScheduledWithin { start, end },
        sort: TaskSort::Unsorted,
        skip: 0,
        limit: None,
    }
}

/// Plan the today-list query: one composite query covering both one-off
/// tasks dated today and recurring tasks due today.
pub fn today_list_query(owner_id: Uuid, reference: NaiveDate) -> TaskQuery {
    let (start, end) = day_bounds(reference);
    TaskQuery {
        owner_id,
        filter: TaskFilter::DueOn {
            start,
            end,
            weekday: Weekday::from(reference.weekday()),
            day_of_month: reference.day(),
        },
        sort: TaskSort::ScheduledAscDatelessLast,
        skip: 0,
        limit: None,
    }
}
