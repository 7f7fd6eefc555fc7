//! Day- and week-bucketed series for trend charts.
//!
//! Both series are recomputed from the snapshot on every call and are
//! ordered oldest first.

use super::aging::age_in_days;
use crate::models::TrackedItem;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Default number of days in [`daily_timeline`].
pub const DEFAULT_WINDOW_DAYS: u32 = 30;

/// Default number of weeks in [`weekly_aging_trend`].
pub const DEFAULT_WINDOW_WEEKS: u32 = 12;

/// Largest window accepted from the command line or config (ten years).
pub const MAX_WINDOW_DAYS: u32 = 3650;

/// Largest weekly window accepted from the command line or config.
pub const MAX_WINDOW_WEEKS: u32 = 520;

/// One calendar day of activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    /// Items created on this date.
    pub created: usize,
    /// Items completed on this date.
    pub resolved: usize,
    /// Items overdue as of this date.
    pub overdue_snapshot: usize,
}

/// Whether the item was overdue on `date`: it existed, its due date had
/// passed, and it had not been completed yet.
fn overdue_on(item: &TrackedItem, date: NaiveDate) -> bool {
    let Some(due) = item.due_date else {
        return false;
    };

    let existed = item.created_at.date() <= date;
    let past_due = due.date() < date;
    let still_open = item.completed_at.map_or(true, |done| done.date() > date);

    existed && past_due && still_open
}

/// Per-day created/resolved/overdue counts for the last `window_days` days,
/// ending with `now`'s calendar day.
///
/// Days before the earliest representable date are left out.
pub fn daily_timeline(items: &[TrackedItem], now: NaiveDateTime, window_days: u32) -> Vec<DailyPoint> {
    let today = now.date();

    (0..window_days)
        .filter_map(|i| {
            let date =
                today.checked_sub_signed(Duration::days(i64::from(window_days - 1 - i)))?;

            let mut point = DailyPoint {
                date,
                created: 0,
                resolved: 0,
                overdue_snapshot: 0,
            };

            for item in items {
                if item.created_at.date() == date {
                    point.created += 1;
                }
                if item.completed_at.map(|c| c.date()) == Some(date) {
                    point.resolved += 1;
                }
                if overdue_on(item, date) {
                    point.overdue_snapshot += 1;
                }
            }

            Some(point)
        })
        .collect()
}

/// One seven-day window of the aging trend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyPoint {
    pub week_label: String,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    /// Items created within the window.
    pub identified: usize,
    /// Items completed within the window.
    pub resolved: usize,
    /// Mean age (relative to `now`) of the items created within the window.
    pub avg_aging_days: f64,
}

/// Contiguous, non-overlapping seven-day windows ending on `now`'s calendar
/// day. Labels count down so the newest window is "Week 1".
pub fn weekly_aging_trend(
    items: &[TrackedItem],
    now: NaiveDateTime,
    window_weeks: u32,
) -> Vec<WeeklyPoint> {
    let today = now.date();

    (0..window_weeks)
        .filter_map(|i| {
            let weeks_back = window_weeks - 1 - i;
            let week_end = today.checked_sub_signed(Duration::days(7 * i64::from(weeks_back)))?;
            let week_start = week_end.checked_sub_signed(Duration::days(6))?;
            let in_week = |date: NaiveDate| date >= week_start && date <= week_end;

            let created: Vec<&TrackedItem> = items
                .iter()
                .filter(|item| in_week(item.created_at.date()))
                .collect();

            let resolved = items
                .iter()
                .filter(|item| item.completed_at.is_some_and(|c| in_week(c.date())))
                .count();

            let avg_aging_days = if created.is_empty() {
                0.0
            } else {
                let total: u64 = created.iter().map(|item| age_in_days(item, now)).sum();
                total as f64 / created.len() as f64
            };

            Some(WeeklyPoint {
                week_label: format!("Week {}", weeks_back + 1),
                week_start,
                week_end,
                identified: created.len(),
                resolved,
                avg_aging_days,
            })
        })
        .collect()
}
