//! Snapshot-wide aging statistics.

use super::aging::{age_in_days, timeline_status, TimelineStatus};
use crate::models::{Severity, TrackedItem};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Age above which an item counts towards `critical_aging`.
pub const CRITICAL_AGING_DAYS: u64 = 90;

/// Headline figures for a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgingSummary {
    /// Total number of items.
    pub total: usize,
    /// Items in a non-terminal status.
    pub open: usize,
    /// Items in a terminal status.
    pub resolved: usize,
    /// Items whose timeline status is Overdue.
    pub overdue: usize,
    /// Items due within the due-soon window.
    pub due_soon: usize,
    /// Mean age in days across all items.
    pub avg_aging_days: f64,
    /// Items older than [`CRITICAL_AGING_DAYS`].
    pub critical_aging: usize,
    /// Percentage of items in a terminal status, rounded.
    pub resolution_rate: u32,
}

impl AgingSummary {
    /// Creates a summary from a snapshot.
    pub fn from_items(items: &[TrackedItem], now: NaiveDateTime) -> Self {
        let mut summary = Self {
            total: items.len(),
            ..Self::default()
        };

        if items.is_empty() {
            return summary;
        }

        let mut total_age = 0u64;
        for item in items {
            let age = age_in_days(item, now);
            total_age += age;

            if age > CRITICAL_AGING_DAYS {
                summary.critical_aging += 1;
            }

            if item.is_terminal() {
                summary.resolved += 1;
            } else {
                summary.open += 1;
            }

            match timeline_status(item, now).status {
                TimelineStatus::Overdue => summary.overdue += 1,
                TimelineStatus::DueSoon => summary.due_soon += 1,
                _ => {}
            }
        }

        summary.avg_aging_days = total_age as f64 / items.len() as f64;
        summary.resolution_rate =
            (summary.resolved as f64 / items.len() as f64 * 100.0).round() as u32;

        summary
    }
}

/// Mean age of the items at one severity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityAging {
    pub severity: Severity,
    pub count: usize,
    pub avg_aging_days: f64,
}

/// One row per severity, most severe first. Items without a severity are
/// left out.
pub fn severity_aging(items: &[TrackedItem], now: NaiveDateTime) -> Vec<SeverityAging> {
    Severity::ALL
        .iter()
        .map(|&severity| {
            let ages: Vec<u64> = items
                .iter()
                .filter(|item| item.severity == Some(severity))
                .map(|item| age_in_days(item, now))
                .collect();

            let avg_aging_days = if ages.is_empty() {
                0.0
            } else {
                ages.iter().sum::<u64>() as f64 / ages.len() as f64
            };

            SeverityAging {
                severity,
                count: ages.len(),
                avg_aging_days,
            }
        })
        .collect()
}

/// Item count per timeline status, in [`TimelineStatus::ALL`] order.
pub fn timeline_breakdown(items: &[TrackedItem], now: NaiveDateTime) -> Vec<(TimelineStatus, usize)> {
    let statuses: Vec<TimelineStatus> = items
        .iter()
        .map(|item| timeline_status(item, now).status)
        .collect();

    TimelineStatus::ALL
        .iter()
        .map(|&status| (status, statuses.iter().filter(|&&s| s == status).count()))
        .collect()
}

/// The `n` oldest non-terminal items, oldest first.
pub fn oldest_open_items(items: &[TrackedItem], now: NaiveDateTime, n: usize) -> Vec<&TrackedItem> {
    let mut open: Vec<(&TrackedItem, u64)> = items
        .iter()
        .filter(|item| !item.is_terminal())
        .map(|item| (item, age_in_days(item, now)))
        .collect();

    open.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.id.cmp(&b.0.id)));
    open.truncate(n);

    open.into_iter().map(|(item, _)| item).collect()
}
