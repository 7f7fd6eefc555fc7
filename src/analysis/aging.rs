//! Per-item aging metrics.
//!
//! Every function takes the reference instant explicitly so results are
//! deterministic for a given snapshot.

use crate::models::TrackedItem;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Days remaining before the due date that still count as "Due Soon".
pub const DUE_SOON_DAYS: i64 = 7;

/// Default ceiling for [`aging_progress`].
pub const DEFAULT_PROGRESS_CAP_DAYS: u64 = 120;

/// Ceiling division of a signed millisecond span by one day.
fn ceil_days(millis: i64) -> i64 {
    let days = millis.div_euclid(MILLIS_PER_DAY);
    if millis.rem_euclid(MILLIS_PER_DAY) == 0 {
        days
    } else {
        days + 1
    }
}

/// Elapsed calendar days since the item was created, rounded up.
///
/// A creation timestamp in the future still yields a non-negative count.
pub fn age_in_days(item: &TrackedItem, now: NaiveDateTime) -> u64 {
    let millis = (now - item.created_at).num_milliseconds();
    ceil_days(millis.saturating_abs()) as u64
}

/// Signed day count between the due date and `now`.
///
/// Negative while the item is not yet due, zero at the due instant and
/// positive once overdue. Items without a due date report 0.
pub fn overdue_days(item: &TrackedItem, now: NaiveDateTime) -> i64 {
    match item.due_date {
        Some(due) => ceil_days((now - due).num_milliseconds()),
        None => 0,
    }
}

/// Timeline classification of a tracked item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimelineStatus {
    Completed,
    NoDueDate,
    Overdue,
    DueSoon,
    OnTrack,
}

impl TimelineStatus {
    /// All statuses in display order.
    pub const ALL: [TimelineStatus; 5] = [
        TimelineStatus::Overdue,
        TimelineStatus::DueSoon,
        TimelineStatus::OnTrack,
        TimelineStatus::NoDueDate,
        TimelineStatus::Completed,
    ];

    /// Presentation hint paired with the status.
    pub fn style_hint(&self) -> StyleHint {
        match self {
            TimelineStatus::Completed => StyleHint::Success,
            TimelineStatus::NoDueDate => StyleHint::Muted,
            TimelineStatus::Overdue => StyleHint::Danger,
            TimelineStatus::DueSoon => StyleHint::Warning,
            TimelineStatus::OnTrack => StyleHint::Info,
        }
    }

    /// Parse a display label such as "Due Soon", ignoring case and separators.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace(['_', '-', ' '], "").as_str() {
            "completed" => Some(TimelineStatus::Completed),
            "noduedate" => Some(TimelineStatus::NoDueDate),
            "overdue" => Some(TimelineStatus::Overdue),
            "duesoon" => Some(TimelineStatus::DueSoon),
            "ontrack" => Some(TimelineStatus::OnTrack),
            _ => None,
        }
    }
}

impl fmt::Display for TimelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimelineStatus::Completed => write!(f, "Completed"),
            TimelineStatus::NoDueDate => write!(f, "No Due Date"),
            TimelineStatus::Overdue => write!(f, "Overdue"),
            TimelineStatus::DueSoon => write!(f, "Due Soon"),
            TimelineStatus::OnTrack => write!(f, "On Track"),
        }
    }
}

/// Renderer-neutral styling hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleHint {
    Success,
    Muted,
    Danger,
    Warning,
    Info,
}

impl StyleHint {
    /// Returns an emoji representation of the hint.
    pub fn emoji(&self) -> &'static str {
        match self {
            StyleHint::Success => "✅",
            StyleHint::Muted => "⚪",
            StyleHint::Danger => "⛔",
            StyleHint::Warning => "⏳",
            StyleHint::Info => "🔵",
        }
    }
}

/// Result of [`timeline_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineAssessment {
    pub status: TimelineStatus,
    pub style_hint: StyleHint,
}

impl From<TimelineStatus> for TimelineAssessment {
    fn from(status: TimelineStatus) -> Self {
        Self {
            status,
            style_hint: status.style_hint(),
        }
    }
}

/// Classify an item's timeline.
///
/// Priority: terminal status, missing due date, overdue, due within
/// [`DUE_SOON_DAYS`], otherwise on track.
pub fn timeline_status(item: &TrackedItem, now: NaiveDateTime) -> TimelineAssessment {
    if item.is_terminal() {
        return TimelineStatus::Completed.into();
    }

    if item.due_date.is_none() {
        return TimelineStatus::NoDueDate.into();
    }

    let overdue = overdue_days(item, now);
    if overdue > 0 {
        return TimelineStatus::Overdue.into();
    }

    if overdue.abs() <= DUE_SOON_DAYS {
        return TimelineStatus::DueSoon.into();
    }

    TimelineStatus::OnTrack.into()
}

/// Coarse age label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgingBadge {
    New,
    Active,
    Aging,
    Critical,
}

impl AgingBadge {
    /// Rank used for ordering badges by severity (New = 0).
    pub fn severity_rank(&self) -> u8 {
        match self {
            AgingBadge::New => 0,
            AgingBadge::Active => 1,
            AgingBadge::Aging => 2,
            AgingBadge::Critical => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AgingBadge::New => "New",
            AgingBadge::Active => "Active",
            AgingBadge::Aging => "Aging",
            AgingBadge::Critical => "Critical",
        }
    }
}

impl fmt::Display for AgingBadge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Step function from age to badge: <=7 New, <=30 Active, <=60 Aging.
pub fn aging_badge(age_in_days: u64) -> AgingBadge {
    match age_in_days {
        0..=7 => AgingBadge::New,
        8..=30 => AgingBadge::Active,
        31..=60 => AgingBadge::Aging,
        _ => AgingBadge::Critical,
    }
}

/// Percentage of `cap_days` consumed, saturating at 100.
pub fn aging_progress(age_in_days: u64, cap_days: u64) -> f64 {
    if cap_days == 0 {
        return 100.0;
    }
    (age_in_days as f64 / cap_days as f64 * 100.0).min(100.0)
}

/// Four-step colour tier used by progress bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgingTier {
    Fresh,
    Maturing,
    Stale,
    Critical,
}

impl AgingTier {
    /// Returns an emoji representation of the tier.
    pub fn emoji(&self) -> &'static str {
        match self {
            AgingTier::Fresh => "🟩",
            AgingTier::Maturing => "🟨",
            AgingTier::Stale => "🟧",
            AgingTier::Critical => "🟥",
        }
    }
}

pub fn aging_tier(age_in_days: u64) -> AgingTier {
    match age_in_days {
        0..=30 => AgingTier::Fresh,
        31..=60 => AgingTier::Maturing,
        61..=90 => AgingTier::Stale,
        _ => AgingTier::Critical,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemStatus;
    use chrono::{Duration, NaiveDate};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn created_days_ago(days: i64) -> TrackedItem {
        TrackedItem::new("F-1", now() - Duration::days(days))
    }

    #[test]
    fn test_age_is_zero_at_creation() {
        let item = TrackedItem::new("F-1", now());
        assert_eq!(age_in_days(&item, now()), 0);
    }

    #[test]
    fn test_age_rounds_partial_days_up() {
        let item = TrackedItem::new("F-1", now() - Duration::hours(1));
        assert_eq!(age_in_days(&item, now()), 1);

        let item = TrackedItem::new("F-1", now() - Duration::hours(49));
        assert_eq!(age_in_days(&item, now()), 3);
    }

    #[test]
    fn test_age_of_future_item_is_non_negative() {
        let item = TrackedItem::new("F-1", now() + Duration::days(3));
        assert_eq!(age_in_days(&item, now()), 3);
    }

    #[test]
    fn test_overdue_without_due_date_is_zero() {
        assert_eq!(overdue_days(&created_days_ago(10), now()), 0);
    }

    #[test]
    fn test_overdue_sign_follows_due_date() {
        let due = now() + Duration::days(5);
        let item = created_days_ago(10).with_due_date(due);

        assert_eq!(overdue_days(&item, now()), -5);
        assert_eq!(overdue_days(&item, due), 0);
        assert_eq!(overdue_days(&item, due + Duration::hours(2)), 1);
        assert_eq!(overdue_days(&item, due + Duration::days(4)), 4);
    }

    #[test]
    fn test_overdue_is_monotonic_in_now() {
        let item = created_days_ago(10).with_due_date(now());
        let mut previous = i64::MIN;
        for hours in (-240..=240).step_by(7) {
            let value = overdue_days(&item, now() + Duration::hours(hours));
            assert!(value >= previous);
            previous = value;
        }
    }

    #[test]
    fn test_open_item_due_in_five_days_is_due_soon() {
        let item = created_days_ago(10).with_due_date(now() + Duration::days(5));

        assert_eq!(age_in_days(&item, now()), 10);
        assert_eq!(overdue_days(&item, now()), -5);
        assert_eq!(timeline_status(&item, now()).status, TimelineStatus::DueSoon);
        assert_eq!(aging_badge(age_in_days(&item, now())), AgingBadge::Active);
    }

    #[test]
    fn test_completion_overrides_overdue() {
        let item = created_days_ago(95)
            .with_due_date(now() - Duration::days(30))
            .with_status(ItemStatus::Resolved);

        assert_eq!(overdue_days(&item, now()), 30);
        let assessment = timeline_status(&item, now());
        assert_eq!(assessment.status, TimelineStatus::Completed);
        assert_eq!(assessment.style_hint, StyleHint::Success);
    }

    #[test]
    fn test_missing_due_date_reported_before_overdue_math() {
        let item = created_days_ago(40);

        assert_eq!(timeline_status(&item, now()).status, TimelineStatus::NoDueDate);
        assert_eq!(aging_badge(age_in_days(&item, now())), AgingBadge::Aging);
    }

    #[test]
    fn test_timeline_overdue_and_on_track() {
        let overdue = created_days_ago(20).with_due_date(now() - Duration::days(1));
        assert_eq!(timeline_status(&overdue, now()).status, TimelineStatus::Overdue);

        let on_track = created_days_ago(20).with_due_date(now() + Duration::days(8));
        assert_eq!(timeline_status(&on_track, now()).status, TimelineStatus::OnTrack);

        let edge = created_days_ago(20).with_due_date(now() + Duration::days(7));
        assert_eq!(timeline_status(&edge, now()).status, TimelineStatus::DueSoon);

        let due_now = created_days_ago(20).with_due_date(now());
        assert_eq!(timeline_status(&due_now, now()).status, TimelineStatus::DueSoon);
    }

    #[test]
    fn test_accepted_risk_is_not_completed() {
        let item = created_days_ago(20)
            .with_due_date(now() - Duration::days(3))
            .with_status(ItemStatus::AcceptedRisk);
        assert_eq!(timeline_status(&item, now()).status, TimelineStatus::Overdue);
    }

    #[test]
    fn test_aging_badge_thresholds() {
        assert_eq!(aging_badge(0), AgingBadge::New);
        assert_eq!(aging_badge(7), AgingBadge::New);
        assert_eq!(aging_badge(8), AgingBadge::Active);
        assert_eq!(aging_badge(30), AgingBadge::Active);
        assert_eq!(aging_badge(31), AgingBadge::Aging);
        assert_eq!(aging_badge(60), AgingBadge::Aging);
        assert_eq!(aging_badge(61), AgingBadge::Critical);
        assert_eq!(aging_badge(10_000), AgingBadge::Critical);
    }

    #[test]
    fn test_aging_badge_is_monotonic() {
        for age in 0..200 {
            assert!(aging_badge(age).severity_rank() <= aging_badge(age + 1).severity_rank());
        }
    }

    #[test]
    fn test_aging_progress_saturates() {
        assert_eq!(aging_progress(0, 120), 0.0);
        assert_eq!(aging_progress(60, 120), 50.0);
        assert_eq!(aging_progress(120, 120), 100.0);
        assert_eq!(aging_progress(500, 120), 100.0);
        assert_eq!(aging_progress(5, 0), 100.0);
    }

    #[test]
    fn test_aging_tier_thresholds() {
        assert_eq!(aging_tier(30), AgingTier::Fresh);
        assert_eq!(aging_tier(31), AgingTier::Maturing);
        assert_eq!(aging_tier(90), AgingTier::Stale);
        assert_eq!(aging_tier(91), AgingTier::Critical);
    }

    #[test]
    fn test_timeline_status_parse() {
        assert_eq!(TimelineStatus::parse("Due Soon"), Some(TimelineStatus::DueSoon));
        assert_eq!(TimelineStatus::parse("on-track"), Some(TimelineStatus::OnTrack));
        assert_eq!(TimelineStatus::parse("no_due_date"), Some(TimelineStatus::NoDueDate));
        assert_eq!(TimelineStatus::parse("late"), None);
        for status in TimelineStatus::ALL {
            assert_eq!(TimelineStatus::parse(&status.to_string()), Some(status));
        }
    }
}
