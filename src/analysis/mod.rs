//! Aging and timeline analytics.
//!
//! Everything in this module is a pure function of a snapshot of
//! [`TrackedItem`]s and a caller-supplied reference instant. [`AgingAnalyzer`]
//! bundles the individual computations behind one set of settings.

pub mod aging;
pub mod distribution;
pub mod query;
pub mod summary;
pub mod timeline;

pub use aging::*;
pub use distribution::*;
pub use query::*;
pub use summary::*;
pub use timeline::*;

use crate::models::{ItemStatus, Severity, TrackedItem};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Tunable windows and ranges for a full analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerSettings {
    pub window_days: u32,
    pub window_weeks: u32,
    pub progress_cap_days: u64,
    pub buckets: Vec<AgeBucket>,
    /// How many of the oldest open items to list.
    pub top_oldest: usize,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            window_weeks: DEFAULT_WINDOW_WEEKS,
            progress_cap_days: DEFAULT_PROGRESS_CAP_DAYS,
            buckets: default_buckets(),
            top_oldest: 10,
        }
    }
}

/// Derived metrics for one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemAging {
    pub id: String,
    pub title: String,
    pub status: ItemStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    pub age_days: u64,
    pub overdue_days: i64,
    pub timeline: TimelineAssessment,
    pub badge: AgingBadge,
    pub tier: AgingTier,
    pub progress: f64,
}

/// All aggregates computed for a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgingAnalytics {
    pub summary: AgingSummary,
    pub timeline_breakdown: Vec<(TimelineStatus, usize)>,
    pub age_distribution: Vec<BucketCount>,
    pub severity_aging: Vec<SeverityAging>,
    pub daily: Vec<DailyPoint>,
    pub weekly: Vec<WeeklyPoint>,
    pub oldest_open: Vec<ItemAging>,
}

/// Stateless analyzer configured with [`AnalyzerSettings`].
#[derive(Debug, Clone, Default)]
pub struct AgingAnalyzer {
    settings: AnalyzerSettings,
}

impl AgingAnalyzer {
    pub fn new(settings: AnalyzerSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &AnalyzerSettings {
        &self.settings
    }

    /// Per-item metrics for display.
    pub fn assess(&self, item: &TrackedItem, now: NaiveDateTime) -> ItemAging {
        let age_days = age_in_days(item, now);

        ItemAging {
            id: item.id.clone(),
            title: item.title.clone(),
            status: item.status.clone(),
            severity: item.severity,
            owner: item.owner.clone(),
            age_days,
            overdue_days: overdue_days(item, now),
            timeline: timeline_status(item, now),
            badge: aging_badge(age_days),
            tier: aging_tier(age_days),
            progress: aging_progress(age_days, self.settings.progress_cap_days),
        }
    }

    /// Compute every aggregate for the snapshot.
    pub fn analyze(&self, items: &[TrackedItem], now: NaiveDateTime) -> AgingAnalytics {
        let settings = &self.settings;

        AgingAnalytics {
            summary: AgingSummary::from_items(items, now),
            timeline_breakdown: timeline_breakdown(items, now),
            age_distribution: distribution_by_age_bucket(items, now, &settings.buckets),
            severity_aging: severity_aging(items, now),
            daily: daily_timeline(items, now, settings.window_days),
            weekly: weekly_aging_trend(items, now, settings.window_weeks),
            oldest_open: oldest_open_items(items, now, settings.top_oldest)
                .into_iter()
                .map(|item| self.assess(item, now))
                .collect(),
        }
    }
}
