//! Age-bucket histogram.

use super::aging::age_in_days;
use crate::models::TrackedItem;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Inclusive `[min, max]` day range. `max: None` is open-ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeBucket {
    pub label: String,
    pub min: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<u64>,
}

impl AgeBucket {
    pub fn new(label: impl Into<String>, min: u64, max: Option<u64>) -> Self {
        Self {
            label: label.into(),
            min,
            max,
        }
    }

    pub fn contains(&self, days: u64) -> bool {
        days >= self.min && self.max.map_or(true, |max| days <= max)
    }
}

/// The dashboard's standard ranges: 0-7, 8-30, 31-60, 61-90, 91+.
pub fn default_buckets() -> Vec<AgeBucket> {
    vec![
        AgeBucket::new("0-7 days", 0, Some(7)),
        AgeBucket::new("8-30 days", 8, Some(30)),
        AgeBucket::new("31-60 days", 31, Some(60)),
        AgeBucket::new("61-90 days", 61, Some(90)),
        AgeBucket::new("90+ days", 91, None),
    ]
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BucketError {
    #[error("At least one age bucket is required")]
    Empty,

    #[error("First age bucket must start at 0 days, found {0}")]
    DoesNotStartAtZero(u64),

    #[error("Age bucket '{0}' has min greater than max")]
    Inverted(String),

    #[error("Age bucket '{label}' starts at {found}, expected {expected}")]
    NotContiguous {
        label: String,
        expected: u64,
        found: u64,
    },

    #[error("Age bucket '{0}' is open-ended but is not the last bucket")]
    OpenEndedNotLast(String),

    #[error("Last age bucket '{0}' must be open-ended")]
    ClosedTail(String),
}

/// Check that buckets are ordered, contiguous, non-overlapping and
/// cover `[0, +inf)`, so every age lands in exactly one bucket.
pub fn validate_buckets(buckets: &[AgeBucket]) -> Result<(), BucketError> {
    let first = buckets.first().ok_or(BucketError::Empty)?;
    if first.min != 0 {
        return Err(BucketError::DoesNotStartAtZero(first.min));
    }

    let mut expected = 0u64;
    for (i, bucket) in buckets.iter().enumerate() {
        if bucket.min != expected {
            return Err(BucketError::NotContiguous {
                label: bucket.label.clone(),
                expected,
                found: bucket.min,
            });
        }

        match bucket.max {
            Some(max) if max < bucket.min => {
                return Err(BucketError::Inverted(bucket.label.clone()));
            }
            Some(max) => expected = max.saturating_add(1),
            None if i + 1 != buckets.len() => {
                return Err(BucketError::OpenEndedNotLast(bucket.label.clone()));
            }
            None => return Ok(()),
        }
    }

    // Loop only falls through when the last bucket is closed.
    Err(BucketError::ClosedTail(
        buckets.last().map(|b| b.label.clone()).unwrap_or_default(),
    ))
}

/// Number of items in one bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketCount {
    pub label: String,
    pub count: usize,
}

/// Count items by age bucket, in bucket order.
pub fn distribution_by_age_bucket(
    items: &[TrackedItem],
    now: NaiveDateTime,
    buckets: &[AgeBucket],
) -> Vec<BucketCount> {
    let ages: Vec<u64> = items.iter().map(|item| age_in_days(item, now)).collect();

    buckets
        .iter()
        .map(|bucket| BucketCount {
            label: bucket.label.clone(),
            count: ages.iter().filter(|&&age| bucket.contains(age)).count(),
        })
        .collect()
}
