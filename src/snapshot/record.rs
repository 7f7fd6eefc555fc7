//! Raw exported records and their normalization into [`TrackedItem`]s.

use super::timestamp::{parse_optional, parse_required, TimestampError};
use crate::models::{ItemKind, ItemStatus, Severity, TrackedItem};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// A record as exported by a register endpoint.
///
/// Field names follow the backend; register-specific spellings are accepted
/// through aliases.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRecord {
    /// Numeric or string primary key.
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub finding_id: Option<String>,
    #[serde(default)]
    pub gap_id: Option<String>,
    #[serde(default)]
    pub threat_id: Option<String>,

    #[serde(default)]
    pub kind: Option<String>,

    #[serde(default, alias = "finding_title", alias = "gap_title", alias = "threat_name")]
    pub title: Option<String>,
    #[serde(default, alias = "finding_description", alias = "gap_description")]
    pub description: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default, alias = "remediation_status")]
    pub status: Option<String>,
    #[serde(default, alias = "assigned_to", alias = "responsible_party")]
    pub owner: Option<String>,

    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, alias = "target_completion_date")]
    pub due_date: Option<String>,
    #[serde(
        default,
        alias = "completed_date",
        alias = "actual_completion_date"
    )]
    pub completed_at: Option<String>,
}

impl RawRecord {
    /// Best identifier available: the register code, then the primary key.
    pub fn display_id(&self) -> Option<String> {
        let code = [&self.finding_id, &self.gap_id, &self.threat_id]
            .into_iter()
            .flatten()
            .find(|s| !s.trim().is_empty())
            .cloned();

        code.or_else(|| match &self.id {
            Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
    }

    /// Convert into a [`TrackedItem`], parsing every timestamp.
    ///
    /// `fallback_id` is used when the record carries no identifier;
    /// `default_kind` when it does not name its register.
    pub fn normalize(
        self,
        fallback_id: &str,
        default_kind: ItemKind,
    ) -> Result<TrackedItem, TimestampError> {
        let created_at = parse_required("created_at", self.created_at.as_deref())?;
        let due_date = parse_optional("due_date", self.due_date.as_deref())?;
        let completed_at = parse_optional("completed_at", self.completed_at.as_deref())?;

        let id = self.display_id().unwrap_or_else(|| fallback_id.to_string());
        let kind = self
            .kind
            .as_deref()
            .and_then(ItemKind::parse)
            .unwrap_or(default_kind);

        let severity = match self.severity.as_deref() {
            Some(s) => {
                let parsed = Severity::parse(s);
                if parsed.is_none() {
                    debug!("Unrecognized severity '{}' on {}", s, id);
                }
                parsed
            }
            None => None,
        };

        let status = self
            .status
            .as_deref()
            .map(ItemStatus::from)
            .unwrap_or(ItemStatus::Open);

        Ok(TrackedItem {
            title: self.title.unwrap_or_else(|| id.clone()),
            id,
            kind,
            description: self.description.unwrap_or_default(),
            severity,
            status,
            owner: self.owner.filter(|o| !o.trim().is_empty()),
            created_at,
            due_date,
            completed_at,
        })
    }
}

/// Why a record was left out.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error(transparent)]
    Timestamp(#[from] TimestampError),

    #[error("Unreadable record: {0}")]
    Shape(String),
}

/// Identifier of a record that may not deserialize, read straight from JSON.
fn raw_id(value: &Value) -> Option<String> {
    let code = ["finding_id", "gap_id", "threat_id"]
        .iter()
        .filter_map(|key| value.get(key).and_then(Value::as_str))
        .find(|s| !s.trim().is_empty())
        .map(str::to_string);

    code.or_else(|| match value.get("id") {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// A record that could not be normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRecord {
    /// Label of the export the record came from.
    pub source: String,
    /// Position within its source.
    pub index: usize,
    pub id: Option<String>,
    pub error: RecordError,
}

/// Outcome of normalizing a batch of records.
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub items: Vec<TrackedItem>,
    pub rejected: Vec<RejectedRecord>,
}

impl Normalized {
    pub fn extend(&mut self, other: Normalized) {
        self.items.extend(other.items);
        self.rejected.extend(other.rejected);
    }
}

/// Normalize every record, collecting failures instead of aborting.
///
/// Each JSON value is read on its own, so a record with an unexpected shape
/// is rejected without affecting its neighbours. `source` labels log lines
/// and fallback identifiers.
pub fn normalize_records(records: Vec<Value>, source: &str, default_kind: ItemKind) -> Normalized {
    let mut out = Normalized::default();

    for (index, value) in records.into_iter().enumerate() {
        let id = raw_id(&value);
        let fallback_id = format!("{}#{}", source, index + 1);

        let normalized = serde_json::from_value::<RawRecord>(value)
            .map_err(|e| RecordError::Shape(e.to_string()))
            .and_then(|record| {
                record
                    .normalize(&fallback_id, default_kind)
                    .map_err(RecordError::from)
            });

        match normalized {
            Ok(item) => {
                if let Some(done) = item.completed_at {
                    if done < item.created_at {
                        warn!(
                            "{}: completed_at {} precedes created_at {}",
                            item.id, done, item.created_at
                        );
                    }
                }
                if item.is_terminal() && item.completed_at.is_none() {
                    debug!("{}: terminal status without completion date", item.id);
                }
                out.items.push(item);
            }
            Err(error) => {
                warn!(
                    "Skipping record {} in {}: {}",
                    id.as_deref().unwrap_or(&fallback_id),
                    source,
                    error
                );
                out.rejected.push(RejectedRecord {
                    source: source.to_string(),
                    index,
                    id,
                    error,
                });
            }
        }
    }

    out
}
