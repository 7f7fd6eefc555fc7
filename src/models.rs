//! Data models for aging analysis.
//!
//! This module contains the core data structures shared by the analyzer,
//! the snapshot boundary and the report generator.

use crate::analysis::{AgingAnalytics, ItemAging, PageLink};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity level of a tracked item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Informational - no action strictly required
    Informational,
    /// Low severity - minor weaknesses
    Low,
    /// Medium severity - control weaknesses with limited exposure
    Medium,
    /// High severity - significant exposure
    High,
    /// Critical severity - immediate remediation expected
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Informational => write!(f, "Informational"),
            Severity::Low => write!(f, "Low"),
            Severity::Medium => write!(f, "Medium"),
            Severity::High => write!(f, "High"),
            Severity::Critical => write!(f, "Critical"),
        }
    }
}

impl Severity {
    /// All severities, most severe first.
    pub const ALL: [Severity; 5] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
        Severity::Informational,
    ];

    /// Returns an emoji representation of the severity.
    pub fn emoji(&self) -> &'static str {
        match self {
            Severity::Informational => "🔵",
            Severity::Low => "🟢",
            Severity::Medium => "🟡",
            Severity::High => "🟠",
            Severity::Critical => "🔴",
        }
    }

    /// Parse a severity label, ignoring case. Unknown labels yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "critical" => Some(Severity::Critical),
            "high" => Some(Severity::High),
            "medium" | "moderate" => Some(Severity::Medium),
            "low" => Some(Severity::Low),
            "informational" | "info" => Some(Severity::Informational),
            _ => None,
        }
    }
}

/// Workflow status of a tracked item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
    AcceptedRisk,
    Other(String),
}

impl ItemStatus {
    /// Whether the status ends the item's lifecycle.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ItemStatus::Resolved | ItemStatus::Closed)
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemStatus::Open => write!(f, "Open"),
            ItemStatus::InProgress => write!(f, "In Progress"),
            ItemStatus::Resolved => write!(f, "Resolved"),
            ItemStatus::Closed => write!(f, "Closed"),
            ItemStatus::AcceptedRisk => write!(f, "Accepted Risk"),
            ItemStatus::Other(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for ItemStatus {
    fn from(s: &str) -> Self {
        let trimmed = s.trim();
        match trimmed.to_lowercase().replace(['_', '-'], " ").as_str() {
            "open" | "new" => ItemStatus::Open,
            "in progress" | "ongoing" => ItemStatus::InProgress,
            "resolved" | "remediated" => ItemStatus::Resolved,
            "closed" | "completed" | "done" => ItemStatus::Closed,
            "accepted risk" | "risk accepted" | "accepted" => ItemStatus::AcceptedRisk,
            _ => ItemStatus::Other(trimmed.to_string()),
        }
    }
}

/// Which register an item comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ItemKind {
    #[default]
    Finding,
    Gap,
    Threat,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Finding => write!(f, "Finding"),
            ItemKind::Gap => write!(f, "Gap"),
            ItemKind::Threat => write!(f, "Threat"),
        }
    }
}

impl ItemKind {
    /// Parse a register name, ignoring case. Unknown names yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "finding" | "findings" => Some(ItemKind::Finding),
            "gap" | "gaps" => Some(ItemKind::Gap),
            "threat" | "threats" | "risk" => Some(ItemKind::Threat),
            _ => None,
        }
    }
}

/// A record subject to aging analysis (finding, gap, threat).
///
/// Timestamps are timezone-naive and share one calendar frame; the snapshot
/// boundary is responsible for normalizing them before construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedItem {
    /// Identifier as exported by the register.
    pub id: String,
    /// Register the item belongs to.
    pub kind: ItemKind,
    /// Short title.
    pub title: String,
    /// Free-text description (used for search only).
    #[serde(default)]
    pub description: String,
    /// Severity, when the register records one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    /// Workflow status.
    pub status: ItemStatus,
    /// Assigned owner or responsible party.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// When the item was first recorded.
    pub created_at: NaiveDateTime,
    /// Target resolution date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDateTime>,
    /// When the item reached a terminal status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<NaiveDateTime>,
}

impl TrackedItem {
    /// Creates an open finding with only a creation timestamp.
    pub fn new(id: impl Into<String>, created_at: NaiveDateTime) -> Self {
        let id = id.into();
        Self {
            title: id.clone(),
            id,
            kind: ItemKind::Finding,
            description: String::new(),
            severity: None,
            status: ItemStatus::Open,
            owner: None,
            created_at,
            due_date: None,
            completed_at: None,
        }
    }

    pub fn with_due_date(mut self, due_date: NaiveDateTime) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn with_status(mut self, status: ItemStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_completed_at(mut self, completed_at: NaiveDateTime) -> Self {
        self.completed_at = Some(completed_at);
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    /// Whether the item's status is terminal.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Metadata about the aging report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// File or directory the snapshot was read from.
    pub source: String,
    /// Reference instant every figure is computed against.
    pub reference_time: NaiveDateTime,
    /// Wall-clock time the report was produced.
    pub generated_at: DateTime<Utc>,
    /// Number of snapshot files read.
    pub files_loaded: usize,
    /// Number of items analyzed.
    pub items_analyzed: usize,
    /// Number of records skipped at the parsing boundary.
    pub items_skipped: usize,
    /// Duration of the run in seconds.
    pub duration_seconds: f64,
}

/// A record left out of the analysis, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedRecord {
    pub source: String,
    pub id: String,
    pub reason: String,
}

/// One rendered page of the item table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemPage {
    /// Human-readable description of the active filters, empty when none.
    pub filters: String,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub start_index: usize,
    pub end_index: usize,
    pub links: Vec<PageLink>,
    pub items: Vec<ItemAging>,
}

/// The complete aging report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Metadata about the report.
    pub metadata: ReportMetadata,
    /// Aggregates over the whole snapshot.
    pub analytics: AgingAnalytics,
    /// Filtered, paged item table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<ItemPage>,
    /// Records rejected at the parsing boundary.
    pub skipped: Vec<SkippedRecord>,
}
