//! Snapshot loading and normalization.
//!
//! A snapshot is one JSON export, or a directory of exports. Each file holds
//! either a bare array of records or an object wrapping the array (`items`,
//! `data`, `findings`, `gaps`). Timestamps are normalized here so the
//! analyzer only ever sees well-typed items.

pub mod record;
pub mod timestamp;

pub use record::{normalize_records, Normalized, RawRecord, RecordError, RejectedRecord};
pub use timestamp::{parse_reference, parse_timestamp, TimestampError};

use crate::models::ItemKind;
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotFile {
    List(Vec<Value>),
    Wrapped {
        #[serde(alias = "data", alias = "findings", alias = "gaps", alias = "threats")]
        items: Vec<Value>,
    },
}

impl SnapshotFile {
    fn into_records(self) -> Vec<Value> {
        match self {
            SnapshotFile::List(records) => records,
            SnapshotFile::Wrapped { items } => items,
        }
    }
}

/// Records read from one export file.
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    pub path: PathBuf,
    /// Register implied by the file name, e.g. `gaps.json`.
    pub kind: Option<ItemKind>,
    /// Records as raw JSON; each is read into a [`RawRecord`] on its own.
    pub records: Vec<Value>,
}

/// Parse the contents of one export.
pub fn parse_snapshot(content: &str) -> Result<Vec<Value>> {
    let file: SnapshotFile =
        serde_json::from_str(content).context("Snapshot is neither a record array nor an object with an 'items' array")?;
    Ok(file.into_records())
}

/// Read one export file.
pub fn load_file(path: &Path) -> Result<SnapshotSource> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot: {}", path.display()))?;

    let records = parse_snapshot(&content)
        .with_context(|| format!("Failed to parse snapshot: {}", path.display()))?;

    let kind = path
        .file_stem()
        .and_then(|s| s.to_str())
        .and_then(ItemKind::parse);

    debug!("Loaded {} records from {}", records.len(), path.display());

    Ok(SnapshotSource {
        path: path.to_path_buf(),
        kind,
        records,
    })
}

/// Find every `*.json` export under `dir`, skipping hidden entries, in
/// path order.
pub fn discover(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    let walker = WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0 || !entry.file_name().to_string_lossy().starts_with('.')
        });

    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to scan {}", dir.display()))?;
        let is_json = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        if entry.file_type().is_file() && is_json {
            paths.push(entry.into_path());
        }
    }

    paths.sort();
    Ok(paths)
}

/// Load a file or every export under a directory.
pub fn load(path: &Path) -> Result<Vec<SnapshotSource>> {
    if path.is_dir() {
        let files = discover(path)?;
        info!("Found {} snapshot files in {}", files.len(), path.display());
        files.iter().map(|p| load_file(p)).collect()
    } else {
        Ok(vec![load_file(path)?])
    }
}

/// Normalize every source into one item list.
pub fn normalize_sources(sources: Vec<SnapshotSource>, default_kind: ItemKind) -> Normalized {
    let mut all = Normalized::default();

    for source in sources {
        let label = source
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| source.path.display().to_string());
        let kind = source.kind.unwrap_or(default_kind);

        all.extend(normalize_records(source.records, &label, kind));
    }

    all
}
