//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::analysis::{MAX_WINDOW_DAYS, MAX_WINDOW_WEEKS};
use clap::Parser;
use std::path::PathBuf;

/// AgingScope - aging and timeline analytics for GRC registers
///
/// Reads JSON exports of findings, gaps or threats and reports how old
/// they are, what is overdue, and how the backlog trends over time.
///
/// Examples:
///   agingscope --input findings.json
///   agingscope --input exports/ --format json --output aging.json
///   agingscope --input gaps.json --now 2024-06-30 --timeline overdue
///   agingscope --input findings.json --fail-on-overdue --quiet
///   agingscope --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Snapshot file or directory of JSON exports
    #[arg(short, long, value_name = "PATH", required_unless_present = "init_config")]
    pub input: Option<PathBuf>,

    /// Reference instant for all calculations
    ///
    /// RFC 3339 or YYYY-MM-DD[ HH:MM[:SS]]. Defaults to the current UTC time,
    /// read once per run.
    #[arg(long, value_name = "TIMESTAMP", env = "AGINGSCOPE_NOW")]
    pub now: Option<String>,

    /// Output file path for the report (default from config)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Write the report to stdout instead of a file
    #[arg(long, conflicts_with = "output")]
    pub stdout: bool,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Path to configuration file
    ///
    /// If not specified, looks for .agingscope.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Days covered by the daily timeline
    #[arg(long, value_name = "DAYS")]
    pub window_days: Option<u32>,

    /// Weeks covered by the weekly aging trend
    #[arg(long, value_name = "WEEKS")]
    pub window_weeks: Option<u32>,

    /// Age in days at which the progress bar is full
    #[arg(long, value_name = "DAYS")]
    pub progress_cap: Option<u64>,

    /// Number of oldest open items to highlight
    #[arg(long, value_name = "COUNT")]
    pub top: Option<usize>,

    /// Register assumed for records that do not name one (finding, gap, threat)
    #[arg(long, value_name = "KIND")]
    pub kind: Option<String>,

    /// Only list items from this register (finding, gap, threat)
    #[arg(long, value_name = "KIND")]
    pub only: Option<String>,

    /// Only list items whose id, title or description contains this text
    #[arg(long, value_name = "TEXT")]
    pub search: Option<String>,

    /// Only list items with this status (e.g. "Open", "In Progress")
    #[arg(long, value_name = "STATUS")]
    pub status: Option<String>,

    /// Only list items with this severity
    #[arg(long, value_name = "LEVEL")]
    pub severity: Option<String>,

    /// Only list items with this timeline status
    ///
    /// Values: overdue, due-soon, on-track, no-due-date, completed
    #[arg(long, value_name = "STATUS")]
    pub timeline: Option<String>,

    /// Page of the item table to render (1-based)
    #[arg(long, default_value = "1", value_name = "N")]
    pub page: usize,

    /// Items per page (default from config)
    #[arg(long, value_name = "N")]
    pub page_size: Option<usize>,

    /// Leave the item table out of the report
    #[arg(long)]
    pub no_items: bool,

    /// Fail when any record has a malformed timestamp
    ///
    /// By default such records are skipped with a warning.
    #[arg(long)]
    pub strict: bool,

    /// Exit with code 2 when any open item is overdue
    ///
    /// Useful for CI pipelines and scheduled checks.
    #[arg(long)]
    pub fail_on_overdue: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .agingscope.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        match self.input {
            Some(ref input) if !input.exists() => {
                return Err(format!("Input path does not exist: {}", input.display()));
            }
            None => return Err("--input is required".to_string()),
            _ => {}
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.page == 0 {
            return Err("Page must be at least 1".to_string());
        }

        if self.page_size == Some(0) {
            return Err("Page size must be at least 1".to_string());
        }

        if let Some(days) = self.window_days {
            if days > MAX_WINDOW_DAYS {
                return Err(format!("--window-days must be at most {}", MAX_WINDOW_DAYS));
            }
        }

        if let Some(weeks) = self.window_weeks {
            if weeks > MAX_WINDOW_WEEKS {
                return Err(format!("--window-weeks must be at most {}", MAX_WINDOW_WEEKS));
            }
        }

        for kind in [&self.kind, &self.only].into_iter().flatten() {
            if crate::models::ItemKind::parse(kind).is_none() {
                return Err(format!(
                    "Unknown kind '{}': expected finding, gap or threat",
                    kind
                ));
            }
        }

        if let Some(ref severity) = self.severity {
            if crate::models::Severity::parse(severity).is_none() {
                return Err(format!("Unknown severity '{}'", severity));
            }
        }

        if let Some(ref timeline) = self.timeline {
            if crate::analysis::TimelineStatus::parse(timeline).is_none() {
                return Err(format!(
                    "Unknown timeline status '{}': expected overdue, due-soon, on-track, no-due-date or completed",
                    timeline
                ));
            }
        }

        if let Some(ref now) = self.now {
            crate::snapshot::parse_reference(now).map_err(|e| e.to_string())?;
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Build the item filter from the filter flags.
    ///
    /// Call after [`Args::validate`]; unparseable values are ignored here.
    pub fn item_query(&self) -> crate::analysis::ItemQuery {
        use crate::analysis::{ItemQuery, TimelineStatus};
        use crate::models::{ItemKind, ItemStatus, Severity};

        ItemQuery {
            search: self.search.clone().filter(|s| !s.trim().is_empty()),
            status: self.status.as_deref().map(ItemStatus::from),
            severity: self.severity.as_deref().and_then(Severity::parse),
            timeline: self.timeline.as_deref().and_then(TimelineStatus::parse),
            kind: self.only.as_deref().and_then(ItemKind::parse),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::TimelineStatus;
    use crate::models::{ItemKind, ItemStatus, Severity};

    fn make_args() -> Args {
        Args {
            input: Some(std::env::temp_dir()),
            now: None,
            output: None,
            stdout: false,
            format: OutputFormat::Markdown,
            config: None,
            window_days: None,
            window_weeks: None,
            progress_cap: None,
            top: None,
            kind: None,
            only: None,
            search: None,
            status: None,
            severity: None,
            timeline: None,
            page: 1,
            page_size: None,
            no_items: false,
            strict: false,
            fail_on_overdue: false,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_validation_accepts_defaults() {
        assert!(make_args().validate().is_ok());
    }

    #[test]
    fn test_validation_missing_input() {
        let mut args = make_args();
        args.input = Some(PathBuf::from("/definitely/not/here.json"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut args = make_args();
        args.page = 0;
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.page_size = Some(0);
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.timeline = Some("late".to_string());
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.now = Some("yesterday".to_string());
        assert!(args.validate().unwrap_err().contains("now"));

        let mut args = make_args();
        args.kind = Some("vendor".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_bounds_windows() {
        let mut args = make_args();
        args.window_days = Some(MAX_WINDOW_DAYS);
        args.window_weeks = Some(MAX_WINDOW_WEEKS);
        assert!(args.validate().is_ok());

        let mut args = make_args();
        args.window_days = Some(95_000_000);
        assert!(args.validate().unwrap_err().contains("--window-days"));

        let mut args = make_args();
        args.window_weeks = Some(20_000_000);
        assert!(args.validate().unwrap_err().contains("--window-weeks"));
    }

    #[test]
    fn test_init_config_skips_validation() {
        let mut args = make_args();
        args.input = None;
        args.init_config = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_item_query_from_flags() {
        let mut args = make_args();
        args.search = Some("vpn".to_string());
        args.status = Some("in progress".to_string());
        args.severity = Some("high".to_string());
        args.timeline = Some("due-soon".to_string());
        args.only = Some("gaps".to_string());

        let query = args.item_query();
        assert_eq!(query.search.as_deref(), Some("vpn"));
        assert_eq!(query.status, Some(ItemStatus::InProgress));
        assert_eq!(query.severity, Some(Severity::High));
        assert_eq!(query.timeline, Some(TimelineStatus::DueSoon));
        assert_eq!(query.kind, Some(ItemKind::Gap));
    }
}
