//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.agingscope.toml` files.

use crate::analysis::{
    default_buckets, validate_buckets, AgeBucket, AnalyzerSettings, DEFAULT_PROGRESS_CAP_DAYS,
    DEFAULT_WINDOW_DAYS, DEFAULT_WINDOW_WEEKS, MAX_WINDOW_DAYS, MAX_WINDOW_WEEKS,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".agingscope.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Analysis windows and ranges.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Register assumed for records that do not name one.
    #[serde(default = "default_kind")]
    pub default_kind: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
            default_kind: default_kind(),
        }
    }
}

fn default_output() -> String {
    "aging_report.md".to_string()
}

fn default_kind() -> String {
    "finding".to_string()
}

/// Analyzer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Days covered by the daily timeline.
    #[serde(default = "default_window_days")]
    pub window_days: u32,

    /// Weeks covered by the weekly aging trend.
    #[serde(default = "default_window_weeks")]
    pub window_weeks: u32,

    /// Age at which the progress bar is full.
    #[serde(default = "default_progress_cap")]
    pub progress_cap_days: u64,

    /// Age distribution ranges; the last one must be open-ended.
    #[serde(default = "default_buckets")]
    pub buckets: Vec<AgeBucket>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
            window_weeks: default_window_weeks(),
            progress_cap_days: default_progress_cap(),
            buckets: default_buckets(),
        }
    }
}

fn default_window_days() -> u32 {
    DEFAULT_WINDOW_DAYS
}

fn default_window_weeks() -> u32 {
    DEFAULT_WINDOW_WEEKS
}

fn default_progress_cap() -> u64 {
    DEFAULT_PROGRESS_CAP_DAYS
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Include the paged item table.
    #[serde(default = "default_true")]
    pub include_items: bool,

    /// Items per page in the item table.
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Number of oldest open items to highlight.
    #[serde(default = "default_top_oldest")]
    pub top_oldest: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            include_items: true,
            page_size: default_page_size(),
            top_oldest: default_top_oldest(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_page_size() -> usize {
    25
}

fn default_top_oldest() -> usize {
    10
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Check values the type system cannot.
    pub fn validate(&self) -> Result<()> {
        validate_buckets(&self.analysis.buckets)?;

        if self.report.page_size == 0 {
            anyhow::bail!("report.page_size must be at least 1");
        }

        if self.analysis.window_days > MAX_WINDOW_DAYS {
            anyhow::bail!("analysis.window_days must be at most {}", MAX_WINDOW_DAYS);
        }

        if self.analysis.window_weeks > MAX_WINDOW_WEEKS {
            anyhow::bail!("analysis.window_weeks must be at most {}", MAX_WINDOW_WEEKS);
        }

        Ok(())
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(days) = args.window_days {
            self.analysis.window_days = days;
        }
        if let Some(weeks) = args.window_weeks {
            self.analysis.window_weeks = weeks;
        }
        if let Some(cap) = args.progress_cap {
            self.analysis.progress_cap_days = cap;
        }
        if let Some(size) = args.page_size {
            self.report.page_size = size;
        }
        if let Some(top) = args.top {
            self.report.top_oldest = top;
        }
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }
        if let Some(ref kind) = args.kind {
            self.general.default_kind = kind.clone();
        }

        // Flags always override
        if args.no_items {
            self.report.include_items = false;
        }
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Analyzer settings derived from this configuration.
    pub fn analyzer_settings(&self) -> AnalyzerSettings {
        AnalyzerSettings {
            window_days: self.analysis.window_days,
            window_weeks: self.analysis.window_weeks,
            progress_cap_days: self.analysis.progress_cap_days,
            buckets: self.analysis.buckets.clone(),
            top_oldest: self.report.top_oldest,
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
