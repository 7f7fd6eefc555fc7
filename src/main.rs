//! AgingScope - aging and timeline analytics for GRC registers
//!
//! A CLI tool that reads JSON exports of findings, gaps and threats and
//! reports how old they are, what is overdue, and how the backlog trends.
//!
//! Exit codes:
//!   0 - Success (no overdue items, or no --fail-on-overdue set)
//!   1 - Runtime error (unreadable snapshot, bad config, --strict rejection)
//!   2 - Overdue items present with --fail-on-overdue

use agingscope::analysis::{page_strip, select_page, AgingAnalyzer, ItemQuery, MAX_VISIBLE_PAGES};
use agingscope::cli::{Args, OutputFormat};
use agingscope::config::{Config, CONFIG_FILE_NAME};
use agingscope::models::{ItemKind, ItemPage, Report, ReportMetadata, SkippedRecord, TrackedItem};
use agingscope::{report, snapshot};
use anyhow::{Context, Result};
use chrono::{NaiveDateTime, Utc};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Config can raise the log level
    let (config, config_source) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };

    init_logging(&args, &config)?;

    info!("AgingScope v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    match config_source {
        Some(path) => info!("Loaded config from: {}", path.display()),
        None => debug!("No config file found, using defaults"),
    }

    match run_report(args, config) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Report failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .agingscope.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to customize windows, age buckets, and paging.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args, config: &Config) -> Result<()> {
    let level = if config.general.verbose && !args.quiet {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

/// Run the complete report workflow. Returns exit code (0 or 2).
fn run_report(args: Args, mut config: Config) -> Result<i32> {
    let start_time = Instant::now();

    config.merge_with_args(&args);

    // One reference instant for the whole run
    let now = match args.now {
        Some(ref value) => snapshot::parse_reference(value)?,
        None => Utc::now().naive_utc(),
    };
    info!("Reference time: {}", now);

    let input = args
        .input
        .as_deref()
        .context("--input is required")?;

    // Step 1: Load the snapshot
    if !args.quiet && !args.stdout {
        println!("📥 Loading snapshot: {}", input.display());
    }
    let sources = snapshot::load(input)?;
    let files_loaded = sources.len();
    if files_loaded == 0 {
        warn!("No JSON exports found under {}", input.display());
    }

    // Step 2: Normalize records
    let default_kind = ItemKind::parse(&config.general.default_kind).unwrap_or_else(|| {
        warn!(
            "Unknown default kind '{}', using finding",
            config.general.default_kind
        );
        ItemKind::Finding
    });
    let normalized = snapshot::normalize_sources(sources, default_kind);

    if args.strict && !normalized.rejected.is_empty() {
        let first = &normalized.rejected[0];
        anyhow::bail!(
            "{} record(s) rejected; first in {} at position {}: {}",
            normalized.rejected.len(),
            first.source,
            first.index + 1,
            first.error
        );
    }

    let items = normalized.items;
    info!("Analyzing {} items", items.len());

    // Step 3: Analyze
    let analyzer = AgingAnalyzer::new(config.analyzer_settings());
    debug!("Analyzer settings: {:?}", analyzer.settings());
    let analytics = analyzer.analyze(&items, now);

    // Step 4: Page the item table
    let item_page = if config.report.include_items {
        Some(build_item_page(
            &analyzer,
            &items,
            &args.item_query(),
            args.page,
            config.report.page_size,
            now,
        ))
    } else {
        None
    };

    let skipped: Vec<SkippedRecord> = normalized
        .rejected
        .iter()
        .map(|r| SkippedRecord {
            source: r.source.clone(),
            id: r
                .id
                .clone()
                .unwrap_or_else(|| format!("{}#{}", r.source, r.index + 1)),
            reason: r.error.to_string(),
        })
        .collect();

    let duration = start_time.elapsed().as_secs_f64();

    // Step 5: Build the report
    let report = Report {
        metadata: ReportMetadata {
            source: input.display().to_string(),
            reference_time: now,
            generated_at: Utc::now(),
            files_loaded,
            items_analyzed: items.len(),
            items_skipped: skipped.len(),
            duration_seconds: duration,
        },
        analytics,
        items: item_page,
        skipped,
    };

    // Step 6: Render and write
    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
    };

    if args.stdout {
        println!("{}", output);
    } else {
        let path = output_path(&args, &config);
        std::fs::write(&path, &output)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;

        if !args.quiet {
            print_summary(&report, duration);
            println!("\n✅ Report saved to: {}", path.display());
        }
    }

    // Check --fail-on-overdue
    let overdue = report.analytics.summary.overdue;
    if args.fail_on_overdue && overdue > 0 {
        eprintln!(
            "\n⛔ {} overdue item(s) found. Failing (exit code 2).",
            overdue
        );
        return Ok(2);
    }

    Ok(0)
}

/// Filter and page the item table.
fn build_item_page(
    analyzer: &AgingAnalyzer,
    items: &[TrackedItem],
    query: &ItemQuery,
    page: usize,
    page_size: usize,
    now: NaiveDateTime,
) -> ItemPage {
    let selected = select_page(items, query, page, page_size, now);

    if selected.page != page {
        warn!(
            "Page {} is out of range, showing page {} of {}",
            page, selected.page, selected.total_pages
        );
    }

    ItemPage {
        filters: describe_query(query),
        page: selected.page,
        page_size: selected.page_size,
        total_pages: selected.total_pages,
        total_items: selected.total_items,
        start_index: selected.start_index,
        end_index: selected.end_index,
        links: page_strip(selected.page, selected.total_pages, MAX_VISIBLE_PAGES),
        items: selected
            .items
            .into_iter()
            .map(|item| analyzer.assess(item, now))
            .collect(),
    }
}

/// Human-readable list of active filters, empty when none are set.
fn describe_query(query: &ItemQuery) -> String {
    if !query.is_filtered() {
        return String::new();
    }

    let mut parts = Vec::new();

    if let Some(ref search) = query.search {
        parts.push(format!("search \"{}\"", search));
    }
    if let Some(ref status) = query.status {
        parts.push(format!("status {}", status));
    }
    if let Some(severity) = query.severity {
        parts.push(format!("severity {}", severity));
    }
    if let Some(timeline) = query.timeline {
        parts.push(format!("timeline {}", timeline));
    }
    if let Some(kind) = query.kind {
        parts.push(format!("kind {}", kind));
    }

    parts.join(", ")
}

/// Report path: explicit --output, else the configured path. A Markdown
/// default is given a `.json` extension for JSON output.
fn output_path(args: &Args, config: &Config) -> PathBuf {
    let path = PathBuf::from(&config.general.output);

    let is_md = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("md"));

    if args.output.is_none() && args.format == OutputFormat::Json && is_md {
        path.with_extension("json")
    } else {
        path
    }
}

fn print_summary(report: &Report, duration: f64) {
    let summary = &report.analytics.summary;

    println!("\n📊 Aging Summary:");
    println!(
        "   Items: {} ({} open, {} resolved)",
        summary.total, summary.open, summary.resolved
    );
    println!(
        "   - ⛔ Overdue: {} | ⏳ Due soon: {} | 🔴 Over 90 days: {}",
        summary.overdue, summary.due_soon, summary.critical_aging
    );
    println!(
        "   Average age: {:.0} days | Resolution rate: {}%",
        summary.avg_aging_days, summary.resolution_rate
    );
    if report.metadata.items_skipped > 0 {
        println!(
            "   ⚠️  Skipped {} unreadable record(s)",
            report.metadata.items_skipped
        );
    }
    println!("   Duration: {:.1}s", duration);
}

/// Load configuration from file or use defaults.
///
/// Runs before logging is initialized, so the source path is returned for
/// the caller to log.
fn load_config(args: &Args) -> Result<(Config, Option<PathBuf>)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Ok((Config::load(config_path)?, Some(config_path.clone())));
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok((config, Some(PathBuf::from(CONFIG_FILE_NAME)))),
        Ok(None) => Ok((Config::default(), None)),
        Err(e) => {
            eprintln!("⚠️  Failed to load config, using defaults: {:#}", e);
            Ok((Config::default(), None))
        }
    }
}
