//! Markdown report generation.
//!
//! This module renders an aging [`Report`] as Markdown or JSON.

use crate::analysis::{
    AgingAnalytics, AgingSummary, BucketCount, DailyPoint, ItemAging, PageLink, SeverityAging,
    TimelineStatus, WeeklyPoint,
};
use crate::models::{ItemPage, Report, ReportMetadata, SkippedRecord};
use anyhow::Result;

/// Cells in a rendered progress bar.
const BAR_WIDTH: usize = 10;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();

    // Title
    output.push_str("# Aging Report\n\n");

    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_table_of_contents(report));
    output.push_str(&generate_summary_section(&report.analytics));
    output.push_str(&generate_distribution_section(&report.analytics));
    output.push_str(&generate_oldest_section(&report.analytics.oldest_open));
    output.push_str(&generate_trend_section(&report.analytics.weekly));
    output.push_str(&generate_daily_section(&report.analytics.daily));

    if let Some(ref page) = report.items {
        output.push_str(&generate_items_section(page));
    }

    output.push_str(&generate_skipped_section(&report.skipped));
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** `{}`\n", metadata.source));
    section.push_str(&format!(
        "- **Reference Time:** {}\n",
        metadata.reference_time.format("%Y-%m-%d %H:%M:%S")
    ));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Files Loaded:** {}\n", metadata.files_loaded));
    section.push_str(&format!(
        "- **Items Analyzed:** {}\n",
        metadata.items_analyzed
    ));
    if metadata.items_skipped > 0 {
        section.push_str(&format!(
            "- **Items Skipped:** {}\n",
            metadata.items_skipped
        ));
    }
    section.push_str(&format!(
        "- **Duration:** {:.2}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the table of contents.
fn generate_table_of_contents(report: &Report) -> String {
    let mut toc = String::new();

    toc.push_str("## Table of Contents\n\n");
    toc.push_str("- [Metadata](#metadata)\n");
    toc.push_str("- [Summary](#summary)\n");
    toc.push_str("- [Age Distribution](#age-distribution)\n");

    if !report.analytics.oldest_open.is_empty() {
        toc.push_str("- [Oldest Open Items](#oldest-open-items)\n");
    }

    toc.push_str("- [Weekly Aging Trend](#weekly-aging-trend)\n");
    toc.push_str("- [Daily Timeline](#daily-timeline)\n");

    if report.items.is_some() {
        toc.push_str("- [Items](#items)\n");
    }

    if !report.skipped.is_empty() {
        toc.push_str("- [Skipped Records](#skipped-records)\n");
    }

    toc.push('\n');

    toc
}

fn generate_headline_table(summary: &AgingSummary) -> String {
    let mut table = String::new();

    table.push_str("| Total | Open | Resolved | ⛔ Overdue | ⏳ Due Soon | Avg Aging | > 90 Days | Resolution Rate |\n");
    table.push_str("|:---:|:---:|:---:|:---:|:---:|:---:|:---:|:---:|\n");
    table.push_str(&format!(
        "| **{}** | {} | {} | {} | {} | {} days | {} | {}% |\n\n",
        summary.total,
        summary.open,
        summary.resolved,
        summary.overdue,
        summary.due_soon,
        summary.avg_aging_days.round(),
        summary.critical_aging,
        summary.resolution_rate
    ));

    table
}

/// Generate the summary section.
fn generate_summary_section(analytics: &AgingAnalytics) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str(&generate_headline_table(&analytics.summary));

    if analytics.summary.total == 0 {
        section.push_str("The snapshot contains no items.\n\n");
        return section;
    }

    section.push_str("### Timeline Status\n\n");
    section.push_str("| Status | Items |\n");
    section.push_str("|:---|:---:|\n");
    for (status, count) in &analytics.timeline_breakdown {
        section.push_str(&format!(
            "| {} {} | {} |\n",
            status.style_hint().emoji(),
            status,
            count
        ));
    }
    section.push('\n');

    section.push_str(&generate_severity_table(&analytics.severity_aging));

    section
}

/// Severity rows with no items are left out.
fn generate_severity_table(rows: &[SeverityAging]) -> String {
    let rows: Vec<_> = rows.iter().filter(|r| r.count > 0).collect();
    if rows.is_empty() {
        return String::new();
    }

    let mut table = String::new();
    table.push_str("### Aging by Severity\n\n");
    table.push_str("| Severity | Items | Avg Aging |\n");
    table.push_str("|:---|:---:|:---:|\n");
    for row in rows {
        table.push_str(&format!(
            "| {} {} | {} | {} days |\n",
            row.severity.emoji(),
            row.severity,
            row.count,
            row.avg_aging_days.round()
        ));
    }
    table.push('\n');

    table
}

/// Generate the age distribution section.
fn generate_distribution_section(analytics: &AgingAnalytics) -> String {
    let mut section = String::new();

    section.push_str("## Age Distribution\n\n");
    section.push_str("| Age | Items | Share |\n");
    section.push_str("|:---|:---:|:---|\n");

    let total = analytics.summary.total;
    for BucketCount { label, count } in &analytics.age_distribution {
        let share = if total == 0 {
            0.0
        } else {
            *count as f64 / total as f64 * 100.0
        };
        section.push_str(&format!(
            "| {} | {} | {} {:.0}% |\n",
            label,
            count,
            share_bar(share),
            share
        ));
    }
    section.push('\n');

    section
}

/// Render a percentage as a fixed-width bar.
fn share_bar(percent: f64) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

/// Render an item's aging progress using its tier colour.
fn progress_bar(item: &ItemAging) -> String {
    let filled = ((item.progress / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!(
        "{}{}",
        item.tier.emoji().repeat(filled),
        "⬜".repeat(BAR_WIDTH - filled)
    )
}

fn due_text(item: &ItemAging) -> String {
    match item.timeline.status {
        TimelineStatus::Completed | TimelineStatus::NoDueDate => "-".to_string(),
        _ if item.overdue_days > 0 => format!("{} days overdue", item.overdue_days),
        _ if item.overdue_days == 0 => "due today".to_string(),
        _ => format!("due in {} days", -item.overdue_days),
    }
}

fn generate_item_row(item: &ItemAging) -> String {
    format!(
        "| `{}` | {} | {} | {} | {} days | {} | {} {} | {} | {} |\n",
        escape_cell(&item.id),
        escape_cell(&item.title),
        item.severity
            .map(|s| format!("{} {}", s.emoji(), s))
            .unwrap_or_else(|| "-".to_string()),
        item.status,
        item.age_days,
        item.badge,
        item.timeline.style_hint.emoji(),
        item.timeline.status,
        due_text(item),
        progress_bar(item),
    )
}

const ITEM_TABLE_HEADER: &str = "| ID | Title | Severity | Status | Age | Badge | Timeline | Due | Aging |\n|:---|:---|:---|:---|:---:|:---:|:---|:---|:---|\n";

/// Generate the oldest open items section.
fn generate_oldest_section(items: &[ItemAging]) -> String {
    if items.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Oldest Open Items\n\n");
    section.push_str(ITEM_TABLE_HEADER);
    for item in items {
        section.push_str(&generate_item_row(item));
    }
    section.push('\n');

    section
}

/// Generate the weekly trend section.
fn generate_trend_section(weeks: &[WeeklyPoint]) -> String {
    let mut section = String::new();

    section.push_str("## Weekly Aging Trend\n\n");
    if weeks.is_empty() {
        section.push_str("No weeks in the configured window.\n\n");
        return section;
    }

    section.push_str("| Week | From | To | Identified | Resolved | Avg Aging |\n");
    section.push_str("|:---|:---|:---|:---:|:---:|:---:|\n");
    for week in weeks {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} days |\n",
            week.week_label,
            week.week_start,
            week.week_end,
            week.identified,
            week.resolved,
            week.avg_aging_days.round()
        ));
    }
    section.push('\n');

    section
}

/// Generate the daily timeline section. Days without activity are omitted
/// from the table.
fn generate_daily_section(days: &[DailyPoint]) -> String {
    let mut section = String::new();

    section.push_str("## Daily Timeline\n\n");
    if days.is_empty() {
        section.push_str("No days in the configured window.\n\n");
        return section;
    }

    let active: Vec<_> = days
        .iter()
        .filter(|d| d.created > 0 || d.resolved > 0 || d.overdue_snapshot > 0)
        .collect();

    if let (Some(first), Some(last)) = (days.first(), days.last()) {
        section.push_str(&format!(
            "*{} to {}: {} of {} days with activity*\n\n",
            first.date,
            last.date,
            active.len(),
            days.len()
        ));
    }

    if active.is_empty() {
        return section;
    }

    section.push_str("| Date | Created | Resolved | Overdue |\n");
    section.push_str("|:---|:---:|:---:|:---:|\n");
    for day in active {
        section.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            day.date.format("%a %Y-%m-%d"),
            day.created,
            day.resolved,
            day.overdue_snapshot
        ));
    }
    section.push('\n');

    section
}

fn render_page_links(links: &[PageLink], current: usize) -> String {
    links
        .iter()
        .map(|link| match link {
            PageLink::Number(n) if *n == current => format!("**{}**", n),
            PageLink::Number(n) => n.to_string(),
            PageLink::Ellipsis => "…".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Generate the paged item table.
fn generate_items_section(page: &ItemPage) -> String {
    let mut section = String::new();

    section.push_str("## Items\n\n");
    if !page.filters.is_empty() {
        section.push_str(&format!("*Filters: {}*\n\n", page.filters));
    }

    if page.items.is_empty() {
        section.push_str("No items match the current filters.\n\n");
        return section;
    }

    section.push_str(&format!(
        "*Showing {}-{} of {} (page {} of {})*\n\n",
        page.start_index, page.end_index, page.total_items, page.page, page.total_pages
    ));

    section.push_str(ITEM_TABLE_HEADER);
    for item in &page.items {
        section.push_str(&generate_item_row(item));
    }
    section.push('\n');

    if page.total_pages > 1 {
        section.push_str(&format!(
            "Pages: {}\n\n",
            render_page_links(&page.links, page.page)
        ));
    }

    section
}

/// Generate the skipped records section.
fn generate_skipped_section(skipped: &[SkippedRecord]) -> String {
    if skipped.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Skipped Records\n\n");
    section.push_str(
        "These records were excluded because they could not be read:\n\n",
    );
    section.push_str("| Source | Record | Reason |\n");
    section.push_str("|:---|:---|:---|\n");
    for record in skipped {
        section.push_str(&format!(
            "| {} | `{}` | {} |\n",
            escape_cell(&record.source),
            escape_cell(&record.id),
            escape_cell(&record.reason)
        ));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str("*Report generated by AgingScope*\n");

    footer
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}
