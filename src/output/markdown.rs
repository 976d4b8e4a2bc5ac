//! Markdown report generation
//!
//! This module renders a run summary as a human-readable markdown document:
//! overall counts, a per-state breakdown, archived captures and failures.

use crate::output::traits::{OutputResult, RunSummary};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a markdown report of the run to `output_path`
///
/// # Arguments
///
/// * `summary` - The run summary data
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the report
/// * `Err(OutputError)` - Failed to write the report
pub fn generate_markdown_report(summary: &RunSummary, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_report(summary);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a run summary as markdown
pub fn format_markdown_report(summary: &RunSummary) -> String {
    let mut md = String::new();

    md.push_str("# Wayback Archiver Run Report\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Started**: {}\n", summary.started_at));
    if let Some(finished) = &summary.finished_at {
        md.push_str(&format!("- **Finished**: {}\n", finished));
    }
    if let Some(duration) = summary.duration_seconds {
        md.push_str(&format!(
            "- **Duration**: {} seconds ({:.2} minutes)\n",
            duration,
            duration as f64 / 60.0
        ));
    }
    md.push('\n');

    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Total URLs**: {}\n", summary.total_urls));
    md.push_str(&format!("- **Archived**: {}\n", summary.archived));
    md.push_str(&format!("- **Failed**: {}\n", summary.failed));
    md.push_str(&format!(
        "- **Success Rate**: {:.2}%\n\n",
        summary.success_rate()
    ));

    if !summary.by_state.is_empty() {
        md.push_str("## Outcome Breakdown\n\n");
        md.push_str("| Outcome | Count |\n");
        md.push_str("|---------|-------|\n");
        for (state, count) in &summary.by_state {
            md.push_str(&format!("| {} | {} |\n", state.label(), count));
        }
        md.push('\n');
    }

    if !summary.archived_urls.is_empty() {
        md.push_str("## Archived Captures\n\n");
        md.push_str("| URL | Capture |\n");
        md.push_str("|-----|---------|\n");
        for (url, archive_url) in &summary.archived_urls {
            md.push_str(&format!("| {} | {} |\n", url, archive_url));
        }
        md.push('\n');
    }

    if !summary.failures.is_empty() {
        md.push_str("## Failures\n\n");
        md.push_str("| URL | Outcome | Reason |\n");
        md.push_str("|-----|---------|--------|\n");
        for (url, state, reason) in &summary.failures {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                url,
                state.label(),
                reason.replace('|', "\\|")
            ));
        }
        md.push('\n');
    }

    md
}
