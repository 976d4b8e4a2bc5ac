//! Output module for per-URL outcomes and run reports
//!
//! This module handles:
//! - Receiving every terminal per-URL outcome from the workflow
//! - Building run summaries and markdown reports
//! - Printing console statistics
//! - Deriving the playback URL of a finished capture

mod collector;
mod markdown;
pub mod stats;
mod traits;

pub use collector::ReportCollector;
pub use markdown::{format_markdown_report, generate_markdown_report};
pub use stats::print_statistics;
pub use traits::{CaptureRecord, OutputError, OutputHandler, OutputResult, RunSummary};

/// Builds the playback URL of a capture
///
/// # Examples
///
/// ```
/// use wayback_archiver::output::format_archive_url;
///
/// let url = format_archive_url(
///     "https://web.archive.org/web",
///     "20250115120000",
///     "https://example.com/",
/// );
/// assert_eq!(url, "https://web.archive.org/web/20250115120000/https://example.com/");
/// ```
pub fn format_archive_url(playback_prefix: &str, timestamp: &str, original_url: &str) -> String {
    format!(
        "{}/{}/{}",
        playback_prefix.trim_end_matches('/'),
        timestamp,
        original_url
    )
}
