//! Wayback Archiver main entry point
//!
//! This is the command-line interface for submitting pages to the Wayback
//! Machine through the Save Page Now API.

use anyhow::{bail, Context};
use clap::Parser;
use rand::seq::SliceRandom;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;
use wayback_archiver::client::{CaptureParamValue, CaptureParams, Spn2Client};
use wayback_archiver::config::{load_config_or_default, Config, Credentials};
use wayback_archiver::output::{
    generate_markdown_report, print_statistics, ReportCollector, RunSummary,
};
use wayback_archiver::url::{collect_urls, read_url_file};
use wayback_archiver::{ArchiverError, CaptureUrl, Coordinator};

/// Wayback Archiver: back up web pages with the Internet Archive
///
/// Submits every URL to the Save Page Now service, follows the capture jobs
/// until they finish and retries the ones that hit temporary trouble.
#[derive(Parser, Debug)]
#[command(name = "wayback-archiver")]
#[command(version)]
#[command(about = "Back up web pages with the Internet Archive", long_about = None)]
struct Cli {
    /// URLs of the pages to archive
    #[arg(value_name = "URL")]
    urls: Vec<String>,

    /// File containing URLs to archive, one per line
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Path to TOML configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Seconds to wait before each submission (overrides the config file)
    #[arg(long, value_name = "SECONDS")]
    rate_limit_wait: Option<u64>,

    /// Randomize the order of pages before archiving
    #[arg(long)]
    random_order: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Write logs to a file instead of stderr
    #[arg(long, value_name = "PATH")]
    log_to_file: Option<PathBuf>,

    /// Write a markdown report of the run to this path
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,

    /// Validate input and configuration, then show what would be submitted
    #[arg(long)]
    dry_run: bool,

    #[command(flatten)]
    capture: CaptureFlags,
}

/// Capture options forwarded to the service on every submission
#[derive(clap::Args, Debug, Default)]
struct CaptureFlags {
    /// Capture the page even if it returns an error status
    #[arg(long)]
    capture_all: bool,

    /// Also capture the pages the page links to
    #[arg(long)]
    capture_outlinks: bool,

    /// Capture a screenshot of the page
    #[arg(long)]
    capture_screenshot: bool,

    /// Delay the capture becoming available in the Wayback Machine
    #[arg(long)]
    delay_wb_availability: bool,

    /// Fetch the page with a plain GET instead of a browser
    #[arg(long)]
    force_get: bool,

    /// Skip checking whether this is the first capture of the page
    #[arg(long)]
    skip_first_archive: bool,

    /// Ask the service to email the capture result to the account
    #[arg(long)]
    email_result: bool,

    /// Report outlink availability along with the capture
    #[arg(long)]
    outlinks_availability: bool,

    /// Skip pages archived more recently than this (e.g. "10d 5h")
    #[arg(long, value_name = "TIMEDELTA")]
    if_not_archived_within: Option<String>,

    /// Seconds to run page JavaScript behaviors before capturing
    #[arg(long, value_name = "SECONDS")]
    js_behavior_timeout: Option<i64>,

    /// Cookie to send with the capture request
    #[arg(long, value_name = "COOKIE")]
    capture_cookie: Option<String>,

    /// User agent the capture browser should use
    #[arg(long = "user-agent", value_name = "AGENT")]
    use_user_agent: Option<String>,
}

impl CaptureFlags {
    /// Merges the flags over `base`; a flag given on the command line wins
    fn apply_to(&self, mut base: CaptureParams) -> CaptureParams {
        let switches = [
            ("capture_all", self.capture_all),
            ("capture_outlinks", self.capture_outlinks),
            ("capture_screenshot", self.capture_screenshot),
            ("delay_wb_availability", self.delay_wb_availability),
            ("force_get", self.force_get),
            ("skip_first_archive", self.skip_first_archive),
            ("email_result", self.email_result),
            ("outlinks_availability", self.outlinks_availability),
        ];
        for (name, enabled) in switches {
            if enabled {
                base.insert(name.to_string(), CaptureParamValue::Int(1));
            }
        }

        if let Some(within) = &self.if_not_archived_within {
            base.insert("if_not_archived_within".to_string(), within.as_str().into());
        }
        if let Some(timeout) = self.js_behavior_timeout {
            base.insert("js_behavior_timeout".to_string(), timeout.into());
        }
        if let Some(cookie) = &self.capture_cookie {
            base.insert("capture_cookie".to_string(), cookie.as_str().into());
        }
        if let Some(agent) = &self.use_user_agent {
            base.insert("use_user_agent".to_string(), agent.as_str().into());
        }

        base
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet, cli.log_to_file.as_ref())?;

    let mut config = load_config_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(wait) = cli.rate_limit_wait {
        config.workflow.rate_limit_wait_secs = wait;
    }
    config.capture_params = cli.capture.apply_to(std::mem::take(&mut config.capture_params));

    let urls = gather_urls(&cli).context("Failed to gather URLs")?;
    if urls.is_empty() {
        bail!("No valid URLs to archive; pass URLs as arguments or use --file");
    }

    if cli.dry_run {
        handle_dry_run(&config, &urls);
        return Ok(());
    }

    handle_archive(config, urls, cli.report).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool, log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("wayback_archiver=info,warn"),
            1 => EnvFilter::new("wayback_archiver=debug,info"),
            2 => EnvFilter::new("wayback_archiver=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false);

    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }

    Ok(())
}

/// Collects, validates and de-duplicates URLs from the arguments and --file
fn gather_urls(cli: &Cli) -> wayback_archiver::Result<Vec<CaptureUrl>> {
    let mut candidates = cli.urls.clone();
    if let Some(path) = &cli.file {
        let lines = read_url_file(path).map_err(|e| {
            tracing::error!("Cannot read URL file {}: {}", path.display(), e);
            ArchiverError::Io(e)
        })?;
        tracing::info!("Read {} URLs from {}", lines.len(), path.display());
        candidates.extend(lines);
    }

    let collection = collect_urls(candidates);
    for (candidate, e) in &collection.rejected {
        tracing::warn!("Skipping invalid URL {:?}: {}", candidate, e);
    }
    if collection.duplicates > 0 {
        tracing::info!("Ignored {} duplicate URLs", collection.duplicates);
    }

    let mut urls = collection.urls;
    if cli.random_order {
        tracing::info!("Randomizing the order of {} URLs", urls.len());
        urls.shuffle(&mut rand::thread_rng());
    }

    Ok(urls)
}

/// Handles the --dry-run mode: shows what would be submitted
fn handle_dry_run(config: &Config, urls: &[CaptureUrl]) {
    println!("=== Wayback Archiver Dry Run ===\n");

    println!("Workflow Configuration:");
    println!(
        "  Rate limit wait: {}s",
        config.workflow.rate_limit_wait_secs
    );
    println!(
        "  Max submission retries: {}",
        config.workflow.max_submission_retries
    );
    println!(
        "  Max transient retries: {}",
        config.workflow.max_transient_retries
    );
    println!("  Job timeout: {}s", config.workflow.job_timeout_secs);
    println!(
        "  Idle backoff: {}s x{} up to {}s",
        config.backoff.initial_wait_secs, config.backoff.factor, config.backoff.max_wait_secs
    );

    println!("\nService:");
    println!("  Save endpoint: {}", config.service.save_endpoint);
    println!("  Status endpoint: {}", config.service.status_endpoint);

    println!("\nCapture Parameters ({}):", config.capture_params.len());
    for (name, value) in &config.capture_params {
        println!("  {} = {}", name, value);
    }

    println!("\nURLs ({}):", urls.len());
    for url in urls {
        println!("  - {}", url);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would submit {} URLs", urls.len());
}

/// Handles the main archive operation
async fn handle_archive(
    config: Config,
    urls: Vec<CaptureUrl>,
    report_path: Option<PathBuf>,
) -> anyhow::Result<()> {
    let client = build_client(&config).context("Failed to set up the capture client")?;
    let collector = Arc::new(ReportCollector::new());

    let result = Coordinator::new(Arc::new(client), &config)
        .with_output(collector.clone())
        .run(urls)
        .await;

    let summary = collector.summary();
    println!();
    print_statistics(&result, Some(&summary));

    if let Some(path) = report_path {
        write_report(&summary, &path)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        println!("\n✓ Report written to: {}", path.display());
    }

    Ok(())
}

/// Builds the SPN2 client from the environment credentials
fn build_client(config: &Config) -> wayback_archiver::Result<Spn2Client> {
    let credentials = Credentials::from_env()?;
    tracing::debug!("Using credentials {:?}", credentials);

    Ok(Spn2Client::new(&config.service, &credentials)?)
}

/// Writes the markdown report for a finished run
fn write_report(summary: &RunSummary, path: &Path) -> wayback_archiver::Result<()> {
    generate_markdown_report(summary, path)?;
    Ok(())
}
