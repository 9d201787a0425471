//! # Year Finder
//!
//! Fetches a list of web pages and reports every mention of a fixed set of
//! years, with the text around each mention, as a CSV (or JSON/XML) feed.
//!
//! ## Usage
//!
//! ```sh
//! year_finder -i urls.csv -o incompleteyears.csv
//! ```
//!
//! ## Architecture
//!
//! The application follows a linear pipeline:
//! 1. **Input**: Read the URL list (first CSV column)
//! 2. **Crawl**: Fetch pages with a download delay, retries and a domain filter
//! 3. **Scan**: Extract title, meta tags, image attributes and article text,
//!    then match years in each field
//! 4. **Output**: Write every match as a `{year, url, text}` row

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod crawler;
mod extract;
mod input;
mod matcher;
mod models;
mod outputs;
mod utils;

use cli::Cli;
use config::Settings;
use crawler::Crawler;
use crawler::fetch::HttpFetcher;
use crawler::politeness::{AllowedDomains, Throttle, Throttled};
use crawler::retry::RetryFetch;
use matcher::YearMatcher;
use utils::ensure_writable_parent;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();

    let mut settings = Settings::load(args.config.as_deref()).await?;
    settings.apply_cli(&args);

    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_level))
        .unwrap_or_else(|_| EnvFilter::new("error"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    debug!(?args, "Parsed CLI arguments");
    run(settings).await
}

#[instrument(level = "info", skip_all)]
async fn run(settings: Settings) -> Result<(), Box<dyn Error>> {
    let start_time = std::time::Instant::now();

    if let Err(e) = settings.validate() {
        error!(error = %e, "Refusing to start with invalid settings");
        return Err(e.into());
    }
    info!(
        years = ?settings.years,
        allowed_domains = ?settings.allowed_domains,
        delay_ms = settings.download_delay_ms,
        "year_finder starting up"
    );

    // Fail before crawling rather than after.
    if let Err(e) = ensure_writable_parent(&settings.output).await {
        error!(
            path = %settings.output.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let urls = input::load_urls(&settings.urls_file).await?;
    let matcher = YearMatcher::new(settings.years.as_slice())?;

    let http = HttpFetcher::new(&settings.user_agent, settings.request_timeout())?;
    let throttle = Throttle::new(settings.download_delay(), settings.randomize_download_delay);
    let crawler = Crawler::new(
        RetryFetch::new(
            Throttled::new(http, throttle),
            settings.retry_times,
            settings.retry_backoff(),
        ),
        matcher,
        AllowedDomains::new(settings.allowed_domains.as_slice()),
        settings.concurrent_requests,
    );

    let report = crawler.run(urls).await;

    outputs::write_feed(&report.records, settings.feed_format, &settings.output).await?;
    info!(
        path = %settings.output.display(),
        records = report.stats.records,
        "Wrote year matches"
    );

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        stats = ?report.stats,
        "Execution complete"
    );
    Ok(())
}
