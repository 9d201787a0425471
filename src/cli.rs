//! Command-line interface definitions for Year Finder.
//!
//! Every option is optional: anything left unset falls back to the YAML
//! config file (if given) and then to the built-in defaults in
//! [`crate::config::Settings`].

use crate::outputs::FeedFormat;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the Year Finder application.
///
/// # Examples
///
/// ```sh
/// # Defaults: read urls.csv, write incompleteyears.csv
/// year_finder
///
/// # Different year set and output format
/// year_finder -i pages.csv -o hits.json -f json --years 2015,2016
///
/// # Crawl any host, no delay
/// year_finder --allowed-domain example.com --allowed-domain example.org --delay-ms 0
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML settings file
    #[arg(short, long, env = "YEAR_FINDER_CONFIG")]
    pub config: Option<PathBuf>,

    /// CSV file with one URL per row (first column)
    #[arg(short = 'i', long = "urls", env = "YEAR_FINDER_URLS")]
    pub urls_file: Option<PathBuf>,

    /// Output feed path
    #[arg(short, long, env = "YEAR_FINDER_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Output feed format
    #[arg(short = 'f', long = "format", value_enum, env = "YEAR_FINDER_FORMAT")]
    pub feed_format: Option<FeedFormat>,

    /// Comma-separated list of years to search for
    #[arg(long, value_delimiter = ',', env = "YEAR_FINDER_YEARS")]
    pub years: Option<Vec<String>>,

    /// Domain whose pages may be fetched (repeatable)
    #[arg(long = "allowed-domain", conflicts_with = "any_domain")]
    pub allowed_domains: Vec<String>,

    /// Fetch pages on any host, clearing the allowed domain list
    #[arg(long)]
    pub any_domain: bool,

    /// Minimum delay between requests, in milliseconds
    #[arg(long = "delay-ms", env = "YEAR_FINDER_DELAY_MS")]
    pub download_delay_ms: Option<u64>,

    /// Maximum number of requests in flight
    #[arg(long = "concurrency")]
    pub concurrent_requests: Option<usize>,

    /// Extra attempts for timeouts and retryable HTTP statuses
    #[arg(long)]
    pub retry_times: Option<usize>,

    /// Log filter used when RUST_LOG is not set (e.g. "info", "year_finder=debug")
    #[arg(long)]
    pub log_level: Option<String>,
}
