//! Runtime settings.
//!
//! Settings are layered: built-in defaults, then an optional YAML file, then
//! command-line flags. A minimal YAML file only names what it changes:
//!
//! ```yaml
//! years: ["2022", "2023", "2024"]
//! allowed_domains: []        # empty = any host
//! download_delay_ms: 250
//! feed_format: jsonlines
//! output: hits.jsonl
//! ```

use crate::cli::Cli;
use crate::outputs::FeedFormat;
use serde::Deserialize;
use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument};

/// All knobs controlling a crawl.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// CSV file listing one URL per row.
    pub urls_file: PathBuf,
    /// Where the feed is written.
    pub output: PathBuf,
    pub feed_format: FeedFormat,
    /// The year set. Each entry must be four ASCII digits.
    pub years: Vec<String>,
    /// Hosts (and their subdomains) that may be fetched. Empty allows all.
    pub allowed_domains: Vec<String>,
    /// Minimum gap between request starts.
    pub download_delay_ms: u64,
    /// Draw each gap from 0.5x..1.5x of the delay.
    pub randomize_download_delay: bool,
    pub concurrent_requests: usize,
    pub retry_times: usize,
    /// Base of the exponential backoff between retries.
    pub retry_backoff_ms: u64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Tracing filter used when `RUST_LOG` is not set.
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            urls_file: PathBuf::from("urls.csv"),
            output: PathBuf::from("incompleteyears.csv"),
            feed_format: FeedFormat::Csv,
            years: ["2019", "2020", "2021", "2022", "2023"]
                .into_iter()
                .map(String::from)
                .collect(),
            allowed_domains: vec!["snacknation.com".to_string()],
            download_delay_ms: 1000,
            randomize_download_delay: true,
            concurrent_requests: 16,
            retry_times: 2,
            retry_backoff_ms: 500,
            request_timeout_secs: 180,
            user_agent: format!("year_finder/{}", env!("CARGO_PKG_VERSION")),
            log_level: "error".to_string(),
        }
    }
}

/// A setting that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidSetting {
    pub field: &'static str,
    pub reason: String,
}

impl fmt::Display for InvalidSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid setting `{}`: {}", self.field, self.reason)
    }
}

impl Error for InvalidSetting {}

impl Settings {
    /// Defaults, overlaid with the YAML file at `path` when one is given.
    #[instrument(level = "info")]
    pub async fn load(path: Option<&Path>) -> Result<Self, Box<dyn Error>> {
        match path {
            Some(path) => {
                let raw = tokio::fs::read_to_string(path).await?;
                let settings = Self::from_yaml(&raw)?;
                info!(path = %path.display(), "Loaded settings file");
                Ok(settings)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document deserializes as unit, not as an empty map.
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    /// Overlay flags the user actually passed.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(urls_file) = &cli.urls_file {
            self.urls_file = urls_file.clone();
        }
        if let Some(output) = &cli.output {
            self.output = output.clone();
        }
        if let Some(format) = cli.feed_format {
            self.feed_format = format;
        }
        if let Some(years) = &cli.years {
            self.years = years.iter().map(|y| y.trim().to_string()).collect();
        }
        if cli.any_domain {
            self.allowed_domains.clear();
        } else if !cli.allowed_domains.is_empty() {
            self.allowed_domains = cli.allowed_domains.clone();
        }
        if let Some(delay) = cli.download_delay_ms {
            self.download_delay_ms = delay;
        }
        if let Some(concurrency) = cli.concurrent_requests {
            self.concurrent_requests = concurrency;
        }
        if let Some(retry_times) = cli.retry_times {
            self.retry_times = retry_times;
        }
        if let Some(level) = &cli.log_level {
            self.log_level = level.clone();
        }
    }

    pub fn validate(&self) -> Result<(), InvalidSetting> {
        if self.years.is_empty() {
            return Err(InvalidSetting {
                field: "years",
                reason: "at least one year is required".to_string(),
            });
        }
        if let Some(bad) = self
            .years
            .iter()
            .find(|y| y.len() != 4 || !y.bytes().all(|b| b.is_ascii_digit()))
        {
            return Err(InvalidSetting {
                field: "years",
                reason: format!("{bad:?} is not a four-digit year"),
            });
        }
        if self.concurrent_requests == 0 {
            return Err(InvalidSetting {
                field: "concurrent_requests",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn download_delay(&self) -> Duration {
        Duration::from_millis(self.download_delay_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
