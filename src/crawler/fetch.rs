//! HTTP page fetching.
//!
//! [`FetchAsync`] is the seam between the crawl loop and the network. The
//! production implementation is [`HttpFetcher`]; [`super::retry::RetryFetch`]
//! decorates any implementation with retries.

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use std::error::Error;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, instrument};

/// HTTP statuses worth another attempt.
const RETRY_HTTP_CODES: [u16; 8] = [500, 502, 503, 504, 522, 524, 408, 429];

/// A successfully downloaded page.
#[derive(Debug, Clone)]
pub struct Page {
    /// Final URL after redirects.
    pub url: String,
    /// Raw `Content-Type` header, empty when absent.
    pub content_type: String,
    pub body: String,
}

impl Page {
    pub fn is_html(&self) -> bool {
        self.content_type.contains("text/html")
    }
}

/// Why a page could not be fetched.
#[derive(Debug)]
pub enum FetchError {
    /// Connection, TLS, timeout or body read failure.
    Transport(reqwest::Error),
    /// The server answered with a non-2xx status.
    Status { status: StatusCode, url: String },
}

impl FetchError {
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Transport(_) => true,
            FetchError::Status { status, .. } => RETRY_HTTP_CODES.contains(&status.as_u16()),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Transport(e) => write!(f, "transport error: {e}"),
            FetchError::Status { status, url } => write!(f, "HTTP {status} from {url}"),
        }
    }
}

impl Error for FetchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            FetchError::Transport(e) => Some(e),
            FetchError::Status { .. } => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Transport(e)
    }
}

/// Trait for async page retrieval.
pub trait FetchAsync {
    /// Download `url`, failing on transport errors and non-2xx statuses.
    async fn fetch(&self, url: &str) -> Result<Page, FetchError>;
}

/// [`FetchAsync`] over a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl FetchAsync for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<Page, FetchError> {
        let t0 = Instant::now();
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let final_url = response.url().to_string();

        if !status.is_success() {
            return Err(FetchError::Status {
                status,
                url: final_url,
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response.text().await?;

        debug!(
            %final_url,
            %status,
            %content_type,
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched page"
        );
        Ok(Page {
            url: final_url,
            content_type,
            body,
        })
    }
}
