//! Request pacing and domain restrictions.

use super::fetch::{FetchAsync, FetchError, Page};
use rand::{Rng, rng};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep_until};
use tracing::trace;
use url::Url;

/// Spaces out request starts by the download delay.
///
/// Callers hold the internal lock while waiting, so concurrent fetches
/// queue up and start one delay apart.
#[derive(Debug)]
pub struct Throttle {
    delay: Duration,
    randomize: bool,
    next_slot: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(delay: Duration, randomize: bool) -> Self {
        Self {
            delay,
            randomize,
            next_slot: Mutex::new(None),
        }
    }

    /// Wait for this request's turn and reserve the next slot.
    pub async fn acquire(&self) {
        if self.delay.is_zero() {
            return;
        }
        let mut next_slot = self.next_slot.lock().await;
        if let Some(at) = *next_slot {
            sleep_until(at).await;
        }
        let gap = self.gap();
        trace!(?gap, "Reserved next request slot");
        *next_slot = Some(Instant::now() + gap);
    }

    /// The wait before the following request, randomized to 0.5x..1.5x when enabled.
    fn gap(&self) -> Duration {
        if self.randomize {
            self.delay.mul_f64(rng().random_range(0.5..1.5))
        } else {
            self.delay
        }
    }
}

/// Fetcher that waits for a [`Throttle`] slot before every request.
///
/// Sits below [`super::retry::RetryFetch`], so retried attempts are paced
/// like first attempts.
#[derive(Debug)]
pub struct Throttled<T> {
    inner: T,
    throttle: Throttle,
}

impl<T> Throttled<T> {
    pub fn new(inner: T, throttle: Throttle) -> Self {
        Self { inner, throttle }
    }
}

impl<T> FetchAsync for Throttled<T>
where
    T: FetchAsync,
{
    async fn fetch(&self, url: &str) -> Result<Page, FetchError> {
        self.throttle.acquire().await;
        self.inner.fetch(url).await
    }
}

/// Hosts a crawl may visit.
#[derive(Debug, Clone, Default)]
pub struct AllowedDomains {
    domains: Vec<String>,
}

impl AllowedDomains {
    pub fn new<S: AsRef<str>>(domains: &[S]) -> Self {
        Self {
            domains: domains
                .iter()
                .map(|d| d.as_ref().trim().trim_start_matches('.').to_ascii_lowercase())
                .filter(|d| !d.is_empty())
                .collect(),
        }
    }

    /// True when the host equals an allowed domain or is a subdomain of one.
    /// An empty list allows everything.
    pub fn allows(&self, url: &Url) -> bool {
        if self.domains.is_empty() {
            return true;
        }
        let Some(host) = url.host_str() else {
            return false;
        };
        let host = host.to_ascii_lowercase();
        self.domains.iter().any(|domain| {
            host == *domain
                || host
                    .strip_suffix(domain.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }
}
