//! Crawl scheduling: from a URL list to year matches.
//!
//! A crawl runs in two phases:
//!
//! 1. **Scheduling**: parse every URL, drop duplicates and offsite hosts
//! 2. **Fetching**: download pages concurrently through the fetcher stack
//!    (`RetryFetch<Throttled<HttpFetcher>>` in production), keep HTML
//!    responses, extract their fields and scan them for years
//!
//! Failed or skipped pages are logged and counted; they never abort the crawl.
//!
//! # Submodules
//!
//! - [`fetch`]: the [`FetchAsync`] seam and its `reqwest` implementation
//! - [`retry`]: exponential backoff decorator for any fetcher
//! - [`politeness`]: download delay and allowed domains

pub mod fetch;
pub mod politeness;
pub mod retry;

use crate::extract::extract_fields;
use crate::matcher::YearMatcher;
use crate::models::YearMatch;
use crate::utils::truncate_for_log;
use fetch::FetchAsync;
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use std::collections::HashSet;
use politeness::AllowedDomains;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// Counters for one crawl.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// URLs read from the input.
    pub listed: usize,
    /// URLs that could not be parsed.
    pub invalid: usize,
    /// Repeats of an earlier URL, either in the input or after redirects.
    pub duplicates: usize,
    /// URLs outside the allowed domains.
    pub offsite: usize,
    /// URLs actually requested.
    pub scheduled: usize,
    /// HTML pages extracted and scanned.
    pub parsed: usize,
    /// Responses skipped because they were not HTML.
    pub skipped_non_html: usize,
    /// Requests that failed after retries.
    pub failed: usize,
    /// Records emitted across all pages.
    pub records: usize,
}

/// Everything a crawl produced.
#[derive(Debug, Default)]
pub struct CrawlReport {
    /// Matches in input order, then field order, then position.
    pub records: Vec<YearMatch>,
    pub stats: CrawlStats,
}

enum PageOutcome {
    Parsed { url: String, records: Vec<YearMatch> },
    SkippedNonHtml,
    Failed,
}

/// Drives fetching and scanning for a URL list.
#[derive(Debug)]
pub struct Crawler<F> {
    fetcher: F,
    matcher: YearMatcher,
    allowed: AllowedDomains,
    concurrency: usize,
}

impl<F> Crawler<F>
where
    F: FetchAsync,
{
    pub fn new(
        fetcher: F,
        matcher: YearMatcher,
        allowed: AllowedDomains,
        concurrency: usize,
    ) -> Self {
        Self {
            fetcher,
            matcher,
            allowed,
            concurrency: concurrency.max(1),
        }
    }

    /// Crawl `urls` and collect every year match.
    #[instrument(level = "info", skip_all, fields(count = urls.len()))]
    pub async fn run(&self, urls: Vec<String>) -> CrawlReport {
        let mut stats = CrawlStats {
            listed: urls.len(),
            ..CrawlStats::default()
        };
        let scheduled = self.schedule(urls, &mut stats);
        stats.scheduled = scheduled.len();
        info!(
            scheduled = stats.scheduled,
            invalid = stats.invalid,
            duplicates = stats.duplicates,
            offsite = stats.offsite,
            "Scheduled requests"
        );

        let outcomes: Vec<PageOutcome> = stream::iter(scheduled)
            .map(|url| self.process(url))
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut records = Vec::new();
        let mut seen_final = HashSet::new();
        for outcome in outcomes {
            match outcome {
                PageOutcome::Parsed { url, .. } if seen_final.contains(&url) => {
                    info!(%url, "Dropped page already reached through another URL");
                    stats.duplicates += 1;
                }
                PageOutcome::Parsed { url, records: page_records } => {
                    stats.parsed += 1;
                    records.extend(page_records);
                    seen_final.insert(url);
                }
                PageOutcome::SkippedNonHtml => stats.skipped_non_html += 1,
                PageOutcome::Failed => stats.failed += 1,
            }
        }
        stats.records = records.len();

        info!(
            parsed = stats.parsed,
            skipped_non_html = stats.skipped_non_html,
            failed = stats.failed,
            records = stats.records,
            "Crawl finished"
        );
        CrawlReport { records, stats }
    }

    /// Parse, de-duplicate and domain-filter the input list, keeping order.
    fn schedule(&self, urls: Vec<String>, stats: &mut CrawlStats) -> Vec<Url> {
        let parsed: Vec<Url> = urls
            .into_iter()
            .filter_map(|raw| match Url::parse(&raw) {
                Ok(url) => Some(url),
                Err(e) => {
                    error!(url = %raw, error = %e, "Request failed for invalid URL");
                    stats.invalid += 1;
                    None
                }
            })
            .collect();

        let before = parsed.len();
        let unique: Vec<Url> = parsed.into_iter().unique().collect();
        stats.duplicates = before - unique.len();

        unique
            .into_iter()
            .filter(|url| {
                let allowed = self.allowed.allows(url);
                if !allowed {
                    info!(%url, "Filtered offsite request");
                    stats.offsite += 1;
                }
                allowed
            })
            .collect()
    }

    async fn process(&self, url: Url) -> PageOutcome {
        let page = match self.fetcher.fetch(url.as_str()).await {
            Ok(page) => page,
            Err(e) => {
                error!(%url, error = %e, "Request failed");
                return PageOutcome::Failed;
            }
        };

        if !page.is_html() {
            info!(url = %page.url, content_type = %page.content_type, "Skipped non-text response");
            debug!(preview = %truncate_for_log(&page.body, 120), "Skipped body");
            return PageOutcome::SkippedNonHtml;
        }

        let fields = extract_fields(&page.body);
        if fields.is_empty() {
            warn!(url = %page.url, "HTML page had no extractable fields");
        }
        let records = self.matcher.scan_page(&page.url, &fields);
        debug!(url = %page.url, records = records.len(), "Parsed page");
        PageOutcome::Parsed {
            url: page.url,
            records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fetch::{FetchError, HttpFetcher, Page};
    use super::politeness::{Throttle, Throttled};
    use super::retry::RetryFetch;
    use super::*;
    use reqwest::StatusCode;
    use std::cell::{Cell, RefCell};
    use std::time::Duration;
    use tokio::time::Instant;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const YEARS: [&str; 5] = ["2019", "2020", "2021", "2022", "2023"];

    const ARTICLE: &str = r#"<html><head>
<title>Snack trends 2022</title>
<meta property="og:description" content="What changed since 2019">
</head><body><article><p>In 2020 offices closed; by 2021 they reopened.</p></article></body></html>"#;

    fn crawler(allowed: &[&str]) -> Crawler<RetryFetch<HttpFetcher>> {
        let http = HttpFetcher::new("year_finder-test", Duration::from_secs(5)).unwrap();
        Crawler::new(
            RetryFetch::new(http, 1, Duration::from_millis(1)),
            YearMatcher::new(&YEARS).unwrap(),
            AllowedDomains::new(allowed),
            4,
        )
    }

    async fn mount_html(server: &MockServer, at: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path(at))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(body, "text/html; charset=utf-8"),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_html_page_yields_records_in_order() {
        let server = MockServer::start().await;
        mount_html(&server, "/trends", ARTICLE).await;

        let url = format!("{}/trends", server.uri());
        let report = crawler(&[]).run(vec![url.clone()]).await;

        let summary: Vec<_> = report
            .records
            .iter()
            .map(|r| (r.year.as_str(), r.text.split(':').next().unwrap_or("")))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("2022", "title"),
                ("2019", "og_description"),
                ("2020", "main_text"),
                ("2021", "main_text"),
            ]
        );
        assert!(report.records.iter().all(|r| r.url == url));
        assert!(report.records.iter().all(|r| YEARS.contains(&r.year.as_str())));
        assert_eq!(report.stats.parsed, 1);
        assert_eq!(report.stats.records, 4);
    }

    #[tokio::test]
    async fn test_non_html_response_produces_no_records() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/report.pdf"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<title>2020</title> 2021 2022", "application/pdf"),
            )
            .mount(&server)
            .await;

        let report = crawler(&[]).run(vec![format!("{}/report.pdf", server.uri())]).await;
        assert!(report.records.is_empty());
        assert_eq!(report.stats.skipped_non_html, 1);
        assert_eq!(report.stats.parsed, 0);
    }

    #[tokio::test]
    async fn test_failures_are_counted_and_do_not_abort() {
        let server = MockServer::start().await;
        mount_html(&server, "/ok", ARTICLE).await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(503))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let report = crawler(&[])
            .run(vec![
                format!("{}/flaky", server.uri()),
                format!("{}/missing", server.uri()),
                format!("{}/ok", server.uri()),
            ])
            .await;
        assert_eq!(report.stats.failed, 2);
        assert_eq!(report.stats.parsed, 1);
        assert_eq!(report.records.len(), 4);
    }

    #[tokio::test]
    async fn test_duplicates_invalid_and_offsite_are_not_fetched() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<title>2023</title>", "text/html"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}/page", server.uri());
        let report = crawler(&["127.0.0.1"])
            .run(vec![
                url.clone(),
                "not a url".to_string(),
                url.clone(),
                "https://snacknation.com/blog/".to_string(),
            ])
            .await;

        assert_eq!(
            report.stats,
            CrawlStats {
                listed: 4,
                invalid: 1,
                duplicates: 1,
                offsite: 1,
                scheduled: 1,
                parsed: 1,
                skipped_non_html: 0,
                failed: 0,
                records: 1,
            }
        );
        assert_eq!(report.records[0].text, "title: 2023");
    }

    #[tokio::test]
    async fn test_empty_input() {
        let report = crawler(&[]).run(Vec::new()).await;
        assert!(report.records.is_empty());
        assert_eq!(report.stats, CrawlStats::default());
    }

    /// Answers 503 on the first call and an HTML page afterwards, noting when each call started.
    #[derive(Default)]
    struct Recorder {
        starts: RefCell<Vec<Instant>>,
    }

    impl FetchAsync for &Recorder {
        async fn fetch(&self, url: &str) -> Result<Page, FetchError> {
            let mut starts = self.starts.borrow_mut();
            starts.push(Instant::now());
            if starts.len() == 1 {
                return Err(FetchError::Status {
                    status: StatusCode::SERVICE_UNAVAILABLE,
                    url: url.to_string(),
                });
            }
            Ok(Page {
                url: url.to_string(),
                content_type: "text/html".to_string(),
                body: "<title>2020</title>".to_string(),
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_wait_for_the_download_delay() {
        let recorder = Recorder::default();
        let crawler = Crawler::new(
            RetryFetch::new(
                Throttled::new(&recorder, Throttle::new(Duration::from_secs(1), false)),
                2,
                Duration::from_millis(1),
            ),
            YearMatcher::new(&YEARS).unwrap(),
            AllowedDomains::new::<&str>(&[]),
            1,
        );

        let report = crawler
            .run(vec![
                "https://snacknation.com/a".to_string(),
                "https://snacknation.com/b".to_string(),
            ])
            .await;
        assert_eq!(report.stats.records, 2);

        let starts = recorder.starts.borrow();
        assert_eq!(starts.len(), 3);
        for pair in starts.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_secs(1), "gap {:?}", pair[1] - pair[0]);
        }
    }

    /// Counts calls passing through to a real fetcher.
    struct Counted<T> {
        inner: T,
        calls: Cell<usize>,
    }

    impl<T: FetchAsync> FetchAsync for &Counted<T> {
        async fn fetch(&self, url: &str) -> Result<Page, FetchError> {
            self.calls.set(self.calls.get() + 1);
            self.inner.fetch(url).await
        }
    }

    #[tokio::test]
    async fn test_unreachable_host_is_retried_then_failed() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let counted = Counted {
            inner: HttpFetcher::new("year_finder-test", Duration::from_secs(5)).unwrap(),
            calls: Cell::new(0),
        };
        let crawler = Crawler::new(
            RetryFetch::new(&counted, 2, Duration::from_millis(1)),
            YearMatcher::new(&YEARS).unwrap(),
            AllowedDomains::new::<&str>(&[]),
            1,
        );

        let report = crawler.run(vec![format!("http://{addr}/")]).await;
        assert_eq!(report.stats.failed, 1);
        assert!(report.records.is_empty());
        assert_eq!(counted.calls.get(), 3);
    }

    #[tokio::test]
    async fn test_redirects_to_the_same_page_are_reported_once() {
        let server = MockServer::start().await;
        for from in ["/a", "/b"] {
            Mock::given(method("GET"))
                .and(path(from))
                .respond_with(
                    ResponseTemplate::new(302)
                        .insert_header("location", format!("{}/final", server.uri())),
                )
                .mount(&server)
                .await;
        }
        mount_html(&server, "/final", ARTICLE).await;

        let report = crawler(&[])
            .run(vec![
                format!("{}/a", server.uri()),
                format!("{}/b", server.uri()),
            ])
            .await;
        assert_eq!(report.stats.parsed, 1);
        assert_eq!(report.stats.duplicates, 1);
        assert_eq!(report.records.len(), 4);
        assert!(report.records.iter().all(|r| r.url.ends_with("/final")));
    }
}
