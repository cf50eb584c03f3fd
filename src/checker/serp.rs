// src/checker/serp.rs
// =============================================================================
// The real StatusChecker: asks the search engine itself.
//
// How it works:
// - Build the site: query URL for the tracked URL (same derivation the
//   records carry)
// - Fetch the results page with a shared reqwest client
// - Classify the page: an organic result anchor pointing at the queried
//   site means Indexed, anything else means NotIndexed
//
// Politeness:
// - One request at a time (the manager's sweep already guarantees this)
// - An optional fixed delay before each request
// - A per-request timeout so a dead engine can't hang a check forever
//
// Rust concepts:
// - async/await: For network I/O
// - Result<T, E>: Transport and HTTP failures are Err; the manager decides
//   what a failed check means for the record
// =============================================================================

use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};

use crate::manager::{query_url_for, IndexStatus};

use super::StatusChecker;

// Search engines serve an interstitial or an error to clients with no
// browser-ish user agent, so we send one.
const USER_AGENT: &str = "Mozilla/5.0 (compatible; index-scout/0.1)";

// The engine's empty-result marker. If this shows up on the page there is
// no point scanning anchors.
const NO_RESULTS_MARKER: &str = "did not match any documents";

// Checks index status by fetching the site: query results page
pub struct SerpChecker {
    client: Client,
    delay: Duration,
}

impl SerpChecker {
    /// Creates a checker with the given per-request timeout and a fixed
    /// politeness delay applied before every request
    pub fn new(timeout: Duration, delay: Duration) -> Result<Self> {
        // One client for all requests (connection pooling)
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(SerpChecker { client, delay })
    }
}

#[async_trait]
impl StatusChecker for SerpChecker {
    async fn check(&self, url: &str) -> Result<IndexStatus> {
        // Polite spacing between requests
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let query_url = query_url_for(url);
        log::debug!("fetching {}", query_url);

        let response = self.client.get(&query_url).send().await?;

        let status_code = response.status();
        if !status_code.is_success() {
            // 429 in particular means we're being rate-limited; surface it
            // as an error and let the manager apply its fallback
            return Err(anyhow!("search engine returned HTTP {}", status_code));
        }

        let html = response.text().await?;
        Ok(classify_results_page(&html, url))
    }
}

// Classifies a results page for a given tracked URL
//
// A page is Indexed when at least one absolute result anchor points into the
// queried site. Relative anchors (navigation, pagination, the query echo)
// never count, which is what keeps the engine's own chrome from producing
// false positives.
fn classify_results_page(html: &str, url: &str) -> IndexStatus {
    if html.contains(NO_RESULTS_MARKER) {
        return IndexStatus::NotIndexed;
    }

    let document = Html::parse_document(html);
    let selector = Selector::parse("a[href]").expect("static selector");

    let target = host_and_path(url);

    for element in document.select(&selector) {
        if let Some(href) = element.value().attr("href") {
            let anchor = host_and_path(href);
            // Relative anchors come back unchanged from host_and_path; those
            // are the engine's own chrome, not results
            if anchor == href {
                continue;
            }
            if anchor.starts_with(target) {
                return IndexStatus::Indexed;
            }
        }
    }

    IndexStatus::NotIndexed
}

// Strips the scheme and any trailing slash, for scheme-insensitive
// comparison between a tracked URL and a result anchor
//
// Returns the input unchanged when there is no http(s) scheme to strip,
// which is how classify_results_page tells absolute anchors from relative
// ones.
fn host_and_path(url: &str) -> &str {
    let stripped = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));

    match stripped {
        Some(rest) => rest.trim_end_matches('/'),
        None => url,
    }
}
