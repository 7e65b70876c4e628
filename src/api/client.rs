//! The paginated API client
//!
//! `fetch` issues a GET against the configured base URL, then follows
//! `rel = "next"` pagination links until none remain, concatenating every
//! page's records in arrival order. Two retry layers apply, independently:
//!
//! - the transport layer retries rate-limited statuses per [`RetryPolicy`];
//! - the page loop gives any other failed page exactly one more request
//!   after a fixed recovery sleep, then fails with the response body intact.

use std::io::{self, Write};
use std::time::Duration;

use serde_json::{Map, Value};
use tokio::time::sleep;

use super::envelope::PageEnvelope;
use super::retry::RetryPolicy;
use super::ApiError;
use crate::config;

/// One opaque record from a `data` array
pub type Record = Map<String, Value>;

/// Delay after each successful page request, to stay under the API's
/// informal rate limit
const DEFAULT_PAGE_DELAY: Duration = Duration::from_millis(100);

/// Sleep before the page loop's single re-request of a failed page
const DEFAULT_RECOVERY_DELAY: Duration = Duration::from_secs(25);

/// Client for the speedrun.com REST API
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
    page_delay: Duration,
    recovery_delay: Duration,
    progress: bool,
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiClient {
    /// Creates a client against the production speedrun.com API
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config::SRC_API_URL.to_string(),
            retry: RetryPolicy::default(),
            page_delay: DEFAULT_PAGE_DELAY,
            recovery_delay: DEFAULT_RECOVERY_DELAY,
            progress: false,
        }
    }

    /// Points the client at a different base URL (used by tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Replaces the transport retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Sets the delay inserted after each successful page request
    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    /// Sets the sleep before the page loop's single recovery re-request
    pub fn with_recovery_delay(mut self, delay: Duration) -> Self {
        self.recovery_delay = delay;
        self
    }

    /// Enables the interactive record counter on stdout
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Fetches every record for a collection endpoint, across all pages
    ///
    /// `endpoint` and `query_args` are literal: any `{game_id}`-style
    /// placeholder must be substituted by the caller first. Pagination links
    /// are followed verbatim with no extra query arguments. Record order is
    /// page arrival order, then intra-page order; nothing is deduplicated,
    /// reordered, or dropped.
    pub async fn fetch(
        &self,
        endpoint: &str,
        query_args: &[(&str, &str)],
    ) -> Result<Vec<Record>, ApiError> {
        let mut url = self.url_for(endpoint, query_args);
        let mut records: Vec<Record> = Vec::new();

        loop {
            let envelope = self.fetch_page(&url).await?;
            let next = envelope.next_uri().map(str::to_owned);

            let page = envelope
                .into_records()
                .map_err(|reason| ApiError::Malformed {
                    url: url.clone(),
                    reason,
                })?;
            records.extend(page);

            if self.progress {
                print!("\rGot {} results", records.len());
                io::stdout().flush().ok();
            }

            match next {
                Some(next_url) => {
                    url = next_url;
                    sleep(self.page_delay).await;
                }
                None => break,
            }
        }

        if self.progress {
            println!();
        }

        Ok(records)
    }

    /// Fetches a single-entity endpoint whose `data` is one record object
    ///
    /// Same retry and recovery behavior as [`fetch`](Self::fetch); no
    /// pagination is expected or followed.
    pub async fn fetch_one(&self, endpoint: &str) -> Result<Record, ApiError> {
        let url = self.url_for(endpoint, &[]);
        let envelope = self.fetch_page(&url).await?;
        envelope.into_record().map_err(|reason| ApiError::Malformed {
            url: url.clone(),
            reason,
        })
    }

    /// Fetches and decodes one page, applying the page-loop recovery policy
    ///
    /// A non-2xx status that the transport layer would not retry gets one
    /// more request of the same URL after `recovery_delay`; this covers the
    /// first page the same as any later one. Decode failures are never
    /// retried.
    async fn fetch_page(&self, url: &str) -> Result<PageEnvelope, ApiError> {
        let body = match self.get_with_retry(url).await {
            Ok(body) => body,
            Err(ApiError::Http { status, .. }) => {
                tracing::warn!(url, status, "page request failed, retrying once");
                sleep(self.recovery_delay).await;
                self.get_with_retry(url).await?
            }
            Err(other) => return Err(other),
        };

        serde_json::from_str(&body).map_err(|e| ApiError::Malformed {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    /// Issues one GET, retrying retryable statuses with exponential backoff
    ///
    /// Returns the response body on any 2xx. Other statuses surface as
    /// [`ApiError::Http`] once the attempt ceiling is reached or the status
    /// is not retryable.
    async fn get_with_retry(&self, url: &str) -> Result<String, ApiError> {
        let mut attempt = 1;
        loop {
            tracing::debug!(url, attempt, "GET");
            let response = self.http.get(url).send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;

            if (200..300).contains(&status) {
                return Ok(body);
            }

            if self.retry.is_retryable(status) && attempt < self.retry.max_attempts {
                let delay = self.retry.delay_for(attempt);
                tracing::warn!(url, status, attempt, ?delay, "rate limited, backing off");
                sleep(delay).await;
                attempt += 1;
                continue;
            }

            return Err(ApiError::Http {
                url: url.to_string(),
                status,
                body,
            });
        }
    }

    /// Builds the initial request URL for an endpoint and its query arguments
    fn url_for(&self, endpoint: &str, query_args: &[(&str, &str)]) -> String {
        let mut url = format!("{}/{}", self.base_url, endpoint);
        if !query_args.is_empty() {
            let args = query_args
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("&");
            url.push('?');
            url.push_str(&args);
        }
        url
    }
}
