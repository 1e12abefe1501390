//! News search API client with exponential backoff retry logic.
//!
//! This module talks to a NewsAPI-compatible HTTP service. It fetches articles
//! for a query (`/everything`) and the catalogue of source identifiers
//! (`/sources`), retrying transient failures with exponential backoff and
//! jitter.
//!
//! # Architecture
//!
//! The module uses a trait-based design so the transport can be swapped out:
//! - [`FetchAsync`]: Core trait performing one GET against an endpoint
//! - [`HttpFetcher`]: `reqwest`-backed implementation
//! - [`RetryFetch`]: Decorator that adds retry logic to any `FetchAsync` implementation
//! - [`NewsClient`]: Typed endpoints on top of a `FetchAsync`
//!
//! # Retry Strategy
//!
//! - Only transport errors, `429` and `5xx` responses are retried
//! - Exponential backoff starting at the configured base delay
//! - Maximum delay capped at 30 seconds
//! - Random jitter (0-250ms) added to prevent thundering herd

use crate::models::{ApiErrorBody, EverythingResponse, SourcesResponse};
use chrono::NaiveDate;
use itertools::Itertools;
use rand::{Rng, rng};
use reqwest::header::HeaderValue;
use std::fmt;
use std::time::{Duration as StdDuration, Instant};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// Largest page the upstream will return for one request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Errors returned by the news API client.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("request failed: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The body was not the JSON we expected.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The endpoint URL could not be built.
    #[error("invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("API key contains characters not allowed in a header")]
    InvalidApiKey,
}

impl ApiError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Transport(_) => true,
            ApiError::Status { status, .. } => *status == 429 || *status >= 500,
            ApiError::Decode(_) | ApiError::Url(_) | ApiError::InvalidApiKey => false,
        }
    }

    /// Build a status error, preferring the upstream's own message when the
    /// body carries one.
    fn from_status(status: u16, body: &str) -> Self {
        let message = match serde_json::from_str::<ApiErrorBody>(body) {
            Ok(ApiErrorBody {
                code: Some(code),
                message: Some(message),
                ..
            }) => format!("{code} - {message}"),
            Ok(ApiErrorBody {
                message: Some(message),
                ..
            }) => message,
            _ => body.trim().to_string(),
        };
        ApiError::Status { status, message }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        // request URLs carry the query string; keep them out of logs
        ApiError::Transport(err.without_url().to_string())
    }
}

/// Trait for one async GET against the news API.
///
/// Implementors receive an endpoint name relative to the API base (for
/// example `"everything"`) and the query parameters, and return the raw
/// response body of a successful request.
pub trait FetchAsync {
    async fn fetch(&self, endpoint: &str, params: &[(String, String)]) -> Result<String, ApiError>;
}

/// Wrapper that adds exponential backoff retry logic to any [`FetchAsync`] implementation.
///
/// # Backoff Strategy
///
/// The delay between retries follows this formula:
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryFetch<T> {
    /// The underlying transport to wrap.
    inner: T,
    /// Maximum number of retry attempts before giving up.
    max_retries: usize,
    /// Initial delay between retries (doubles with each attempt).
    base_delay: StdDuration,
    /// Maximum delay cap to prevent excessive waiting.
    max_delay: StdDuration,
}

impl<T> RetryFetch<T>
where
    T: FetchAsync,
{
    /// Create a new retry wrapper around an existing [`FetchAsync`] implementation.
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
        }
    }

    fn backoff(&self, attempt: usize) -> StdDuration {
        let shift = (attempt - 1).min(16) as u32;
        let delay = self.base_delay.saturating_mul(1 << shift).min(self.max_delay);
        let jitter_ms: u64 = rng().random_range(0..=250);
        delay + StdDuration::from_millis(jitter_ms)
    }
}

impl<T> fmt::Debug for RetryFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> FetchAsync for RetryFetch<T>
where
    T: FetchAsync,
{
    #[instrument(level = "info", skip_all, fields(%endpoint))]
    async fn fetch(&self, endpoint: &str, params: &[(String, String)]) -> Result<String, ApiError> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            match self.inner.fetch(endpoint, params).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    attempt += 1;
                    let attempt_dt = attempt_t0.elapsed();
                    let total_dt = total_t0.elapsed();

                    if !e.is_transient() {
                        error!(attempt, error = %e, "fetch() failed with a permanent error");
                        return Err(e);
                    }
                    if attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_attempt = attempt_dt.as_millis(),
                            elapsed_ms_total = total_dt.as_millis(),
                            error = %e,
                            "fetch() exhausted retries"
                        );
                        return Err(e);
                    }

                    let delay = self.backoff(attempt);
                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_attempt = attempt_dt.as_millis(),
                        elapsed_ms_total = total_dt.as_millis(),
                        ?delay,
                        error = %e,
                        "fetch() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

/// Header carrying the API key on every request.
const API_KEY_HEADER: &str = "X-Api-Key";

/// `reqwest`-backed transport. The API key travels in the [`API_KEY_HEADER`]
/// header, never in the URL, and is marked sensitive.
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: Url,
    api_key: HeaderValue,
}

impl HttpFetcher {
    pub fn new(base_url: &str, api_key: String, timeout: StdDuration) -> Result<Self, ApiError> {
        let mut api_key = HeaderValue::from_str(&api_key).map_err(|_| ApiError::InvalidApiKey)?;
        api_key.set_sensitive(true);

        // a trailing slash keeps Url::join from dropping the last path segment
        let base_url = if base_url.ends_with('/') {
            Url::parse(base_url)?
        } else {
            Url::parse(&format!("{base_url}/"))?
        };
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    fn endpoint_url(&self, endpoint: &str, params: &[(String, String)]) -> Result<Url, ApiError> {
        let mut url = self.base_url.join(endpoint)?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        Ok(url)
    }

    fn request(&self, endpoint: &str, params: &[(String, String)]) -> Result<reqwest::Request, ApiError> {
        let url = self.endpoint_url(endpoint, params)?;
        Ok(self
            .client
            .get(url)
            .header(API_KEY_HEADER, self.api_key.clone())
            .build()?)
    }
}

impl fmt::Debug for HttpFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpFetcher")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl FetchAsync for HttpFetcher {
    #[instrument(level = "debug", skip_all, fields(%endpoint))]
    async fn fetch(&self, endpoint: &str, params: &[(String, String)]) -> Result<String, ApiError> {
        let request = self.request(endpoint, params)?;
        let t0 = Instant::now();
        let response = self.client.execute(request).await?;
        let status = response.status();
        let body = response.text().await?;
        let dt = t0.elapsed();

        if status.is_success() {
            debug!(status = status.as_u16(), bytes = body.len(), elapsed_ms = dt.as_millis(), "GET ok");
            Ok(body)
        } else {
            warn!(status = status.as_u16(), elapsed_ms = dt.as_millis(), "GET returned error status");
            Err(ApiError::from_status(status.as_u16(), &body))
        }
    }
}

/// Search parameters for the `everything` endpoint.
#[derive(Debug, Clone, Default)]
pub struct NewsQuery {
    /// Free-text query.
    pub query: String,
    /// Earliest publication date, inclusive.
    pub from: Option<NaiveDate>,
    /// Latest publication date, inclusive.
    pub to: Option<NaiveDate>,
    /// Restrict to these source ids; empty means all sources.
    pub sources: Vec<String>,
    /// Results per page, clamped to `1..=MAX_PAGE_SIZE`.
    pub page_size: Option<u32>,
}

impl NewsQuery {
    /// Query string parameters, excluding the API key.
    pub fn params(&self) -> Vec<(String, String)> {
        let mut params = vec![("q".to_string(), self.query.clone())];
        if let Some(from) = self.from {
            params.push(("from".to_string(), from.format("%Y-%m-%d").to_string()));
        }
        if let Some(to) = self.to {
            params.push(("to".to_string(), to.format("%Y-%m-%d").to_string()));
        }
        if !self.sources.is_empty() {
            params.push(("sources".to_string(), self.sources.iter().join(",")));
        }
        if let Some(size) = self.page_size {
            params.push(("pageSize".to_string(), size.clamp(1, MAX_PAGE_SIZE).to_string()));
        }
        params
    }
}

/// Typed access to the news API endpoints.
#[derive(Debug)]
pub struct NewsClient<F> {
    fetcher: F,
}

impl NewsClient<RetryFetch<HttpFetcher>> {
    /// Build the production client: HTTP transport wrapped in retries.
    pub fn http(
        base_url: &str,
        api_key: String,
        timeout: StdDuration,
        max_retries: usize,
    ) -> Result<Self, ApiError> {
        let http = HttpFetcher::new(base_url, api_key, timeout)?;
        Ok(Self::new(RetryFetch::new(http, max_retries, StdDuration::from_secs(1))))
    }
}

impl<F> NewsClient<F>
where
    F: FetchAsync,
{
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// Search for articles matching `query`.
    #[instrument(level = "info", skip_all, fields(query = %query.query))]
    pub async fn everything(&self, query: &NewsQuery) -> Result<EverythingResponse, ApiError> {
        let t0 = Instant::now();
        let body = self.fetcher.fetch("everything", &query.params()).await?;
        let response: EverythingResponse = serde_json::from_str(&body)?;
        check_status(&response.status, &body)?;

        info!(
            total_results = response.total_results,
            returned = response.articles.len(),
            elapsed_ms_total = t0.elapsed().as_millis(),
            "Fetched articles"
        );
        Ok(response)
    }

    /// List the ids of every source the API knows about.
    #[instrument(level = "info", skip_all)]
    pub async fn source_ids(&self) -> Result<Vec<String>, ApiError> {
        let body = self.fetcher.fetch("sources", &[]).await?;
        let response: SourcesResponse = serde_json::from_str(&body)?;
        check_status(&response.status, &body)?;

        let ids: Vec<String> = response.sources.into_iter().map(|s| s.id).collect();
        info!(count = ids.len(), "Fetched source catalogue");
        Ok(ids)
    }
}

/// A 200 response can still carry `"status": "error"`.
fn check_status(status: &str, body: &str) -> Result<(), ApiError> {
    if status == "error" {
        return Err(ApiError::from_status(200, body));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned results and records what was requested.
    struct FakeFetcher {
        replies: Mutex<VecDeque<Result<String, ApiError>>>,
        calls: Mutex<Vec<(String, Vec<(String, String)>)>>,
    }

    impl FakeFetcher {
        fn new(replies: Vec<Result<String, ApiError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl FetchAsync for &FakeFetcher {
        async fn fetch(
            &self,
            endpoint: &str,
            params: &[(String, String)],
        ) -> Result<String, ApiError> {
            self.calls
                .lock()
                .unwrap()
                .push((endpoint.to_string(), params.to_vec()));
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ApiError::Transport("no more replies".into())))
        }
    }

    fn status(code: u16) -> ApiError {
        ApiError::Status {
            status: code,
            message: "boom".into(),
        }
    }

    #[test]
    fn test_query_params_minimal() {
        let q = NewsQuery {
            query: "electric cars".into(),
            ..Default::default()
        };
        assert_eq!(q.params(), vec![("q".to_string(), "electric cars".to_string())]);
    }

    #[test]
    fn test_query_params_full() {
        let q = NewsQuery {
            query: "bitcoin".into(),
            from: NaiveDate::from_ymd_opt(2025, 5, 1),
            to: NaiveDate::from_ymd_opt(2025, 5, 6),
            sources: vec!["bbc-news".into(), "reuters".into()],
            page_size: Some(500),
        };
        let params = q.params();
        assert!(params.contains(&("from".into(), "2025-05-01".into())));
        assert!(params.contains(&("to".into(), "2025-05-06".into())));
        assert!(params.contains(&("sources".into(), "bbc-news,reuters".into())));
        assert!(params.contains(&("pageSize".into(), "100".into())));
    }

    #[test]
    fn test_request_sends_key_in_header_only() {
        let fetcher =
            HttpFetcher::new("https://newsapi.org/v2", "secret".into(), StdDuration::from_secs(5))
                .unwrap();
        let request = fetcher
            .request("everything", &[("q".into(), "rust lang".into())])
            .unwrap();
        assert_eq!(request.url().path(), "/v2/everything");
        let pairs: Vec<(String, String)> = request.url().query_pairs().into_owned().collect();
        assert_eq!(pairs, vec![("q".to_string(), "rust lang".to_string())]);
        assert!(!request.url().as_str().contains("secret"));

        let key = request.headers().get(API_KEY_HEADER).unwrap();
        assert_eq!(key.to_str().unwrap(), "secret");
        assert!(key.is_sensitive());
    }

    #[test]
    fn test_sources_request_has_no_query_string() {
        let fetcher =
            HttpFetcher::new("https://newsapi.org/v2/", "secret".into(), StdDuration::from_secs(5))
                .unwrap();
        let request = fetcher.request("sources", &[]).unwrap();
        assert_eq!(request.url().as_str(), "https://newsapi.org/v2/sources");
    }

    #[test]
    fn test_api_key_must_be_header_safe() {
        let err = HttpFetcher::new("https://newsapi.org/v2", "bad\nkey".into(), StdDuration::from_secs(5))
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidApiKey));
    }

    #[tokio::test]
    async fn test_transport_error_does_not_leak_key() {
        // nothing listens on port 1
        let fetcher = HttpFetcher::new(
            "http://127.0.0.1:1/v2",
            "SUPERSECRETKEY".into(),
            StdDuration::from_secs(5),
        )
        .unwrap();
        let err = fetcher
            .fetch("everything", &[("q".into(), "x".into())])
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        assert!(!err.to_string().contains("SUPERSECRETKEY"), "{err}");
        assert!(!format!("{err:?}").contains("SUPERSECRETKEY"));
    }

    #[test]
    fn test_http_fetcher_debug_redacts_key() {
        let fetcher =
            HttpFetcher::new("https://newsapi.org/v2/", "secret".into(), StdDuration::from_secs(5))
                .unwrap();
        let printed = format!("{fetcher:?}");
        assert!(!printed.contains("secret"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_transient_classification() {
        assert!(ApiError::Transport("reset".into()).is_transient());
        assert!(status(429).is_transient());
        assert!(status(503).is_transient());
        assert!(!status(401).is_transient());
        assert!(!status(426).is_transient());
    }

    #[test]
    fn test_status_error_uses_upstream_message() {
        let body = r#"{"status":"error","code":"apiKeyInvalid","message":"Your API key is invalid."}"#;
        match ApiError::from_status(401, body) {
            ApiError::Status { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "apiKeyInvalid - Your API key is invalid.");
            }
            other => panic!("unexpected error: {other}"),
        }

        match ApiError::from_status(502, "Bad Gateway\n") {
            ApiError::Status { message, .. } => assert_eq!(message, "Bad Gateway"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_everything_decodes_response() {
        let body = r#"{"status":"ok","totalResults":2,"articles":[
            {"title":"A","description":"good news"},
            {"title":"B","description":null}
        ]}"#;
        let fake = FakeFetcher::new(vec![Ok(body.to_string())]);
        let client = NewsClient::new(&fake);

        let q = NewsQuery {
            query: "anything".into(),
            ..Default::default()
        };
        let response = client.everything(&q).await.unwrap();
        assert_eq!(response.total_results, 2);
        assert_eq!(response.articles.len(), 2);

        let calls = fake.calls.lock().unwrap();
        assert_eq!(calls[0].0, "everything");
        assert_eq!(calls[0].1, vec![("q".to_string(), "anything".to_string())]);
    }

    #[tokio::test]
    async fn test_everything_error_status_in_body() {
        let body = r#"{"status":"error","code":"rateLimited","message":"Too many requests"}"#;
        let fake = FakeFetcher::new(vec![Ok(body.to_string())]);
        let client = NewsClient::new(&fake);

        let err = client.everything(&NewsQuery::default()).await.unwrap_err();
        assert!(err.to_string().contains("rateLimited"));
    }

    #[tokio::test]
    async fn test_source_ids() {
        let body = r#"{"status":"ok","sources":[{"id":"abc-news","name":"ABC"},{"id":"bbc-news","name":"BBC"}]}"#;
        let fake = FakeFetcher::new(vec![Ok(body.to_string())]);
        let client = NewsClient::new(&fake);

        assert_eq!(client.source_ids().await.unwrap(), vec!["abc-news", "bbc-news"]);
        assert_eq!(fake.calls.lock().unwrap()[0].0, "sources");
    }

    #[tokio::test]
    async fn test_garbage_body_is_decode_error() {
        let fake = FakeFetcher::new(vec![Ok("<html>".to_string())]);
        let client = NewsClient::new(&fake);
        assert!(matches!(client.source_ids().await, Err(ApiError::Decode(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_recovers_from_transient_errors() {
        let fake = FakeFetcher::new(vec![
            Err(status(503)),
            Err(ApiError::Transport("reset".into())),
            Ok("{}".to_string()),
        ]);
        let retry = RetryFetch::new(&fake, 5, StdDuration::from_millis(10));

        assert_eq!(retry.fetch("sources", &[]).await.unwrap(), "{}");
        assert_eq!(fake.call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_gives_up_after_max_retries() {
        let fake = FakeFetcher::new(vec![Err(status(500)), Err(status(500)), Err(status(500))]);
        let retry = RetryFetch::new(&fake, 2, StdDuration::from_millis(10));

        let err = retry.fetch("sources", &[]).await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 500, .. }));
        assert_eq!(fake.call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_does_not_retry_permanent_errors() {
        let fake = FakeFetcher::new(vec![Err(status(401)), Ok("{}".to_string())]);
        let retry = RetryFetch::new(&fake, 5, StdDuration::from_millis(10));

        assert!(retry.fetch("sources", &[]).await.is_err());
        assert_eq!(fake.call_count(), 1);
    }

    #[test]
    fn test_backoff_is_capped() {
        let fake = FakeFetcher::new(vec![]);
        let retry = RetryFetch::new(&fake, 10, StdDuration::from_secs(1));
        assert!(retry.backoff(1) >= StdDuration::from_secs(1));
        assert!(retry.backoff(1) <= StdDuration::from_millis(1250));
        assert!(retry.backoff(10) <= StdDuration::from_millis(30_250));
    }
}
