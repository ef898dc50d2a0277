//! HTTP transport with rate limiting, retry, and response classification.

use crate::error::{TransportError, TransportResult};
use crate::rate::RateLimiter;
use crate::Transport;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Classifies a final response status into success or a typed error.
///
/// Check runs after the retry budget is exhausted or the status is not
/// retryable; the URL is provided for error attribution.
pub type ErrorHandler = Arc<dyn Fn(StatusCode, &Url) -> TransportResult<()> + Send + Sync>;

/// Decides whether a response status is worth another attempt.
pub type RetryPredicate = Arc<dyn Fn(StatusCode) -> bool + Send + Sync>;

/// Default classification: 2xx/3xx succeed, 404 is not-found, 400 is a
/// validation error, everything else is an internal error.
pub fn default_error_handler() -> ErrorHandler {
    Arc::new(|status, url| {
        if status.is_success() || status.is_redirection() {
            return Ok(());
        }

        match status {
            StatusCode::NOT_FOUND => Err(TransportError::NotFound(url.path().to_string())),
            StatusCode::BAD_REQUEST => Err(TransportError::Validation(url.path().to_string())),
            _ => Err(TransportError::Internal {
                status: status.as_u16(),
                path: url.path().to_string(),
            }),
        }
    })
}

/// Default retry predicate: retry on HTTP 500 only.
pub fn default_retry_predicate() -> RetryPredicate {
    Arc::new(|status| status == StatusCode::INTERNAL_SERVER_ERROR)
}

/// Transport configuration.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Target URL for batch delivery.
    pub url: Url,
    /// Per-attempt request timeout, also the rate-limiter wait deadline.
    pub http_timeout: Duration,
    /// Number of retries after the initial attempt.
    pub retry_count: u32,
    /// Initial backoff delay between attempts.
    pub retry_delay: Duration,
    /// Backoff delay cap.
    pub retry_max_delay: Duration,
    /// Outbound requests-per-second budget.
    pub requests_per_second: u32,
}

impl TransportConfig {
    /// Create a config for `url` with the default timing and retry budget.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            http_timeout: Duration::from_secs(10),
            retry_count: 3,
            retry_delay: Duration::from_millis(100),
            retry_max_delay: Duration::from_millis(300),
            requests_per_second: 1000,
        }
    }
}

/// Transport that POSTs batch bodies to a fixed URL.
///
/// Each logical send performs up to `1 + retry_count` attempts; every attempt
/// first waits for a rate-limiter slot bounded by `http_timeout`. The sender
/// pool sees a single result per batch.
pub struct HttpTransport {
    config: TransportConfig,
    client: Client,
    limiter: RateLimiter,
    error_handler: ErrorHandler,
    retry_predicate: RetryPredicate,
}

impl HttpTransport {
    /// Create a new HTTP transport.
    pub fn new(config: TransportConfig) -> TransportResult<Self> {
        let client = Client::builder().timeout(config.http_timeout).build()?;
        let limiter = RateLimiter::new(config.requests_per_second);

        Ok(Self {
            config,
            client,
            limiter,
            error_handler: default_error_handler(),
            retry_predicate: default_retry_predicate(),
        })
    }

    /// Replace the response classifier.
    pub fn with_error_handler(mut self, handler: ErrorHandler) -> Self {
        self.error_handler = handler;
        self
    }

    /// Replace the retry predicate.
    pub fn with_retry_predicate(mut self, predicate: RetryPredicate) -> Self {
        self.retry_predicate = predicate;
        self
    }

    /// Perform one HTTP attempt and report the response status.
    ///
    /// Network-level failures surface here and are not retried.
    async fn attempt(&self, body: &[u8]) -> TransportResult<StatusCode> {
        let response = self
            .client
            .post(self.config.url.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_vec())
            .send()
            .await?;

        Ok(response.status())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, sender_id: usize, body: Vec<u8>) -> TransportResult<()> {
        let max_attempts = self.config.retry_count.saturating_add(1);
        let mut delay = self.config.retry_delay;
        let mut attempt = 0;

        loop {
            attempt += 1;

            self.limiter.acquire(self.config.http_timeout).await?;
            let status = self.attempt(&body).await?;

            if attempt < max_attempts && (self.retry_predicate)(status) {
                warn!(
                    sender_id,
                    attempt,
                    status = status.as_u16(),
                    delay_ms = delay.as_millis() as u64,
                    "retryable status, backing off"
                );

                tokio::time::sleep(delay).await;
                delay = std::cmp::min(delay * 2, self.config.retry_max_delay);
                continue;
            }

            debug!(
                sender_id,
                attempt,
                status = status.as_u16(),
                "request finished"
            );

            return (self.error_handler)(status, &self.config.url);
        }
    }
}
