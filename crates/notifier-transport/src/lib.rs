//! Transport boundary for the notifier pipeline.
//!
//! A [`Transport`] performs one logical delivery of an encoded batch body.
//! The provided [`HttpTransport`] POSTs the body to a configured URL with:
//!
//! - a requests-per-second rate limit applied before every attempt
//! - a bounded retry budget with capped exponential backoff
//! - pluggable response classification and retry predicates
//!
//! Retries are transparent to the caller: the sender pool sees one call per
//! batch, success or a single classified error.

pub mod error;
pub mod http;
pub mod rate;

use async_trait::async_trait;

pub use error::{TransportError, TransportResult};
pub use http::{
    default_error_handler, default_retry_predicate, ErrorHandler, HttpTransport, RetryPredicate,
    TransportConfig,
};
pub use rate::RateLimiter;

/// One rate-limited, retried exchange with the remote endpoint.
///
/// Implementors receive the already-encoded wire body; they never see
/// individual messages. `sender_id` identifies the calling worker for log
/// attribution only.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver one batch body. A returned error is terminal for the batch.
    async fn send(&self, sender_id: usize, body: Vec<u8>) -> TransportResult<()>;
}
