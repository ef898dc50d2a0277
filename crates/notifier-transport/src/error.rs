//! Error types for the transport boundary.

use std::time::Duration;
use thiserror::Error;

/// Transport error type.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Network-level HTTP failure (connection refused, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The rate limiter could not grant a slot within the request deadline.
    #[error("rate limiter wait of {0:?} exceeds the request deadline")]
    RateLimited(Duration),

    /// Remote endpoint or resource absent (HTTP 404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Client-side request rejected by the endpoint (HTTP 400).
    #[error("validation error: {0}")]
    Validation(String),

    /// Server-side failure or unclassified status code.
    #[error("internal error: status {status} from {path}")]
    Internal {
        /// The HTTP status code that triggered the error.
        status: u16,
        /// Path of the request, for log attribution.
        path: String,
    },
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;
