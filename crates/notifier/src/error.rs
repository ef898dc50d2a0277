//! Error types for the notifier pipeline.
//!
//! Per-batch failures (encoding, send) are terminal for that batch only:
//! they are logged by the sender and never surface here. These variants
//! cover construction and configuration failures.

use notifier_transport::TransportError;
use thiserror::Error;

/// Notifier error type.
#[derive(Error, Debug)]
pub enum NotifierError {
    /// Configuration error (invalid option combination).
    #[error("configuration error: {0}")]
    Config(String),

    /// The target URL could not be parsed.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Transport construction or delivery error.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Result type for notifier operations.
pub type NotifierResult<T> = Result<T, NotifierError>;
