//! Pipeline configuration.

use std::time::Duration;

/// Notifier configuration.
///
/// Every knob has a default; the target URL is passed separately to
/// [`crate::Notifier::new`] since it has no sensible default.
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    /// Capacity of the inbound message queue.
    pub input_queue_size: usize,
    /// Capacity of the outbound batch queue. Defaults to 10 x senders_count
    /// when unset.
    pub output_queue_size: Option<usize>,
    /// Byte budget of a single batch.
    pub max_batch_size_bytes: usize,
    /// Number of concurrent sender workers.
    pub senders_count: usize,
    /// How long to wait before flushing an incomplete batch.
    pub flush_interval: Duration,
    /// Per-attempt HTTP timeout.
    pub http_timeout: Duration,
    /// Number of retries after the initial HTTP attempt.
    pub retry_count: u32,
    /// Initial retry backoff delay.
    pub retry_delay: Duration,
    /// Retry backoff delay cap.
    pub retry_max_delay: Duration,
    /// Outbound requests-per-second budget.
    pub requests_per_second: u32,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            input_queue_size: 5000,
            output_queue_size: None,
            max_batch_size_bytes: 1024 * 1024, // 1 MiB
            senders_count: 10,
            flush_interval: Duration::from_secs(1),
            http_timeout: Duration::from_secs(10),
            retry_count: 3,
            retry_delay: Duration::from_millis(100),
            retry_max_delay: Duration::from_millis(300),
            requests_per_second: 1000,
        }
    }
}

impl NotifierConfig {
    /// The effective outbound queue capacity.
    pub fn resolved_output_queue_size(&self) -> usize {
        self.output_queue_size
            .unwrap_or(10 * self.senders_count)
            .max(1)
    }
}
