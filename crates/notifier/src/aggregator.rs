//! Aggregator: converts the inbound message stream into a batch stream.

use crate::batch::Batch;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Why a batch was flushed. Carried for observability only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushReason {
    /// The next message did not fit in the batch.
    Full,
    /// The flush interval elapsed.
    Timer,
    /// The inbound queue closed.
    Shutdown,
}

impl FlushReason {
    /// Stable name for log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            FlushReason::Full => "full",
            FlushReason::Timer => "timer",
            FlushReason::Shutdown => "shutdown",
        }
    }
}

/// Single-task batching loop.
///
/// Owns its [`Batch`] and the only sender of the outbound queue, so no
/// locking is needed. Reacts to two event sources: an arriving message and
/// the flush deadline. Dropping the outbound sender on exit is the handoff
/// that tells the sender pool the pipeline is draining.
pub struct Aggregator {
    input: mpsc::Receiver<String>,
    output: mpsc::Sender<Vec<String>>,
    flush_interval: Duration,
    batch: Batch,
}

impl Aggregator {
    /// Create an aggregator over the given queue endpoints.
    pub fn new(
        input: mpsc::Receiver<String>,
        output: mpsc::Sender<Vec<String>>,
        max_batch_size_bytes: usize,
        flush_interval: Duration,
    ) -> Self {
        Self {
            input,
            output,
            flush_interval,
            batch: Batch::new(max_batch_size_bytes),
        }
    }

    /// Run until the inbound queue is closed and drained.
    ///
    /// The flush deadline is recomputed from "now" at every flush, so a
    /// pending expiry never carries over into the next period.
    pub async fn run(mut self) {
        let mut flush_at = Instant::now() + self.flush_interval;

        loop {
            tokio::select! {
                maybe_msg = self.input.recv() => match maybe_msg {
                    Some(msg) => {
                        if let Err(msg) = self.batch.add(msg) {
                            self.flush(FlushReason::Full).await;
                            flush_at = Instant::now() + self.flush_interval;

                            if let Err(msg) = self.batch.add(msg) {
                                // Larger than the whole budget; retrying can
                                // never succeed.
                                warn!(
                                    message_len = msg.len(),
                                    max_batch_size_bytes = self.batch.max_size_bytes(),
                                    "message exceeds the batch budget, dropping it"
                                );
                            }
                        }
                    }
                    None => {
                        self.flush(FlushReason::Shutdown).await;
                        debug!("aggregator finished");
                        return;
                    }
                },
                _ = tokio::time::sleep_until(flush_at) => {
                    self.flush(FlushReason::Timer).await;
                    flush_at = Instant::now() + self.flush_interval;
                }
            }
        }
    }

    /// Drain the batch onto the outbound queue.
    ///
    /// A zero-size batch is discarded: empty batches are never emitted
    /// downstream. Blocks when the outbound queue is full, throttling the
    /// whole pipeline.
    async fn flush(&mut self, reason: FlushReason) {
        let (messages, size_bytes) = self.batch.flush();
        if size_bytes == 0 {
            return;
        }

        debug!(
            reason = reason.as_str(),
            batch_size_bytes = size_bytes,
            max_batch_size_bytes = self.batch.max_size_bytes(),
            flush_interval_ms = self.flush_interval.as_millis() as u64,
            messages = messages.len(),
            "flushing batch"
        );

        if self.output.send(messages).await.is_err() {
            warn!(
                reason = reason.as_str(),
                "outbound queue closed, dropping batch"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flush_reason_names() {
        assert_eq!(FlushReason::Full.as_str(), "full");
        assert_eq!(FlushReason::Timer.as_str(), "timer");
        assert_eq!(FlushReason::Shutdown.as_str(), "shutdown");
    }

    #[tokio::test]
    async fn overflow_flushes_then_readds() {
        let (input_tx, input_rx) = mpsc::channel(16);
        let (output_tx, mut output_rx) = mpsc::channel(16);

        let aggregator = Aggregator::new(input_rx, output_tx, 5, Duration::from_secs(60));
        let handle = tokio::spawn(aggregator.run());

        for _ in 0..5 {
            input_tx.send("1".to_string()).await.unwrap();
        }
        input_tx.send("2".to_string()).await.unwrap();

        // The sixth message triggers an overflow flush of the first five.
        let batch = output_rx.recv().await.unwrap();
        assert_eq!(batch, vec!["1", "1", "1", "1", "1"]);

        // The overflowing message lands in the next batch, seen on shutdown.
        drop(input_tx);
        let batch = output_rx.recv().await.unwrap();
        assert_eq!(batch, vec!["2"]);

        assert!(output_rx.recv().await.is_none());
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn shutdown_flush_preserves_order() {
        let (input_tx, input_rx) = mpsc::channel(32);
        let (output_tx, mut output_rx) = mpsc::channel(16);

        let aggregator = Aggregator::new(input_rx, output_tx, 1024, Duration::from_secs(60));
        let handle = tokio::spawn(aggregator.run());

        let messages: Vec<String> = (0..15).map(|i| format!("msg-{i}")).collect();
        for msg in &messages {
            input_tx.send(msg.clone()).await.unwrap();
        }
        drop(input_tx);

        let batch = output_rx.recv().await.unwrap();
        assert_eq!(batch, messages);

        // Outbound closes after the final flush.
        assert!(output_rx.recv().await.is_none());
        handle.await.unwrap();
    }
}
