//! Sender pool worker: dispatches one batch at a time via the transport.

use crate::encoder::BodyEncoder;
use notifier_transport::Transport;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error};

/// Outbound queue endpoint shared by the sender pool.
///
/// Each received batch is delivered to exactly one worker; relative order
/// across workers is not guaranteed.
pub type SharedBatchReceiver = Arc<Mutex<mpsc::Receiver<Vec<String>>>>;

/// One worker of the sender pool.
///
/// Stateless between iterations: encode the batch, hand it to the
/// transport, and on any failure log and drop it. Retry, if any, happens
/// inside the transport for a single logical call.
pub struct Sender {
    id: usize,
    input: SharedBatchReceiver,
    transport: Arc<dyn Transport>,
    encoder: BodyEncoder,
}

impl Sender {
    /// Create a worker draining the shared outbound queue.
    pub fn new(
        id: usize,
        input: SharedBatchReceiver,
        transport: Arc<dyn Transport>,
        encoder: BodyEncoder,
    ) -> Self {
        Self {
            id,
            input,
            transport,
            encoder,
        }
    }

    /// Run until the outbound queue is closed and drained.
    pub async fn run(self) {
        debug!(id = self.id, "sender started");

        loop {
            let maybe_batch = {
                let mut input = self.input.lock().await;
                input.recv().await
            };

            let Some(messages) = maybe_batch else {
                break;
            };

            let body = match (self.encoder)(&messages) {
                Ok(body) => body,
                Err(e) => {
                    error!(
                        id = self.id,
                        error = %e,
                        messages = messages.len(),
                        "failed to encode batch, dropping it"
                    );
                    continue;
                }
            };

            if let Err(e) = self.transport.send(self.id, body).await {
                error!(
                    id = self.id,
                    error = %e,
                    messages = messages.len(),
                    "failed to send batch, dropping it"
                );
            }
        }

        debug!(id = self.id, "sender finished");
    }
}
