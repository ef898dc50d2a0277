//! Notifier: the pipeline facade and lifecycle coordinator.

use crate::aggregator::Aggregator;
use crate::config::NotifierConfig;
use crate::encoder::{default_encoder, BodyEncoder};
use crate::error::{NotifierError, NotifierResult};
use crate::sender::Sender;
use notifier_transport::{HttpTransport, Transport, TransportConfig};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;
use url::Url;

/// The pipeline facade.
///
/// Owns the bounded inbound queue, one aggregator, and a pool of sender
/// workers sharing the aggregator's output.
///
/// # Lifecycle
///
/// 1. Construct with [`Notifier::new`] (or [`Notifier::with_transport`] to
///    inject a custom transport/encoder).
/// 2. [`start`](Self::start) spawns the aggregator and the sender pool.
/// 3. Submit with [`notify`](Self::notify) /
///    [`notify_and_forget`](Self::notify_and_forget).
/// 4. [`stop`](Self::stop) closes the inbound queue and waits for every
///    worker to drain and exit.
///
/// # Thread Safety
///
/// All methods take `&self`; the notifier can be shared across tasks.
/// Submissions racing with `stop` fail fast rather than blocking forever.
pub struct Notifier {
    config: NotifierConfig,
    transport: Arc<dyn Transport>,
    encoder: BodyEncoder,
    /// Inbound queue writer. Taking it out is the one-time close; `None`
    /// means the pipeline is stopping and submissions must fail fast.
    input_tx: Mutex<Option<mpsc::Sender<String>>>,
    /// Inbound queue reader, consumed exactly once by `start`.
    input_rx: Mutex<Option<mpsc::Receiver<String>>>,
    /// Handles of the spawned aggregator and sender tasks.
    workers: Mutex<Option<Vec<JoinHandle<()>>>>,
}

impl Notifier {
    /// Create a notifier delivering to `url` over HTTP.
    pub fn new(url: &str, config: NotifierConfig) -> NotifierResult<Self> {
        let url = Url::parse(url)?;

        let transport = HttpTransport::new(TransportConfig {
            url,
            http_timeout: config.http_timeout,
            retry_count: config.retry_count,
            retry_delay: config.retry_delay,
            retry_max_delay: config.retry_max_delay,
            requests_per_second: config.requests_per_second,
        })?;

        Self::with_transport(Arc::new(transport), default_encoder(), config)
    }

    /// Create a notifier with an injected transport and body encoder.
    pub fn with_transport(
        transport: Arc<dyn Transport>,
        encoder: BodyEncoder,
        config: NotifierConfig,
    ) -> NotifierResult<Self> {
        if config.senders_count == 0 {
            return Err(NotifierError::Config(
                "senders_count must be > 0".to_string(),
            ));
        }
        if config.max_batch_size_bytes == 0 {
            return Err(NotifierError::Config(
                "max_batch_size_bytes must be > 0".to_string(),
            ));
        }
        if config.input_queue_size == 0 {
            return Err(NotifierError::Config(
                "input_queue_size must be > 0".to_string(),
            ));
        }

        let (input_tx, input_rx) = mpsc::channel(config.input_queue_size);

        Ok(Self {
            config,
            transport,
            encoder,
            input_tx: Mutex::new(Some(input_tx)),
            input_rx: Mutex::new(Some(input_rx)),
            workers: Mutex::new(None),
        })
    }

    /// Spawn the aggregator task and the sender pool.
    ///
    /// # Panics
    ///
    /// Panics if called more than once.
    pub fn start(&self) {
        let input_rx = self
            .input_rx
            .lock()
            .expect("lock poisoned")
            .take()
            .expect("Notifier already started");

        let (batch_tx, batch_rx) =
            mpsc::channel(self.config.resolved_output_queue_size());

        let aggregator = Aggregator::new(
            input_rx,
            batch_tx,
            self.config.max_batch_size_bytes,
            self.config.flush_interval,
        );

        let mut workers = Vec::with_capacity(self.config.senders_count + 1);
        workers.push(tokio::spawn(aggregator.run()));

        let shared_rx = Arc::new(tokio::sync::Mutex::new(batch_rx));
        for id in 0..self.config.senders_count {
            let sender = Sender::new(
                id,
                shared_rx.clone(),
                self.transport.clone(),
                self.encoder.clone(),
            );
            workers.push(tokio::spawn(sender.run()));
        }

        *self.workers.lock().expect("lock poisoned") = Some(workers);

        info!(
            senders = self.config.senders_count,
            input_queue_size = self.config.input_queue_size,
            output_queue_size = self.config.resolved_output_queue_size(),
            max_batch_size_bytes = self.config.max_batch_size_bytes,
            flush_interval_ms = self.config.flush_interval.as_millis() as u64,
            "notifier started"
        );
    }

    /// Submit a message, blocking while the inbound queue is full.
    ///
    /// Returns false once `stop` has begun or the queue has closed.
    pub async fn notify(&self, message: impl Into<String>) -> bool {
        let input_tx = {
            let guard = self.input_tx.lock().expect("lock poisoned");
            match guard.as_ref() {
                Some(tx) => tx.clone(),
                None => return false,
            }
        };

        input_tx.send(message.into()).await.is_ok()
    }

    /// Submit a message without ever blocking.
    ///
    /// Returns false immediately when the inbound queue is full or closed;
    /// the message is dropped.
    pub fn notify_and_forget(&self, message: impl Into<String>) -> bool {
        let guard = self.input_tx.lock().expect("lock poisoned");
        match guard.as_ref() {
            Some(tx) => tx.try_send(message.into()).is_ok(),
            None => false,
        }
    }

    /// Close the inbound queue and wait for every worker to drain and exit.
    ///
    /// The aggregator performs its final flush and closes the outbound
    /// queue; each sender exits once that queue is drained. A second stop is
    /// a no-op.
    pub async fn stop(&self) {
        // Dropping the stored writer closes the inbound queue; clones held
        // by in-flight notify calls finish their send first.
        drop(self.input_tx.lock().expect("lock poisoned").take());

        let workers = self.workers.lock().expect("lock poisoned").take();
        if let Some(workers) = workers {
            for worker in workers {
                let _ = worker.await;
            }
        }

        info!("notifier stopped");
    }
}
