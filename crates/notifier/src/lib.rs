//! Notifier: client-side message batching and delivery pipeline.
//!
//! Callers submit individual text messages; the pipeline accumulates them
//! into byte-bounded batches and delivers each batch to an HTTP endpoint
//! through a pool of concurrent senders.
//!
//! # Architecture
//!
//! ```text
//! caller -> notify() -> [inbound queue] -> Aggregator -> [outbound queue]
//!                                                             |
//!                                              Sender pool (N workers)
//!                                                             |
//!                                                    Transport -> endpoint
//! ```
//!
//! # Core Invariants
//!
//! 1. **Bounded batches**: a batch never exceeds its byte budget; a rejected
//!    add leaves the batch untouched.
//! 2. **No empty emissions**: timer and shutdown flushes of an empty batch
//!    enqueue nothing downstream.
//! 3. **Lossy by contract**: a failed batch is logged and dropped; the
//!    pipeline only halts on [`Notifier::stop`].
//! 4. **Ordered drain**: stopping closes the inbound queue first, and every
//!    worker exits only after its queue reports closed-and-drained.

pub mod aggregator;
pub mod batch;
pub mod config;
pub mod encoder;
pub mod error;
pub mod notifier;
pub mod sender;

#[cfg(test)]
mod tests;

pub use aggregator::{Aggregator, FlushReason};
pub use batch::Batch;
pub use config::NotifierConfig;
pub use encoder::{default_encoder, BodyEncoder};
pub use error::{NotifierError, NotifierResult};
pub use notifier::Notifier;
pub use sender::{Sender, SharedBatchReceiver};
