//! Integration tests for the notifier pipeline.
//!
//! Organization:
//!
//! - `harness.rs`      - MockTransport and a recording HTTP endpoint
//! - `batching.rs`     - timer, overflow, empty-flush, and loss-continuity
//! - `backpressure.rs` - blocking vs best-effort submission
//! - `shutdown.rs`     - drain ordering and fail-fast after stop
//! - `end_to_end.rs`   - full pipeline against a real HTTP endpoint

pub(crate) mod harness;
