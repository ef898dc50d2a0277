//! Notifier binary entry point.
//!
//! Reads newline-delimited messages from standard input and submits each
//! line to the pipeline. Shuts down gracefully on stdin EOF or interrupt.

use clap::Parser;
use notifier::{Notifier, NotifierConfig, NotifierResult};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

/// Notifier: batches stdin lines and delivers them to an HTTP endpoint.
#[derive(Parser, Debug)]
#[command(name = "notifier")]
#[command(about = "Batches stdin lines and delivers them to an HTTP endpoint")]
struct Args {
    /// Target URL for notifications.
    #[arg(long, env = "NOTIFIER_URL", default_value = "http://localhost:8080/notify")]
    url: String,

    /// Flush interval for incomplete batches, in milliseconds.
    #[arg(short = 'i', long, default_value = "1000")]
    flush_interval_ms: u64,

    /// Byte budget of a single batch.
    #[arg(long, default_value = "1048576")]
    batch_size_bytes: usize,

    /// Number of concurrent sender workers.
    #[arg(long, default_value = "10")]
    senders: usize,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Initialize tracing output on stderr, stdout being the message input side.
fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> NotifierResult<()> {
    let args = Args::parse();

    init_logging(&args.log_level);

    let config = NotifierConfig {
        flush_interval: Duration::from_millis(args.flush_interval_ms),
        max_batch_size_bytes: args.batch_size_bytes,
        senders_count: args.senders,
        ..Default::default()
    };

    info!(
        url = %args.url,
        flush_interval_ms = args.flush_interval_ms,
        senders = args.senders,
        "starting notifier"
    );

    let notifier = Notifier::new(&args.url, config)?;
    notifier.start();

    tokio::select! {
        _ = read_stdin(&notifier) => {
            info!("stdin closed, shutting down");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("received shutdown signal, shutting down");
        }
    }

    notifier.stop().await;

    Ok(())
}

/// Feed stdin lines into the pipeline until EOF or the pipeline stops.
async fn read_stdin(notifier: &Notifier) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if !notifier.notify(line).await {
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                error!(error = %e, "failed to read stdin");
                break;
            }
        }
    }
}
