//! Test harness for pipeline integration tests.
//!
//! Provides:
//! - MockTransport: records delivered batches, can be switched to fail
//! - RecordingServer: a real HTTP endpoint capturing request bodies
//! - small config/constructor helpers

use crate::encoder::default_encoder;
use crate::{Notifier, NotifierConfig};
use async_trait::async_trait;
use notifier_transport::{Transport, TransportError, TransportResult};
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// The wire payload, decoded back for assertions.
#[derive(Debug, Deserialize)]
struct NotifyPayload {
    messages: Option<Vec<String>>,
}

/// Transport double that records every delivered batch.
pub struct MockTransport {
    batches: Mutex<Vec<Vec<String>>>,
    bodies: Mutex<Vec<String>>,
    fail: AtomicBool,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            batches: Mutex::new(Vec::new()),
            bodies: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        })
    }

    /// Make subsequent sends fail (or succeed again).
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Batches delivered so far, decoded from the wire payload.
    pub fn batches(&self) -> Vec<Vec<String>> {
        self.batches.lock().unwrap().clone()
    }

    /// Raw request bodies delivered so far.
    pub fn bodies(&self) -> Vec<String> {
        self.bodies.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, _sender_id: usize, body: Vec<u8>) -> TransportResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(TransportError::Internal {
                status: 500,
                path: "/notify".to_string(),
            });
        }

        let body = String::from_utf8(body).expect("utf8 body");
        let payload: NotifyPayload = serde_json::from_str(&body).expect("json body");

        self.bodies.lock().unwrap().push(body);
        self.batches
            .lock()
            .unwrap()
            .push(payload.messages.unwrap_or_default());

        Ok(())
    }
}

/// Config tuned for fast tests: short flush interval, small pool.
pub fn fast_config() -> NotifierConfig {
    NotifierConfig {
        input_queue_size: 64,
        senders_count: 2,
        max_batch_size_bytes: 1024,
        flush_interval: Duration::from_millis(100),
        ..Default::default()
    }
}

/// Config whose timer never fires within a test.
pub fn no_timer_config() -> NotifierConfig {
    NotifierConfig {
        flush_interval: Duration::from_secs(600),
        ..fast_config()
    }
}

/// Build a notifier over the mock transport.
pub fn test_notifier(transport: Arc<MockTransport>, config: NotifierConfig) -> Notifier {
    Notifier::with_transport(transport, default_encoder(), config).unwrap()
}

/// A real HTTP endpoint recording every request body and answering 200.
pub struct RecordingServer {
    url: String,
    bodies: Arc<Mutex<Vec<String>>>,
    handle: JoinHandle<()>,
}

impl RecordingServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let bodies = Arc::new(Mutex::new(Vec::new()));

        let server_bodies = bodies.clone();
        let handle = tokio::spawn(async move {
            loop {
                let Ok((socket, _)) = listener.accept().await else {
                    break;
                };
                let bodies = server_bodies.clone();
                tokio::spawn(async move {
                    record_request(socket, bodies).await;
                });
            }
        });

        Self {
            url: format!("http://{}/notify", addr),
            bodies,
            handle,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn bodies(&self) -> Vec<String> {
        self.bodies.lock().unwrap().clone()
    }
}

impl Drop for RecordingServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn record_request(mut socket: TcpStream, bodies: Arc<Mutex<Vec<String>>>) {
    let mut buf = Vec::new();
    let mut tmp = [0u8; 1024];

    let header_end = loop {
        let Ok(n) = socket.read(&mut tmp).await else {
            return;
        };
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&tmp[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
    let content_length = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let Ok(n) = socket.read(&mut tmp).await else {
            return;
        };
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&tmp[..n]);
    }

    let body = String::from_utf8_lossy(&buf[header_end..header_end + content_length]).to_string();
    bodies.lock().unwrap().push(body);

    let response = "HTTP/1.1 200 OK\r\ncontent-length: 0\r\nconnection: close\r\n\r\n";
    socket.write_all(response.as_bytes()).await.ok();
    socket.shutdown().await.ok();
}
