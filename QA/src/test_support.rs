//! Shared fakes for unit tests

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use crate::blob_store::BlobStore;
use crate::error::{Error, Result};
use crate::qa_service::QaService;

pub fn fixture(name: &str) -> Vec<u8> {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    std::fs::read(path).expect("fixture missing")
}

/// Blob store that only counts how often it was touched.
#[derive(Default)]
pub struct CountingBlobStore {
    operations: AtomicUsize,
}

impl CountingBlobStore {
    pub fn operations(&self) -> usize {
        self.operations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlobStore for CountingBlobStore {
    async fn write(&self, _key: &str, _bytes: &[u8]) -> Result<()> {
        self.operations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn read(&self, key: &str) -> Result<Vec<u8>> {
        self.operations.fetch_add(1, Ordering::SeqCst);
        Err(Error::BlobNotFound {
            key: key.to_string(),
        })
    }
}

/// Blob store whose writes always fail, as on a full disk.
#[derive(Default)]
pub struct FailingBlobStore {
    writes: AtomicUsize,
}

impl FailingBlobStore {
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlobStore for FailingBlobStore {
    async fn write(&self, key: &str, _bytes: &[u8]) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Err(Error::write_failure(key, "disk full"))
    }

    async fn read(&self, key: &str) -> Result<Vec<u8>> {
        Err(Error::BlobNotFound {
            key: key.to_string(),
        })
    }
}

/// QA service that remembers every (question, context) pair.
pub struct RecordingQa {
    answer: String,
    calls: Mutex<Vec<(String, String)>>,
}

impl RecordingQa {
    pub fn new(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl QaService for RecordingQa {
    async fn answer(&self, question: &str, document_text: &str) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((question.to_string(), document_text.to_string()));
        Ok(self.answer.clone())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

pub struct FailingQa;

#[async_trait]
impl QaService for FailingQa {
    async fn answer(&self, _question: &str, _document_text: &str) -> Result<String> {
        Err(Error::unavailable("connection refused"))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Answer exactly one HTTP request with `status` and a JSON `body`.
/// The join handle yields the raw request text.
pub async fn serve_once(status: u16, body: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let body = body.to_string();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {} Test\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        request
    });

    (format!("http://{}", addr), handle)
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Accept connections and never answer. Abort the handle when done.
pub async fn silent_listener() -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let mut held = Vec::new();
        loop {
            match listener.accept().await {
                Ok((socket, _)) => held.push(socket),
                Err(_) => tokio::time::sleep(Duration::from_millis(10)).await,
            }
        }
    });

    (format!("http://{}", addr), handle)
}

/// An address nothing listens on.
pub async fn closed_port() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
