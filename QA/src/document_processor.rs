use crate::error::{Error, Result};
use pdf_extract::extract_text_from_mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Turns raw PDF bytes into the plain text handed to the QA service.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextExtractor;

impl TextExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Concatenated text of every page, in page order, exactly as the
    /// parser emits it. No cleaning or trimming is applied.
    pub fn extract(&self, bytes: &[u8]) -> Result<String> {
        if bytes.is_empty() {
            return Err(Error::malformed("empty document"));
        }

        // The parser panics on some hostile inputs instead of returning Err.
        match panic::catch_unwind(AssertUnwindSafe(|| extract_text_from_mem(bytes))) {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(Error::malformed(e.to_string())),
            Err(_) => Err(Error::malformed("PDF parser panicked")),
        }
    }

    /// Run extraction on the blocking pool.
    pub async fn extract_blocking(&self, bytes: Arc<Vec<u8>>) -> Result<String> {
        let extractor = *self;
        tokio::task::spawn_blocking(move || extractor.extract(&bytes))
            .await
            .map_err(|e| Error::malformed(format!("extraction task failed: {}", e)))?
    }
}
