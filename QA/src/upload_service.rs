use std::sync::Arc;
use uuid::Uuid;

use crate::blob_store::BlobStore;
use crate::document_processor::TextExtractor;
use crate::document_store::DocumentStore;
use crate::error::{Error, Result};
use crate::models::{UploadRequest, UploadResponse};

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

pub struct UploadService {
    extractor: TextExtractor,
    store: DocumentStore,
    blobs: Arc<dyn BlobStore>,
}

impl UploadService {
    pub fn new(extractor: TextExtractor, store: DocumentStore, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            extractor,
            store,
            blobs,
        }
    }

    /// Validate, extract, record, then store the bytes under the new id.
    pub async fn upload(&self, request: UploadRequest) -> Result<UploadResponse> {
        let request_id = Uuid::new_v4();
        let UploadRequest {
            filename,
            content_type,
            bytes,
        } = request;

        if !is_pdf(content_type.as_deref()) {
            log::info!(
                "[{}] Rejected upload {}: content type {:?}",
                request_id,
                filename,
                content_type
            );
            return Err(Error::InvalidFileType {
                content_type: content_type.unwrap_or_default(),
            });
        }

        let size = bytes.len();
        let bytes = Arc::new(bytes);
        let text = self
            .extractor
            .extract_blocking(Arc::clone(&bytes))
            .await
            .map_err(|e| {
                log::error!("[{}] Text extraction failed for {}: {}", request_id, filename, e);
                e
            })?;

        let record = self.store.create(&filename).await.map_err(|e| {
            log::error!("[{}] Failed to record upload {}: {}", request_id, filename, e);
            e
        })?;

        if let Err(e) = self.blobs.write(&record.storage_key(), bytes.as_slice()).await {
            log::error!(
                "[{}] Orphaned document record id={} filename={}: blob write failed: {}",
                request_id,
                record.id,
                record.filename,
                e
            );
            return Err(e);
        }

        log::info!(
            "[{}] Uploaded PDF: {} (id={}, {} bytes), Extracted text length: {}",
            request_id,
            record.filename,
            record.id,
            size,
            text.len()
        );

        Ok(UploadResponse {
            id: record.id,
            filename: record.filename,
            text,
        })
    }
}

/// Compare the MIME essence, ignoring parameters and case.
pub fn is_pdf(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.split(';').next())
        .map(|essence| essence.trim().eq_ignore_ascii_case(PDF_CONTENT_TYPE))
        .unwrap_or(false)
}
