use std::sync::Arc;
use uuid::Uuid;

use crate::blob_store::BlobStore;
use crate::document_processor::TextExtractor;
use crate::document_store::DocumentStore;
use crate::error::Result;
use crate::models::{AskRequest, AskResponse};
use crate::qa_service::QaService;

/// Answers questions about previously uploaded documents.
///
/// Every call is a single pass: the text is re-extracted from the stored
/// PDF each time and handed to the QA service whole.
pub struct QueryService {
    extractor: TextExtractor,
    store: DocumentStore,
    blobs: Arc<dyn BlobStore>,
    qa: Arc<dyn QaService>,
}

impl QueryService {
    pub fn new(
        extractor: TextExtractor,
        store: DocumentStore,
        blobs: Arc<dyn BlobStore>,
        qa: Arc<dyn QaService>,
    ) -> Self {
        Self {
            extractor,
            store,
            blobs,
            qa,
        }
    }

    pub async fn ask(&self, request: AskRequest) -> Result<AskResponse> {
        let request_id = Uuid::new_v4();
        let AskRequest {
            question,
            document_id,
        } = request;

        let record = self.store.get_by_id(document_id).await.map_err(|e| {
            if e.is_client_error() {
                log::info!("[{}] Unknown document id={}", request_id, document_id);
            } else {
                log::error!("[{}] Lookup failed for id={}: {}", request_id, document_id, e);
            }
            e
        })?;

        let bytes = self.blobs.read(&record.storage_key()).await.map_err(|e| {
            log::error!(
                "[{}] Stored PDF unavailable for id={} filename={}: {}",
                request_id,
                record.id,
                record.filename,
                e
            );
            e
        })?;

        let text = self
            .extractor
            .extract_blocking(Arc::new(bytes))
            .await
            .map_err(|e| {
                log::error!(
                    "[{}] Text extraction failed for id={} filename={}: {}",
                    request_id,
                    record.id,
                    record.filename,
                    e
                );
                e
            })?;

        log::info!(
            "[{}] Processing question: {} for document: {} (id={})",
            request_id,
            question,
            record.filename,
            record.id
        );

        let answer = self.qa.answer(&question, &text).await.map_err(|e| {
            log::error!(
                "[{}] {} failed for id={} filename={}: {}",
                request_id,
                self.qa.name(),
                record.id,
                record.filename,
                e
            );
            e
        })?;

        log::info!("[{}] Generated answer ({} chars)", request_id, answer.len());

        Ok(AskResponse { answer })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob_store::FileBlobStore;
    use crate::error::Error;
    use crate::models::UploadRequest;
    use crate::test_support::{fixture, FailingQa, RecordingQa};
    use crate::upload_service::UploadService;

    struct Fixture {
        _dir: tempfile::TempDir,
        blobs: Arc<FileBlobStore>,
        store: DocumentStore,
        upload: UploadService,
    }

    fn setup() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let blobs = Arc::new(FileBlobStore::new(dir.path().join("uploads")).unwrap());
        let store = DocumentStore::open_in_memory().unwrap();
        let upload = UploadService::new(TextExtractor::new(), store.clone(), blobs.clone());
        Fixture {
            _dir: dir,
            blobs,
            store,
            upload,
        }
    }

    fn query(fx: &Fixture, qa: Arc<dyn QaService>) -> QueryService {
        QueryService::new(TextExtractor::new(), fx.store.clone(), fx.blobs.clone(), qa)
    }

    async fn upload(fx: &Fixture, filename: &str, fixture_name: &str) -> (i64, String) {
        let response = fx
            .upload
            .upload(UploadRequest {
                filename: filename.into(),
                content_type: Some("application/pdf".into()),
                bytes: fixture(fixture_name),
            })
            .await
            .unwrap();
        (response.id, response.text)
    }

    #[tokio::test]
    async fn test_passes_exact_text_to_qa() {
        let fx = setup();
        let (id, text) = upload(&fx, "sample.pdf", "sample.pdf").await;

        let qa = Arc::new(RecordingQa::new("The total is $42.00."));
        let response = query(&fx, qa.clone())
            .ask(AskRequest {
                question: "What is the total?".into(),
                document_id: id,
            })
            .await
            .unwrap();

        assert_eq!(response.answer, "The total is $42.00.");
        assert_eq!(
            qa.calls(),
            vec![("What is the total?".to_string(), text)]
        );
    }

    #[tokio::test]
    async fn test_unknown_document() {
        let fx = setup();
        let qa = Arc::new(RecordingQa::new("unused"));
        let service = query(&fx, qa.clone());

        for question in ["x", "", "What is the total?"] {
            let err = service
                .ask(AskRequest {
                    question: question.into(),
                    document_id: 9999,
                })
                .await
                .unwrap_err();
            assert!(matches!(err, Error::DocumentNotFound { id: 9999 }));
        }
        assert!(qa.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_blob_is_not_a_lookup_miss() {
        let fx = setup();
        let (id, _) = upload(&fx, "sample.pdf", "sample.pdf").await;
        std::fs::remove_file(fx.blobs.root().join(format!("{}.pdf", id))).unwrap();

        let err = query(&fx, Arc::new(RecordingQa::new("unused")))
            .ask(AskRequest {
                question: "x".into(),
                document_id: id,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BlobNotFound { .. }));
        assert!(!err.is_client_error());
    }

    #[tokio::test]
    async fn test_same_filename_uploads_stay_separate() {
        let fx = setup();
        let (first, first_text) = upload(&fx, "doc.pdf", "sample.pdf").await;
        let (_second, second_text) = upload(&fx, "doc.pdf", "receipt.pdf").await;
        assert_ne!(first_text, second_text);

        let qa = Arc::new(RecordingQa::new("ok"));
        query(&fx, qa.clone())
            .ask(AskRequest {
                question: "total?".into(),
                document_id: first,
            })
            .await
            .unwrap();

        assert_eq!(qa.calls()[0].1, first_text);
    }

    #[tokio::test]
    async fn test_qa_failure_propagates() {
        let fx = setup();
        let (id, _) = upload(&fx, "sample.pdf", "sample.pdf").await;

        let err = query(&fx, Arc::new(FailingQa))
            .ask(AskRequest {
                question: "x".into(),
                document_id: id,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UpstreamUnavailable { .. }));
    }
}
