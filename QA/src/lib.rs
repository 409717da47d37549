pub mod blob_store;
pub mod config;
pub mod document_processor;
pub mod document_store;
pub mod error;
pub mod gemini_service;
pub mod models;
pub mod openai_service;
pub mod qa_service;
pub mod query_service;
pub mod upload_service;

#[cfg(test)]
mod test_support;

pub use blob_store::{BlobStore, FileBlobStore};
pub use config::{AppConfig, QaConfig, QaProvider};
pub use document_processor::TextExtractor;
pub use document_store::DocumentStore;
pub use error::{Error, Result};
pub use models::*;
pub use qa_service::QaService;
pub use query_service::QueryService;
pub use upload_service::UploadService;

use std::sync::Arc;

/// The two pipelines wired to one set of store handles.
#[derive(Clone)]
pub struct QaSystem {
    pub upload: Arc<UploadService>,
    pub query: Arc<QueryService>,
}

impl QaSystem {
    pub fn new(store: DocumentStore, blobs: Arc<dyn BlobStore>, qa: Arc<dyn QaService>) -> Self {
        let extractor = TextExtractor::new();
        Self {
            upload: Arc::new(UploadService::new(extractor, store.clone(), blobs.clone())),
            query: Arc::new(QueryService::new(extractor, store, blobs, qa)),
        }
    }

    /// Open the database, prepare the upload folder and build the QA provider.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        log::info!("Initializing QA system...");

        let store = DocumentStore::open(&config.database_path)?;
        let blobs: Arc<dyn BlobStore> = Arc::new(FileBlobStore::new(&config.upload_folder)?);
        let qa = qa_service::from_config(&config.qa)?;

        log::info!(
            "QA system ready: database={}, uploads={}, provider={} model={}",
            config.database_path.display(),
            config.upload_folder.display(),
            qa.name(),
            config.qa.model
        );

        Ok(Self::new(store, blobs, qa))
    }
}
