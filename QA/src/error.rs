//! Error taxonomy for the document-to-answer pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Declared content type is not a PDF
    #[error("Invalid file type: {content_type}")]
    InvalidFileType { content_type: String },

    /// Bytes could not be parsed as a PDF
    #[error("Malformed PDF document: {reason}")]
    MalformedDocument { reason: String },

    /// No metadata record for the requested id
    #[error("Document not found: {id}")]
    DocumentNotFound { id: i64 },

    /// Record exists but its blob is gone
    #[error("Blob not found: {key}")]
    BlobNotFound { key: String },

    /// Model service could not be reached or did not answer in time
    #[error("QA service unavailable: {reason}")]
    UpstreamUnavailable { reason: String },

    /// Model service answered with a failure or an unusable body
    #[error("QA service error (status {status:?}): {message}")]
    UpstreamError { status: Option<u16>, message: String },

    #[error("Storage write failed for '{target}': {reason}")]
    StorageWriteFailure { target: String, reason: String },

    #[error("Storage read failed for '{target}': {reason}")]
    StorageFailure { target: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedDocument {
            reason: reason.into(),
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            reason: reason.into(),
        }
    }

    pub fn upstream(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::UpstreamError {
            status,
            message: message.into(),
        }
    }

    pub fn write_failure(target: impl Into<String>, reason: impl ToString) -> Self {
        Self::StorageWriteFailure {
            target: target.into(),
            reason: reason.to_string(),
        }
    }

    pub fn read_failure(target: impl Into<String>, reason: impl ToString) -> Self {
        Self::StorageFailure {
            target: target.into(),
            reason: reason.to_string(),
        }
    }

    /// Map a transport failure from the model service into the taxonomy.
    ///
    /// Connection and timeout failures mean the service was never reached;
    /// everything else (bad body, decode failure) is an upstream error.
    pub fn from_transport(err: reqwest::Error) -> Self {
        let err = err.without_url();
        if err.is_connect() || err.is_timeout() {
            Self::unavailable(err.to_string())
        } else {
            Self::upstream(err.status().map(|s| s.as_u16()), err.to_string())
        }
    }

    /// True for errors the caller caused and should see verbatim.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidFileType { .. } | Error::DocumentNotFound { .. }
        )
    }

    /// Return a sanitized message safe to send to clients.
    /// Everything that is not a client error collapses to the same text;
    /// the full `Display` output is for logs only.
    pub fn client_message(&self) -> String {
        match self {
            Error::InvalidFileType { .. } => "Invalid file type".to_string(),
            Error::DocumentNotFound { .. } => "Document not found".to_string(),
            _ => "Internal Server Error".to_string(),
        }
    }
}
