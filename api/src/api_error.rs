use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pdf_qa::{Error, ErrorResponse};

/// The one place pipeline errors become HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    Pipeline(Error),
    /// Request body did not match the expected shape
    Validation(String),
    /// Transport-level failure before the pipeline ran
    Internal(String),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError::Pipeline(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::Pipeline(err) => {
                let status = match &err {
                    Error::InvalidFileType { .. } => StatusCode::BAD_REQUEST,
                    Error::DocumentNotFound { .. } => StatusCode::NOT_FOUND,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                if !err.is_client_error() {
                    log::debug!("Collapsed to {}: {}", status, err);
                }
                (status, err.client_message())
            }
            ApiError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::Internal(msg) => {
                log::error!("Request failed: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { detail })).into_response()
    }
}
