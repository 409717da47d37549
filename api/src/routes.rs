use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Multipart, State},
    routing::{get, post},
    Json, Router,
};
use pdf_qa::{AskRequest, AskResponse, QaSystem, UploadRequest, UploadResponse};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

use crate::api_error::ApiError;

const FILE_FIELD: &str = "file";
const FALLBACK_FILENAME: &str = "upload.pdf";

pub fn build_router(system: QaSystem, max_upload_bytes: usize) -> Router {
    // Any origin with credentials: a literal `*` is not allowed there,
    // so everything is mirrored from the request.
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    let upload = post(upload_pdf).layer(DefaultBodyLimit::max(max_upload_bytes));

    Router::new()
        .route("/", get(read_root))
        .route("/upload/", upload.clone())
        .route("/upload", upload)
        .route("/ask/", post(ask_question))
        .route("/ask", post(ask_question))
        .with_state(system)
        .layer(ServiceBuilder::new().layer(cors))
}

async fn read_root() -> Json<Value> {
    Json(json!({ "message": "It's working" }))
}

async fn upload_pdf(
    State(system): State<QaSystem>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to read multipart field: {}", e)))?
    {
        let is_file = field.name() == Some(FILE_FIELD) || field.file_name().is_some();
        if !is_file {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .unwrap_or_else(|| FALLBACK_FILENAME.to_string());
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| {
            ApiError::Internal(format!("Failed to read upload {}: {}", filename, e))
        })?;

        upload = Some(UploadRequest {
            filename,
            content_type,
            bytes: bytes.to_vec(),
        });
        break;
    }

    let request = upload.ok_or_else(|| ApiError::Validation("No file uploaded".to_string()))?;
    let response = system.upload.upload(request).await?;
    Ok(Json(response))
}

async fn ask_question(
    State(system): State<QaSystem>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;
    let response = system.query.ask(request).await?;
    Ok(Json(response))
}
