use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use kanban_core::attachment::{UploadFile, DEFAULT_MIME_TYPE};
use kanban_service::{BoardService, ServiceError};
use serde_json::{json, Value};
use tracing::debug;

use super::{to_error, ApiError, AppState};

/// Multipart field carrying uploaded files. May repeat.
const FILES_FIELD: &str = "files";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/tasks/{task_id}/upload", post(upload_files))
        .route(
            "/api/tasks/{task_id}/file/{file_id}/{file_name}",
            delete(delete_file),
        )
        .route(
            "/uploads/tasks/{task_id}/attachments/{file_id}/{name}",
            get(serve_file),
        )
}

async fn upload_files(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILES_FIELD) {
            debug!(field = ?field.name(), "skipping multipart field");
            continue;
        }
        let name = field.file_name().unwrap_or_default().to_string();
        let mime_type = field.content_type().unwrap_or_default().to_string();
        let data = field.bytes().await.map_err(multipart_error)?;
        files.push(UploadFile::new(name, mime_type, data));
    }

    state
        .service
        .upload_files(&task_id, files)
        .await
        .map(|t| Json(json!(t)))
        .map_err(to_error)
}

async fn delete_file(
    State(state): State<AppState>,
    Path((task_id, file_id, file_name)): Path<(String, String, String)>,
) -> Result<Json<Value>, ApiError> {
    state
        .service
        .delete_file(&task_id, &file_id, &file_name)
        .await
        .map(|t| Json(json!(t)))
        .map_err(to_error)
}

async fn serve_file(
    State(state): State<AppState>,
    Path((task_id, file_id, name)): Path<(String, String, String)>,
) -> Result<Response, ApiError> {
    let (attachment, data) = state
        .service
        .read_file(&task_id, &file_id)
        .await
        .map_err(to_error)?;
    if !attachment.storage_path.ends_with(&format!("/{name}")) {
        return Err(to_error(ServiceError::NotFound(format!(
            "file {name} on task {task_id}"
        ))));
    }

    let content_type = HeaderValue::from_str(&attachment.mime_type)
        .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_MIME_TYPE));
    Ok(([(header::CONTENT_TYPE, content_type)], data).into_response())
}

/// Malformed or oversized multipart bodies keep the status axum assigns
/// (400 or 413).
fn multipart_error(e: MultipartError) -> ApiError {
    (
        e.status(),
        Json(json!({ "error": format!("validation error: {}", e.body_text()) })),
    )
}
