use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use kanban_core::column::CreateColumn;
use kanban_service::BoardService;
use serde_json::{json, Value};

use super::{json_error, to_error, ApiError, AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/columns", get(list_columns).post(create_column))
}

async fn list_columns(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state
        .service
        .list_columns()
        .await
        .map(|c| Json(json!(c)))
        .map_err(to_error)
}

async fn create_column(
    State(state): State<AppState>,
    input: Result<Json<CreateColumn>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(input) = input.map_err(json_error)?;
    state
        .service
        .create_column(&input)
        .await
        .map(|c| (StatusCode::CREATED, Json(json!(c))))
        .map_err(to_error)
}
