use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use kanban_core::task::{CreateTask, TaskListing};
use kanban_service::BoardService;
use serde_json::{json, Value};

use super::{json_error, to_error, ApiError, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route("/api/tasks/{task_id}", get(get_task))
        .route("/api/tasks/{task_id}/column/{column_id}", put(move_task))
}

async fn list_tasks(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let tasks = state.service.list_tasks().await.map_err(to_error)?;
    let cards: Vec<TaskListing> = tasks.into_iter().map(TaskListing::from).collect();
    Ok(Json(json!(cards)))
}

async fn create_task(
    State(state): State<AppState>,
    input: Result<Json<CreateTask>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(input) = input.map_err(json_error)?;
    state
        .service
        .create_task(&input)
        .await
        .map(|t| (StatusCode::CREATED, Json(json!(t))))
        .map_err(to_error)
}

async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state
        .service
        .get_task(&task_id)
        .await
        .map(|t| Json(json!(t)))
        .map_err(to_error)
}

async fn move_task(
    State(state): State<AppState>,
    Path((task_id, column_id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    state
        .service
        .move_task(&task_id, &column_id)
        .await
        .map(|t| Json(json!(t)))
        .map_err(to_error)
}
