pub mod columns;
pub mod files;
pub mod health;
pub mod tasks;

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit},
    http::{header, Method, StatusCode},
    middleware, Json, Router,
};
use kanban_service::{LocalService, ServiceError};
use serde_json::{json, Value};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::error;

use crate::origin::{origin_guard, OriginAllowList};

pub struct InnerAppState {
    pub service: LocalService,
    pub origins: OriginAllowList,
    pub max_upload_bytes: usize,
}

pub type AppState = Arc<InnerAppState>;

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(state.origins.header_values()))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .merge(health::routes())
        .merge(columns::routes())
        .merge(tasks::routes())
        .merge(files::routes())
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(cors)
        .layer(middleware::from_fn_with_state(state.clone(), origin_guard))
        .with_state(state)
}

pub(crate) type ApiError = (StatusCode, Json<Value>);

pub(crate) fn to_error(e: ServiceError) -> ApiError {
    let status = match &e {
        ServiceError::Validation(_) | ServiceError::InvalidReference(_) => StatusCode::BAD_REQUEST,
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::Storage(_) | ServiceError::Internal(_) => {
            error!("request failed: {e}");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(json!({ "error": e.to_string() })))
}

/// Unreadable JSON bodies (bad syntax, wrong field types, missing
/// Content-Type) are validation errors like any other bad input.
pub(crate) fn json_error(rejection: JsonRejection) -> ApiError {
    to_error(ServiceError::Validation(rejection.body_text()))
}
