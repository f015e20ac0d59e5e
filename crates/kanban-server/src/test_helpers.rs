use std::sync::Arc;

use axum::Router;
use kanban_db::SqliteDatabase;
use kanban_service::LocalService;
use kanban_store::StoreConfig;
use tempfile::TempDir;
use tokio::net::TcpListener;

use crate::origin::OriginAllowList;
use crate::routes::{build_router, InnerAppState};

/// Origin accepted by test routers.
pub const TEST_ORIGIN: &str = "http://allowed.test";

const TEST_MAX_UPLOAD_BYTES: usize = 1024 * 1024;

/// Build a test router with in-memory SQLite and a temp-dir blob store.
/// The returned `TempDir` owns the uploads and must outlive the router.
pub fn test_router() -> (Router, TempDir) {
    test_router_with_limit(TEST_MAX_UPLOAD_BYTES)
}

/// Same as `test_router`, with a custom request body limit.
pub fn test_router_with_limit(max_upload_bytes: usize) -> (Router, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let db = Arc::new(SqliteDatabase::open_in_memory().unwrap());
    let store = kanban_store::create_store(&StoreConfig {
        local_data_dir: Some(dir.path().join("uploads").to_string_lossy().to_string()),
    })
    .unwrap();
    let state = Arc::new(InnerAppState {
        service: LocalService::new(db, store),
        origins: OriginAllowList::new([TEST_ORIGIN]),
        max_upload_bytes,
    });
    (build_router(state), dir)
}

/// A running test server with base_url and background task handle.
pub struct TestServer {
    pub base_url: String,
    _handle: tokio::task::JoinHandle<()>,
    _dir: TempDir,
}

/// Spawn an axum test server on a random port. Returns the TestServer
/// with the `base_url` (e.g. "http://127.0.0.1:12345").
pub async fn spawn_test_server() -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{addr}");
    let (app, dir) = test_router();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    TestServer {
        base_url,
        _handle: handle,
        _dir: dir,
    }
}

/// Send a request through the router, returning the status and JSON body
/// (`Null` when the body is not JSON).
#[cfg(test)]
pub(crate) async fn send(
    app: &Router,
    request: axum::http::Request<axum::body::Body>,
) -> (axum::http::StatusCode, serde_json::Value) {
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    let resp = app.clone().oneshot(request).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, body)
}

#[cfg(test)]
pub(crate) fn post_json(
    uri: &str,
    body: serde_json::Value,
) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(axum::body::Body::from(body.to_string()))
        .unwrap()
}
