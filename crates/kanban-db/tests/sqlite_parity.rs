// Runs the backend-agnostic Database assertions in `common/mod.rs` against
// the in-memory SQLite backend.

mod common;

use std::sync::Arc;

use kanban_db::Database;

async fn make_db() -> Arc<dyn Database> {
    Arc::new(kanban_db::SqliteDatabase::open_in_memory().unwrap())
}

#[tokio::test]
async fn column_crud() {
    let db = make_db().await;
    common::test_column_crud(&*db).await;
}

#[tokio::test]
async fn column_listing_is_stable() {
    let db = make_db().await;
    common::test_column_listing_is_stable(&*db).await;
}

#[tokio::test]
async fn task_crud() {
    let db = make_db().await;
    common::test_task_crud(&*db).await;
}

#[tokio::test]
async fn task_move() {
    let db = make_db().await;
    common::test_task_move(&*db).await;
}

#[tokio::test]
async fn list_tasks_groups_files() {
    let db = make_db().await;
    common::test_list_tasks_groups_files(&*db).await;
}

#[tokio::test]
async fn attachment_lifecycle() {
    let db = make_db().await;
    common::test_attachment_lifecycle(&*db).await;
}

#[tokio::test]
async fn append_nothing_is_a_no_op() {
    let db = make_db().await;
    common::test_append_nothing_is_a_no_op(&*db).await;
}
