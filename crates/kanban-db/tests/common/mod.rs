// Backend-agnostic integration tests for the Database trait.
//
// Each public async function accepts `&dyn Database` so the same assertions
// can run against any backend.

use kanban_core::attachment::NewAttachment;
use kanban_core::column::CreateColumn;
use kanban_core::id::new_id;
use kanban_core::task::CreateTask;
use kanban_db::{Database, DbError};

fn new_attachment(task_id: &str, name: &str, size: i64) -> NewAttachment {
    let id = new_id();
    NewAttachment {
        storage_path: format!("tasks/{task_id}/attachments/{id}/{name}"),
        id,
        mime_type: "text/plain".into(),
        size_bytes: size,
        original_name: name.into(),
    }
}

// ---------------------------------------------------------------------------
// Columns
// ---------------------------------------------------------------------------

pub async fn test_column_crud(db: &dyn Database) {
    assert!(db.list_columns().await.unwrap().is_empty());

    let todo = db
        .create_column(&CreateColumn::new("Todo", "#fff"))
        .await
        .unwrap();
    let done = db
        .create_column(&CreateColumn::new("Done", "#0f0"))
        .await
        .unwrap();
    assert_eq!(todo.name, "Todo");
    assert_eq!(todo.color, "#fff");
    assert_ne!(todo.id, done.id);

    let fetched = db.get_column(&todo.id).await.unwrap();
    assert_eq!(fetched, todo);

    let all = db.list_columns().await.unwrap();
    assert_eq!(all, vec![todo, done]);

    let err = db.get_column(&new_id()).await.unwrap_err();
    assert!(matches!(err, DbError::NotFound(_)));
}

pub async fn test_column_listing_is_stable(db: &dyn Database) {
    for name in ["Backlog", "Doing", "Review", "Done"] {
        db.create_column(&CreateColumn::new(name, "")).await.unwrap();
    }
    let first = db.list_columns().await.unwrap();
    let second = db.list_columns().await.unwrap();
    assert_eq!(first, second);
    let names: Vec<_> = first.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Backlog", "Doing", "Review", "Done"]);
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

pub async fn test_task_crud(db: &dyn Database) {
    let column = db
        .create_column(&CreateColumn::new("Todo", ""))
        .await
        .unwrap();
    let before = chrono::Utc::now();
    let task = db
        .create_task(&CreateTask::new(&column.id, "write spec"))
        .await
        .unwrap();
    assert_eq!(task.column_id, column.id);
    assert_eq!(task.content, "write spec");
    assert!(task.files.is_empty());
    assert!(task.created_at >= before - chrono::Duration::seconds(1));
    assert!(task.created_at <= chrono::Utc::now());

    let fetched = db.get_task(&task.id).await.unwrap();
    assert_eq!(fetched, task);

    let all = db.list_tasks().await.unwrap();
    assert_eq!(all, vec![task]);

    let err = db.get_task(&new_id()).await.unwrap_err();
    assert!(matches!(err, DbError::NotFound(_)));
}

pub async fn test_task_move(db: &dyn Database) {
    let todo = db.create_column(&CreateColumn::new("Todo", "")).await.unwrap();
    let done = db.create_column(&CreateColumn::new("Done", "")).await.unwrap();
    let task = db
        .create_task(&CreateTask::new(&todo.id, "ship it"))
        .await
        .unwrap();
    let with_file = db
        .append_attachments(&task.id, &[new_attachment(&task.id, "a.txt", 5)])
        .await
        .unwrap();

    let moved = db.set_task_column(&task.id, &done.id).await.unwrap();
    assert_eq!(moved.column_id, done.id);
    assert_eq!(moved.content, with_file.content);
    assert_eq!(moved.created_at, with_file.created_at);
    assert_eq!(moved.files, with_file.files);
}

pub async fn test_list_tasks_groups_files(db: &dyn Database) {
    let column = db.create_column(&CreateColumn::new("Todo", "")).await.unwrap();
    let a = db.create_task(&CreateTask::new(&column.id, "a")).await.unwrap();
    let b = db.create_task(&CreateTask::new(&column.id, "b")).await.unwrap();
    db.append_attachments(&b.id, &[new_attachment(&b.id, "1.txt", 1)])
        .await
        .unwrap();
    db.append_attachments(&a.id, &[new_attachment(&a.id, "2.txt", 2)])
        .await
        .unwrap();
    db.append_attachments(&b.id, &[new_attachment(&b.id, "3.txt", 3)])
        .await
        .unwrap();

    let tasks = db.list_tasks().await.unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].id, a.id);
    assert_eq!(tasks[1].id, b.id);
    let names = |i: usize| -> Vec<String> {
        tasks[i].files.iter().map(|f| f.original_name.clone()).collect()
    };
    assert_eq!(names(0), vec!["2.txt"]);
    assert_eq!(names(1), vec!["1.txt", "3.txt"]);

    assert_eq!(tasks, db.list_tasks().await.unwrap());
}

// ---------------------------------------------------------------------------
// Attachments
// ---------------------------------------------------------------------------

pub async fn test_attachment_lifecycle(db: &dyn Database) {
    let column = db.create_column(&CreateColumn::new("Todo", "")).await.unwrap();
    let task = db
        .create_task(&CreateTask::new(&column.id, "files"))
        .await
        .unwrap();

    let a = new_attachment(&task.id, "a.txt", 5);
    let b = new_attachment(&task.id, "b.txt", 9);
    let updated = db
        .append_attachments(&task.id, &[a.clone(), b.clone()])
        .await
        .unwrap();
    assert_eq!(updated.files.len(), 2);
    assert_eq!(updated.files[0].storage_path, a.storage_path);
    assert_eq!(updated.files[0].size_bytes, 5);
    assert_eq!(updated.files[1].mime_type, "text/plain");

    let after = db.remove_attachment(&task.id, &a.id).await.unwrap();
    assert_eq!(after.files.len(), 1);
    assert_eq!(after.files[0].id, b.id);

    let err = db.remove_attachment(&task.id, &a.id).await.unwrap_err();
    assert!(matches!(err, DbError::NotFound(_)));

    let err = db.remove_attachment(&new_id(), &b.id).await.unwrap_err();
    assert!(matches!(err, DbError::NotFound(_)));
    assert_eq!(db.get_task(&task.id).await.unwrap().files.len(), 1);
}

pub async fn test_append_nothing_is_a_no_op(db: &dyn Database) {
    let column = db.create_column(&CreateColumn::new("Todo", "")).await.unwrap();
    let task = db
        .create_task(&CreateTask::new(&column.id, "files"))
        .await
        .unwrap();
    let same = db.append_attachments(&task.id, &[]).await.unwrap();
    assert_eq!(same, task);
}
