use std::collections::HashMap;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use kanban_core::id::new_id;
use kanban_core::task::{CreateTask, Task, TaskMetadata};

use super::super::{SqliteDatabase, SqliteResultExt};
use super::attachments::{attachments_for_task, row_to_attachment};
use crate::DbError;

const TASK_COLUMNS: &str = "id, column_id, content, client_photo, client_name, \
                            assignee_photo, assignee_name, created_at";

fn row_to_task(row: &Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get("id")?,
        column_id: row.get("column_id")?,
        content: row.get("content")?,
        metadata: TaskMetadata {
            client_photo: row.get("client_photo")?,
            client_name: row.get("client_name")?,
            assignee_photo: row.get("assignee_photo")?,
            assignee_name: row.get("assignee_name")?,
        },
        created_at: row.get("created_at")?,
        files: Vec::new(),
    })
}

/// Load a task together with its attachments.
pub(super) fn load_task(conn: &Connection, id: &str) -> Result<Task, DbError> {
    let mut task = conn
        .query_row(
            &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
            params![id],
            row_to_task,
        )
        .optional()
        .to_db()?
        .ok_or_else(|| DbError::NotFound(format!("task {id}")))?;
    task.files = attachments_for_task(conn, id)?;
    Ok(task)
}

pub(super) fn task_exists(conn: &Connection, id: &str) -> Result<bool, DbError> {
    conn.query_row("SELECT 1 FROM tasks WHERE id = ?1", params![id], |_| Ok(()))
        .optional()
        .to_db()
        .map(|found| found.is_some())
}

impl SqliteDatabase {
    pub fn create_task_sync(&self, input: &CreateTask) -> Result<Task, DbError> {
        self.with_conn(|conn| {
            let id = new_id();
            conn.execute(
                &format!("INSERT INTO tasks ({TASK_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"),
                params![
                    id,
                    input.column_id,
                    input.content,
                    input.metadata.client_photo,
                    input.metadata.client_name,
                    input.metadata.assignee_photo,
                    input.metadata.assignee_name,
                    Utc::now(),
                ],
            )
            .to_db()?;
            load_task(conn, &id)
        })
    }

    pub fn get_task_sync(&self, id: &str) -> Result<Task, DbError> {
        self.with_conn(|conn| load_task(conn, id))
    }

    pub fn list_tasks_sync(&self) -> Result<Vec<Task>, DbError> {
        self.with_conn(|conn| {
            let mut files_by_task: HashMap<String, Vec<_>> = HashMap::new();
            let mut stmt = conn
                .prepare("SELECT * FROM attachments ORDER BY rowid")
                .to_db()?;
            let attachments = stmt
                .query_map([], row_to_attachment)
                .to_db()?
                .collect::<Result<Vec<_>, _>>()
                .to_db()?;
            for attachment in attachments {
                files_by_task
                    .entry(attachment.task_id.clone())
                    .or_default()
                    .push(attachment);
            }

            let mut stmt = conn
                .prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY rowid"))
                .to_db()?;
            let tasks = stmt
                .query_map([], row_to_task)
                .to_db()?
                .collect::<Result<Vec<_>, _>>()
                .to_db()?;
            Ok(tasks
                .into_iter()
                .map(|mut task| {
                    task.files = files_by_task.remove(&task.id).unwrap_or_default();
                    task
                })
                .collect())
        })
    }

    pub fn set_task_column_sync(&self, id: &str, column_id: &str) -> Result<Task, DbError> {
        self.with_conn(|conn| {
            let changed = conn
                .execute(
                    "UPDATE tasks SET column_id = ?2 WHERE id = ?1",
                    params![id, column_id],
                )
                .to_db()?;
            if changed == 0 {
                return Err(DbError::NotFound(format!("task {id}")));
            }
            load_task(conn, id)
        })
    }
}
