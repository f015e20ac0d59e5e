use chrono::Utc;
use rusqlite::{params, Connection, Row};

use kanban_core::attachment::{Attachment, NewAttachment};
use kanban_core::task::Task;

use super::super::{SqliteDatabase, SqliteResultExt};
use super::tasks::{load_task, task_exists};
use crate::DbError;

pub(super) fn row_to_attachment(row: &Row) -> rusqlite::Result<Attachment> {
    Ok(Attachment {
        id: row.get("id")?,
        task_id: row.get("task_id")?,
        storage_path: row.get("storage_path")?,
        mime_type: row.get("mime_type")?,
        size_bytes: row.get("size_bytes")?,
        original_name: row.get("original_name")?,
        created_at: row.get("created_at")?,
    })
}

pub(super) fn attachments_for_task(
    conn: &Connection,
    task_id: &str,
) -> Result<Vec<Attachment>, DbError> {
    let mut stmt = conn
        .prepare("SELECT * FROM attachments WHERE task_id = ?1 ORDER BY rowid")
        .to_db()?;
    let attachments = stmt
        .query_map(params![task_id], row_to_attachment)
        .to_db()?
        .collect::<Result<Vec<_>, _>>()
        .to_db()?;
    Ok(attachments)
}

impl SqliteDatabase {
    pub fn append_attachments_sync(
        &self,
        task_id: &str,
        files: &[NewAttachment],
    ) -> Result<Task, DbError> {
        self.with_tx(|tx| {
            if !task_exists(tx, task_id)? {
                return Err(DbError::NotFound(format!("task {task_id}")));
            }
            let now = Utc::now();
            let mut stmt = tx
                .prepare(
                    "INSERT INTO attachments
                        (id, task_id, storage_path, mime_type, size_bytes, original_name, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                )
                .to_db()?;
            for file in files {
                stmt.execute(params![
                    file.id,
                    task_id,
                    file.storage_path,
                    file.mime_type,
                    file.size_bytes,
                    file.original_name,
                    now,
                ])
                .to_db()?;
            }
            load_task(tx, task_id)
        })
    }

    pub fn remove_attachment_sync(
        &self,
        task_id: &str,
        attachment_id: &str,
    ) -> Result<Task, DbError> {
        self.with_tx(|tx| {
            let removed = tx
                .execute(
                    "DELETE FROM attachments WHERE id = ?1 AND task_id = ?2",
                    params![attachment_id, task_id],
                )
                .to_db()?;
            if removed == 0 {
                if !task_exists(tx, task_id)? {
                    return Err(DbError::NotFound(format!("task {task_id}")));
                }
                return Err(DbError::NotFound(format!(
                    "attachment {attachment_id} on task {task_id}"
                )));
            }
            load_task(tx, task_id)
        })
    }
}
