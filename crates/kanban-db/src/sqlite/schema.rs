use rusqlite::Connection;

use super::SqliteResultExt;
use crate::DbError;

/// Create the board tables if they are missing. Safe to run on every open.
pub(crate) fn apply(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS columns (
            id          TEXT PRIMARY KEY,
            name        TEXT NOT NULL CHECK(length(trim(name)) > 0),
            color       TEXT NOT NULL DEFAULT '',
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS tasks (
            id              TEXT PRIMARY KEY,
            column_id       TEXT NOT NULL REFERENCES columns(id),
            content         TEXT NOT NULL CHECK(length(trim(content)) > 0),
            client_photo    TEXT,
            client_name     TEXT,
            assignee_photo  TEXT,
            assignee_name   TEXT,
            created_at      TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_tasks_column ON tasks(column_id);

        CREATE TABLE IF NOT EXISTS attachments (
            id             TEXT PRIMARY KEY,
            task_id        TEXT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
            storage_path   TEXT NOT NULL UNIQUE,
            mime_type      TEXT NOT NULL,
            size_bytes     INTEGER NOT NULL CHECK(size_bytes >= 0),
            original_name  TEXT NOT NULL,
            created_at     TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_attachments_task ON attachments(task_id);
        ",
    )
    .to_db()
}
