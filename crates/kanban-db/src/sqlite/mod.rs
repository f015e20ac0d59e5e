mod queries;
mod schema;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{Connection, ErrorCode, Transaction};
use tracing::debug;

use kanban_core::attachment::NewAttachment;
use kanban_core::column::{Column, CreateColumn};
use kanban_core::task::{CreateTask, Task};

use crate::{Database, DbConfig, DbError};

/// Extension trait that converts `rusqlite::Result<T>` into `Result<T, DbError>`.
pub(crate) trait SqliteResultExt<T> {
    fn to_db(self) -> Result<T, DbError>;
}

impl<T> SqliteResultExt<T> for rusqlite::Result<T> {
    fn to_db(self) -> Result<T, DbError> {
        self.map_err(map_sqlite_err)
    }
}

#[derive(Clone)]
pub struct SqliteDatabase {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDatabase {
    pub fn open(config: &DbConfig) -> Result<Self, DbError> {
        let path = config
            .sqlite_path
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| crate::data_dir().join("kanban.db"));
        std::fs::create_dir_all(path.parent().unwrap_or(Path::new(".")))?;
        Self::open_path(&path)
    }

    pub fn open_path(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path).to_db()?;
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA foreign_keys=ON;
             PRAGMA busy_timeout=5000;",
        )
        .to_db()?;
        debug!(path = %path.display(), "opened sqlite database");
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory().to_db()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;").to_db()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, DbError> {
        schema::apply(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub(crate) fn with_conn<F, T>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&Connection) -> Result<T, DbError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|_| DbError::Internal("lock poisoned".into()))?;
        f(&conn)
    }

    /// Run `f` inside a transaction. Any error rolls the transaction back.
    pub(crate) fn with_tx<F, T>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T, DbError>,
    {
        let mut conn = self
            .conn
            .lock()
            .map_err(|_| DbError::Internal("lock poisoned".into()))?;
        let tx = conn.transaction().to_db()?;
        let out = f(&tx)?;
        tx.commit().to_db()?;
        Ok(out)
    }
}

/// Map a `rusqlite::Error` into a `DbError`.
pub(crate) fn map_sqlite_err(e: rusqlite::Error) -> DbError {
    match &e {
        rusqlite::Error::SqliteFailure(err, _) if err.code == ErrorCode::ConstraintViolation => {
            DbError::Constraint(e.to_string())
        }
        _ => DbError::Internal(e.to_string()),
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    // -- Columns --
    async fn create_column(&self, input: &CreateColumn) -> Result<Column, DbError> {
        let db = self.clone();
        let input = input.clone();
        tokio::task::spawn_blocking(move || db.create_column_sync(&input))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
    async fn get_column(&self, id: &str) -> Result<Column, DbError> {
        let db = self.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || db.get_column_sync(&id))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
    async fn list_columns(&self) -> Result<Vec<Column>, DbError> {
        let db = self.clone();
        tokio::task::spawn_blocking(move || db.list_columns_sync())
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }

    // -- Tasks --
    async fn create_task(&self, input: &CreateTask) -> Result<Task, DbError> {
        let db = self.clone();
        let input = input.clone();
        tokio::task::spawn_blocking(move || db.create_task_sync(&input))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
    async fn get_task(&self, id: &str) -> Result<Task, DbError> {
        let db = self.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || db.get_task_sync(&id))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
    async fn list_tasks(&self) -> Result<Vec<Task>, DbError> {
        let db = self.clone();
        tokio::task::spawn_blocking(move || db.list_tasks_sync())
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
    async fn set_task_column(&self, id: &str, column_id: &str) -> Result<Task, DbError> {
        let db = self.clone();
        let id = id.to_string();
        let column_id = column_id.to_string();
        tokio::task::spawn_blocking(move || db.set_task_column_sync(&id, &column_id))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }

    // -- Attachments --
    async fn append_attachments(
        &self,
        task_id: &str,
        files: &[NewAttachment],
    ) -> Result<Task, DbError> {
        let db = self.clone();
        let task_id = task_id.to_string();
        let files = files.to_vec();
        tokio::task::spawn_blocking(move || db.append_attachments_sync(&task_id, &files))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
    async fn remove_attachment(
        &self,
        task_id: &str,
        attachment_id: &str,
    ) -> Result<Task, DbError> {
        let db = self.clone();
        let task_id = task_id.to_string();
        let attachment_id = attachment_id.to_string();
        tokio::task::spawn_blocking(move || db.remove_attachment_sync(&task_id, &attachment_id))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_in_memory_returns_working_db() {
        let db = SqliteDatabase::open_in_memory().unwrap();
        db.with_conn(|conn| {
            let count: i64 = conn
                .query_row(
                    "SELECT count(*) FROM sqlite_master WHERE type = 'table'",
                    [],
                    |row| row.get(0),
                )
                .to_db()?;
            assert_eq!(count, 3);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn open_path_creates_file_and_reopens() {
        let tmp = tempfile::tempdir().unwrap();
        let db_path = tmp.path().join("test.db");
        assert!(!db_path.exists());

        let db = SqliteDatabase::open_path(&db_path).unwrap();
        db.create_column_sync(&CreateColumn::new("Todo", "#fff"))
            .unwrap();
        drop(db);
        assert!(db_path.exists());

        let reopened = SqliteDatabase::open_path(&db_path).unwrap();
        assert_eq!(reopened.list_columns_sync().unwrap().len(), 1);
    }

    #[test]
    fn open_with_config_creates_parent_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let db_path = tmp.path().join("nested/dir/board.db");
        let config = DbConfig {
            sqlite_path: Some(db_path.to_string_lossy().to_string()),
        };
        SqliteDatabase::open(&config).unwrap();
        assert!(db_path.exists());
    }

    #[test]
    fn failed_transaction_rolls_back() {
        let db = SqliteDatabase::open_in_memory().unwrap();
        let result: Result<(), DbError> = db.with_tx(|tx| {
            tx.execute(
                "INSERT INTO columns (id, name, color, created_at) VALUES ('c', 'n', '', '2026-01-01')",
                [],
            )
            .to_db()?;
            Err(DbError::Internal("boom".into()))
        });
        assert!(result.is_err());
        assert!(db.list_columns_sync().unwrap().is_empty());
    }
}
