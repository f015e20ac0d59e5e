pub mod sqlite;

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use kanban_core::attachment::NewAttachment;
use kanban_core::column::{Column, CreateColumn};
use kanban_core::task::{CreateTask, Task};

pub use sqlite::SqliteDatabase;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Internal(String),
}

/// Where the board database lives.
#[derive(Debug, Clone, Default)]
pub struct DbConfig {
    /// Path to the SQLite file. Defaults to `<data dir>/kanban.db`.
    pub sqlite_path: Option<String>,
}

/// Persistence for columns and tasks.
///
/// Tasks are always returned with their attachments, in upload order.
/// Repositories do not validate references across entities beyond what the
/// schema enforces; that is the board service's job.
#[async_trait]
pub trait Database: Send + Sync {
    // -- Columns --
    async fn create_column(&self, input: &CreateColumn) -> Result<Column, DbError>;
    async fn get_column(&self, id: &str) -> Result<Column, DbError>;
    async fn list_columns(&self) -> Result<Vec<Column>, DbError>;

    // -- Tasks --
    async fn create_task(&self, input: &CreateTask) -> Result<Task, DbError>;
    async fn get_task(&self, id: &str) -> Result<Task, DbError>;
    async fn list_tasks(&self) -> Result<Vec<Task>, DbError>;
    async fn set_task_column(&self, id: &str, column_id: &str) -> Result<Task, DbError>;

    // -- Attachments --
    /// Append all records in one transaction, or none of them.
    async fn append_attachments(
        &self,
        task_id: &str,
        files: &[NewAttachment],
    ) -> Result<Task, DbError>;
    async fn remove_attachment(&self, task_id: &str, attachment_id: &str)
        -> Result<Task, DbError>;
}

pub fn data_dir() -> PathBuf {
    let base = if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg)
    } else if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home).join(".local/share")
    } else {
        PathBuf::from(".")
    };
    base.join("kanban")
}
