use async_trait::async_trait;
use kanban_core::attachment::UploadFile;
use kanban_core::column::{Column, CreateColumn};
use kanban_core::task::{CreateTask, Task};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("invalid reference: {0}")]
    InvalidReference(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Operations on the board.
///
/// `LocalService` owns the database and blob store directly and enforces the
/// cross-entity rules. `HttpService` speaks to a running kanban-server.
#[async_trait]
pub trait BoardService: Send + Sync {
    // -- Columns --
    async fn create_column(&self, input: &CreateColumn) -> Result<Column, ServiceError>;
    async fn list_columns(&self) -> Result<Vec<Column>, ServiceError>;

    // -- Tasks --
    async fn create_task(&self, input: &CreateTask) -> Result<Task, ServiceError>;
    async fn list_tasks(&self) -> Result<Vec<Task>, ServiceError>;
    async fn get_task(&self, id: &str) -> Result<Task, ServiceError>;
    async fn move_task(&self, id: &str, column_id: &str) -> Result<Task, ServiceError>;

    // -- Attachments --
    async fn upload_files(
        &self,
        task_id: &str,
        files: Vec<UploadFile>,
    ) -> Result<Task, ServiceError>;
    async fn delete_file(
        &self,
        task_id: &str,
        file_id: &str,
        file_name: &str,
    ) -> Result<Task, ServiceError>;
}
