use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use kanban_core::attachment::{sanitize_filename, Attachment, NewAttachment, UploadFile};
use kanban_core::column::{Column, CreateColumn};
use kanban_core::id::{check_id, new_id};
use kanban_core::task::{CreateTask, Task};
use kanban_core::KanbanError;
use kanban_db::{Database, DbError};
use kanban_store::{task_attachment_key, ObjectStore, StoreError};
use tracing::{debug, error, info, warn};

use crate::locks::TaskLocks;
use crate::{BoardService, ServiceError};

/// Board service backed by a database and a blob store held in-process.
///
/// Mutations that touch a task's attachments, or its column, hold that
/// task's lock for their whole duration.
pub struct LocalService {
    db: Arc<dyn Database>,
    store: Arc<dyn ObjectStore>,
    locks: TaskLocks,
}

impl LocalService {
    pub fn new(db: Arc<dyn Database>, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            db,
            store,
            locks: TaskLocks::default(),
        }
    }

    /// Fetch an attachment's record and its bytes, for static serving.
    pub async fn read_file(
        &self,
        task_id: &str,
        file_id: &str,
    ) -> Result<(Attachment, Bytes), ServiceError> {
        check_id("task", task_id)?;
        check_id("file", file_id)?;
        let task = self.db.get_task(task_id).await?;
        let attachment = task
            .attachment(file_id)
            .cloned()
            .ok_or_else(|| missing_file(task_id, file_id))?;
        // A concurrent delete may drop the blob between the lookup and the read.
        let data = match self.store.get(&attachment.storage_path).await {
            Ok(data) => data,
            Err(StoreError::NotFound(_)) => return Err(missing_file(task_id, file_id)),
            Err(e) => return Err(storage("read", &attachment.storage_path, e)),
        };
        Ok((attachment, data))
    }

    /// Write each upload to the store, recording every key written in
    /// `written` so the caller can undo them.
    async fn write_blobs(
        &self,
        task_id: &str,
        files: Vec<UploadFile>,
        written: &mut Vec<String>,
    ) -> Result<Vec<NewAttachment>, ServiceError> {
        let mut records = Vec::with_capacity(files.len());
        for file in files {
            let size_bytes = i64::try_from(file.data.len()).map_err(|_| {
                ServiceError::Validation(format!("{} is too large", file.original_name))
            })?;
            let id = new_id();
            let key = task_attachment_key(task_id, &id, &sanitize_filename(&file.original_name));
            self.store
                .put(&key, file.data)
                .await
                .map_err(|e| storage("write", &key, e))?;
            written.push(key.clone());
            records.push(NewAttachment {
                id,
                storage_path: key,
                mime_type: file.mime_type,
                size_bytes,
                original_name: file.original_name,
            });
        }
        Ok(records)
    }

    /// Best-effort removal of blobs from an aborted upload.
    async fn discard_blobs(&self, keys: &[String]) {
        for key in keys {
            if let Err(e) = self.store.delete(key).await {
                error!(key = %key, "orphaned blob after aborted upload: {e}");
            }
        }
    }
}

impl From<KanbanError> for ServiceError {
    fn from(e: KanbanError) -> Self {
        match e {
            KanbanError::Validation(msg) => ServiceError::Validation(msg),
            KanbanError::InvalidReference(msg) => ServiceError::InvalidReference(msg),
        }
    }
}

impl From<DbError> for ServiceError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound(msg) => ServiceError::NotFound(msg),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

fn storage(op: &str, key: &str, e: StoreError) -> ServiceError {
    ServiceError::Storage(format!("{op} {key}: {e}"))
}

fn missing_file(task_id: &str, file_id: &str) -> ServiceError {
    ServiceError::NotFound(format!("file {file_id} on task {task_id}"))
}

#[async_trait]
impl BoardService for LocalService {
    async fn create_column(&self, input: &CreateColumn) -> Result<Column, ServiceError> {
        input.validate()?;
        let column = self.db.create_column(input).await?;
        info!(column_id = %column.id, name = %column.name, "created column");
        Ok(column)
    }

    async fn list_columns(&self) -> Result<Vec<Column>, ServiceError> {
        Ok(self.db.list_columns().await?)
    }

    async fn create_task(&self, input: &CreateTask) -> Result<Task, ServiceError> {
        check_id("column", &input.column_id)?;
        self.db.get_column(&input.column_id).await?;
        input.check_content()?;
        let task = self.db.create_task(input).await?;
        info!(task_id = %task.id, column_id = %task.column_id, "created task");
        Ok(task)
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, ServiceError> {
        Ok(self.db.list_tasks().await?)
    }

    async fn get_task(&self, id: &str) -> Result<Task, ServiceError> {
        check_id("task", id)?;
        Ok(self.db.get_task(id).await?)
    }

    async fn move_task(&self, id: &str, column_id: &str) -> Result<Task, ServiceError> {
        check_id("task", id)?;
        check_id("column", column_id)?;
        let _guard = self.locks.lock(id).await;
        let task = self.db.get_task(id).await?;
        self.db.get_column(column_id).await?;
        if task.column_id == column_id {
            return Ok(task);
        }
        let moved = self.db.set_task_column(id, column_id).await?;
        info!(task_id = id, from = %task.column_id, to = column_id, "moved task");
        Ok(moved)
    }

    async fn upload_files(
        &self,
        task_id: &str,
        files: Vec<UploadFile>,
    ) -> Result<Task, ServiceError> {
        check_id("task", task_id)?;
        let _guard = self.locks.lock(task_id).await;
        let task = self.db.get_task(task_id).await?;
        if files.is_empty() {
            return Ok(task);
        }

        let mut written = Vec::with_capacity(files.len());
        let records = match self.write_blobs(task_id, files, &mut written).await {
            Ok(records) => records,
            Err(e) => {
                warn!(task_id, written = written.len(), "upload aborted: {e}");
                self.discard_blobs(&written).await;
                return Err(e);
            }
        };

        match self.db.append_attachments(task_id, &records).await {
            Ok(task) => {
                info!(task_id, count = records.len(), "attached files");
                Ok(task)
            }
            Err(e) => {
                warn!(task_id, "recording attachments failed: {e}");
                self.discard_blobs(&written).await;
                Err(e.into())
            }
        }
    }

    async fn delete_file(
        &self,
        task_id: &str,
        file_id: &str,
        file_name: &str,
    ) -> Result<Task, ServiceError> {
        check_id("task", task_id)?;
        check_id("file", file_id)?;
        let _guard = self.locks.lock(task_id).await;
        let task = self.db.get_task(task_id).await?;
        let attachment = task
            .attachment(file_id)
            .ok_or_else(|| missing_file(task_id, file_id))?;
        if attachment.original_name != file_name {
            return Err(ServiceError::Validation(format!(
                "file {file_id} is named {:?}, not {file_name:?}",
                attachment.original_name
            )));
        }
        let key = attachment.storage_path.clone();

        // Blob goes first; the record is only dropped once that is confirmed.
        let retained = self
            .store
            .get(&key)
            .await
            .map_err(|e| storage("read", &key, e))?;
        self.store
            .delete(&key)
            .await
            .map_err(|e| storage("delete", &key, e))?;

        match self.db.remove_attachment(task_id, file_id).await {
            Ok(task) => {
                info!(task_id, file_id, "deleted file");
                Ok(task)
            }
            Err(e) => {
                match self.store.put(&key, retained).await {
                    Ok(()) => debug!(key = %key, "restored blob after failed record removal"),
                    Err(restore) => error!(
                        key = %key,
                        "record for {file_id} kept but its blob is gone: {restore}"
                    ),
                }
                Err(e.into())
            }
        }
    }
}
