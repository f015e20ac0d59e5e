use async_trait::async_trait;
use kanban_core::attachment::UploadFile;
use kanban_core::column::{Column, CreateColumn};
use kanban_core::task::{CreateTask, Task, TaskListing};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode, Url};

use crate::{BoardService, ServiceError};

/// Async HTTP client implementation of BoardService.
/// Connects to a running kanban-server.
pub struct HttpService {
    base_url: String,
    client: Client,
}

impl HttpService {
    pub fn new(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            base_url,
            client: Client::new(),
        }
    }

    /// Check if the server is reachable.
    pub async fn health_check(&self) -> Result<(), ServiceError> {
        let resp = self
            .client
            .get(self.url(&["api", "health"])?)
            .send()
            .await
            .map_err(|e| ServiceError::Internal(format!("connection failed: {e}")))?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(ServiceError::Internal(format!(
                "health check failed: {}",
                resp.status()
            )))
        }
    }

    /// Task listing as the board renders it, including display dates.
    pub async fn list_task_cards(&self) -> Result<Vec<TaskListing>, ServiceError> {
        self.get_json(self.url(&["api", "tasks"])?).await
    }

    /// Download the bytes behind an attachment's storage path.
    pub async fn download(&self, storage_path: &str) -> Result<Vec<u8>, ServiceError> {
        let mut segments = vec!["uploads"];
        segments.extend(storage_path.split('/'));
        let resp = self
            .client
            .get(self.url(&segments)?)
            .send()
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        let status = resp.status();
        if status.is_success() {
            resp.bytes()
                .await
                .map(|b| b.to_vec())
                .map_err(|e| ServiceError::Internal(format!("read body: {e}")))
        } else {
            Err(parse_error_with_status(status, resp).await)
        }
    }

    /// Build a URL from path segments, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Result<Url, ServiceError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ServiceError::Internal(format!("bad base url {}: {e}", self.base_url)))?;
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                ServiceError::Internal(format!("bad base url {}", self.base_url))
            })?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, ServiceError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        handle_response(resp).await
    }

    async fn post_json<B: serde::Serialize, T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, ServiceError> {
        let resp = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        handle_response(resp).await
    }
}

async fn handle_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ServiceError> {
    let status = resp.status();
    if status.is_success() {
        resp.json::<T>()
            .await
            .map_err(|e| ServiceError::Internal(format!("json decode: {e}")))
    } else {
        Err(parse_error_with_status(status, resp).await)
    }
}

/// Turn an error response back into the error kind the server reported.
async fn parse_error_with_status(status: StatusCode, resp: reqwest::Response) -> ServiceError {
    let body = resp.text().await.unwrap_or_default();
    let msg = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v["error"].as_str().map(String::from))
        .unwrap_or(body);
    error_from_status(status, msg)
}

fn error_from_status(status: StatusCode, msg: String) -> ServiceError {
    let rest = |prefix: &str| msg.strip_prefix(prefix).map(String::from);
    match status {
        StatusCode::NOT_FOUND => {
            ServiceError::NotFound(rest("not found: ").unwrap_or_else(|| msg.clone()))
        }
        StatusCode::BAD_REQUEST => match rest("invalid reference: ") {
            Some(m) => ServiceError::InvalidReference(m),
            None => {
                ServiceError::Validation(rest("validation error: ").unwrap_or_else(|| msg.clone()))
            }
        },
        s if s.is_server_error() => match rest("storage error: ") {
            Some(m) => ServiceError::Storage(m),
            None => ServiceError::Internal(rest("internal error: ").unwrap_or_else(|| msg.clone())),
        },
        _ => ServiceError::Internal(format!("{status}: {msg}")),
    }
}

#[async_trait]
impl BoardService for HttpService {
    async fn create_column(&self, input: &CreateColumn) -> Result<Column, ServiceError> {
        self.post_json(self.url(&["api", "columns"])?, input).await
    }

    async fn list_columns(&self) -> Result<Vec<Column>, ServiceError> {
        self.get_json(self.url(&["api", "columns"])?).await
    }

    async fn create_task(&self, input: &CreateTask) -> Result<Task, ServiceError> {
        self.post_json(self.url(&["api", "tasks"])?, input).await
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, ServiceError> {
        let cards = self.list_task_cards().await?;
        Ok(cards.into_iter().map(|card| card.task).collect())
    }

    async fn get_task(&self, id: &str) -> Result<Task, ServiceError> {
        self.get_json(self.url(&["api", "tasks", id])?).await
    }

    async fn move_task(&self, id: &str, column_id: &str) -> Result<Task, ServiceError> {
        let resp = self
            .client
            .put(self.url(&["api", "tasks", id, "column", column_id])?)
            .send()
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        handle_response(resp).await
    }

    async fn upload_files(
        &self,
        task_id: &str,
        files: Vec<UploadFile>,
    ) -> Result<Task, ServiceError> {
        let mut form = Form::new();
        for file in files {
            let part = Part::bytes(file.data.to_vec())
                .file_name(file.original_name)
                .mime_str(&file.mime_type)
                .map_err(|e| {
                    ServiceError::Validation(format!("mime type {:?}: {e}", file.mime_type))
                })?;
            form = form.part("files", part);
        }
        let resp = self
            .client
            .post(self.url(&["api", "tasks", task_id, "upload"])?)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        handle_response(resp).await
    }

    async fn delete_file(
        &self,
        task_id: &str,
        file_id: &str,
        file_name: &str,
    ) -> Result<Task, ServiceError> {
        let resp = self
            .client
            .delete(self.url(&["api", "tasks", task_id, "file", file_id, file_name])?)
            .send()
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        handle_response(resp).await
    }
}
