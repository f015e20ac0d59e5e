mod local;

pub use local::LocalStore;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("store error: {0}")]
    Internal(String),
}

/// A store for opaque blobs keyed by string paths.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write (create or overwrite) an object.
    async fn put(&self, key: &str, data: Bytes) -> Result<(), StoreError>;

    /// Read an object. Returns `StoreError::NotFound` if absent.
    async fn get(&self, key: &str) -> Result<Bytes, StoreError>;

    /// Delete an object. Returns `StoreError::NotFound` if absent, so callers
    /// can tell a confirmed removal from a missing blob.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// List object keys under a prefix.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError>;
}

// -- Key helpers --

pub fn task_prefix(task_id: &str) -> String {
    format!("tasks/{task_id}")
}

/// Attachment blobs are qualified by their own id, so two uploads that share
/// a filename never land on the same key.
pub fn task_attachment_key(task_id: &str, attachment_id: &str, filename: &str) -> String {
    format!("tasks/{task_id}/attachments/{attachment_id}/{filename}")
}

// -- Configuration --

/// Configuration for the object store backend.
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    /// Local filesystem base directory. Defaults to `<data dir>/uploads`.
    pub local_data_dir: Option<String>,
}

/// Platform data directory for the board, shared with the db crate's default.
pub fn default_data_dir() -> PathBuf {
    let base = if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg)
    } else if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home).join(".local/share")
    } else {
        PathBuf::from(".")
    };
    base.join("kanban")
}

// -- Factory --

/// Create an `ObjectStore` from configuration.
pub fn create_store(config: &StoreConfig) -> Result<Arc<dyn ObjectStore>, StoreError> {
    let store = LocalStore::new(config);
    std::fs::create_dir_all(store.base_dir()).map_err(|e| {
        StoreError::Internal(format!("mkdir {}: {e}", store.base_dir().display()))
    })?;
    Ok(Arc::new(store))
}
