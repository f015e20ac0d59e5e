use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::{ObjectStore, StoreConfig, StoreError};

pub struct LocalStore {
    base_dir: PathBuf,
}

impl LocalStore {
    pub fn new(config: &StoreConfig) -> Self {
        let base_dir = config
            .local_data_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| crate::default_data_dir().join("uploads"));
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Map a key onto the base directory. Keys must be relative and may not
    /// climb out of the base directory.
    fn resolve(&self, key: &str) -> Result<PathBuf, StoreError> {
        let rel = Path::new(key);
        let escapes = rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if key.is_empty() || escapes {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.base_dir.join(rel))
    }

    /// Remove now-empty directories between `path` and the top-level
    /// directory it lives in. Top-level directories are shared across tasks
    /// and are left in place.
    async fn prune_empty_parents(&self, path: &Path) {
        let mut current = path.parent();
        while let Some(dir) = current {
            let parent = match dir.parent() {
                Some(p) => p,
                None => break,
            };
            if parent == self.base_dir.as_path() || !parent.starts_with(&self.base_dir) {
                break;
            }
            // Fails on a non-empty directory, which ends the walk.
            if tokio::fs::remove_dir(dir).await.is_err() {
                break;
            }
            current = dir.parent();
        }
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    async fn put(&self, key: &str, data: Bytes) -> Result<(), StoreError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Internal(format!("mkdir: {e}")))?;
        }
        tokio::fs::write(&path, &data)
            .await
            .map_err(|e| StoreError::Internal(format!("write {}: {e}", path.display())))?;
        debug!(key, bytes = data.len(), "stored blob");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Bytes, StoreError> {
        let path = self.resolve(key)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(key.to_string()))
            }
            Err(e) => Err(StoreError::Internal(format!(
                "read {}: {e}",
                path.display()
            ))),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(key, "deleted blob");
                self.prune_empty_parents(&path).await;
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(key.to_string()))
            }
            Err(e) => Err(StoreError::Internal(format!(
                "delete {}: {e}",
                path.display()
            ))),
        }
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let dir = self.resolve(prefix)?;
        if !dir.exists() {
            return Ok(vec![]);
        }
        let mut keys = Vec::new();
        let mut stack = vec![dir];
        while let Some(current) = stack.pop() {
            let mut entries = match tokio::fs::read_dir(&current).await {
                Ok(e) => e,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(StoreError::Internal(format!(
                        "list {}: {e}",
                        current.display()
                    )))
                }
            };
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| StoreError::Internal(format!("read_dir entry: {e}")))?
            {
                let path = entry.path();
                let ft = entry
                    .file_type()
                    .await
                    .map_err(|e| StoreError::Internal(format!("file_type: {e}")))?;
                if ft.is_dir() {
                    stack.push(path);
                } else if let Ok(rel) = path.strip_prefix(&self.base_dir) {
                    keys.push(rel.to_string_lossy().replace('\\', "/"));
                }
            }
        }
        keys.sort();
        Ok(keys)
    }

}

impl LocalStore {
    pub async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let path = self.resolve(key)?;
        match tokio::fs::try_exists(&path).await {
            Ok(exists) => Ok(exists),
            Err(e) => Err(StoreError::Internal(format!(
                "exists {}: {e}",
                path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store(dir: &std::path::Path) -> LocalStore {
        let config = StoreConfig {
            local_data_dir: Some(dir.to_string_lossy().to_string()),
        };
        LocalStore::new(&config)
    }

    #[tokio::test]
    async fn put_then_get_returns_bytes() {
        let tmp = tempfile::tempdir().unwrap();
        let store = test_store(tmp.path());

        store
            .put("tasks/abc/attachments/1/a.txt", Bytes::from("hello world"))
            .await
            .unwrap();
        let data = store.get("tasks/abc/attachments/1/a.txt").await.unwrap();
        assert_eq!(data.as_ref(), b"hello world");
    }

    #[tokio::test]
    async fn get_missing_returns_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let store = test_store(tmp.path());

        let err = store.get("nonexistent/key").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_removes_object_and_empty_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let store = test_store(tmp.path());

        store
            .put("tasks/t1/attachments/a1/a.txt", Bytes::from("data"))
            .await
            .unwrap();
        assert!(tmp.path().join("tasks/t1/attachments/a1/a.txt").is_file());

        store.delete("tasks/t1/attachments/a1/a.txt").await.unwrap();
        assert!(matches!(
            store.get("tasks/t1/attachments/a1/a.txt").await,
            Err(StoreError::NotFound(_))
        ));
        assert!(!tmp.path().join("tasks/t1").exists());
        assert!(tmp.path().join("tasks").is_dir());
    }

    #[tokio::test]
    async fn delete_keeps_sibling_blobs() {
        let tmp = tempfile::tempdir().unwrap();
        let store = test_store(tmp.path());

        store.put("tasks/t1/attachments/a1/a.txt", Bytes::from("1")).await.unwrap();
        store.put("tasks/t1/attachments/a2/a.txt", Bytes::from("2")).await.unwrap();

        store.delete("tasks/t1/attachments/a1/a.txt").await.unwrap();
        assert_eq!(
            store.list("tasks/t1").await.unwrap(),
            vec!["tasks/t1/attachments/a2/a.txt".to_string()]
        );
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let store = test_store(tmp.path());

        let err = store.delete("nonexistent").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn keys_cannot_escape_base_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let store = test_store(&tmp.path().join("uploads"));

        for key in ["../outside.txt", "tasks/../../x", "/etc/passwd", ""] {
            let err = store.put(key, Bytes::from("x")).await.unwrap_err();
            assert!(matches!(err, StoreError::InvalidKey(_)), "{key}");
        }
        assert!(!tmp.path().join("outside.txt").exists());
    }

    #[tokio::test]
    async fn list_returns_keys_with_prefix() {
        let tmp = tempfile::tempdir().unwrap();
        let store = test_store(tmp.path());

        store.put("tasks/a/attachments/1/x.png", Bytes::from("x")).await.unwrap();
        store.put("tasks/a/attachments/2/y.png", Bytes::from("y")).await.unwrap();
        store.put("tasks/b/attachments/3/z.png", Bytes::from("z")).await.unwrap();

        let keys = store.list("tasks/a").await.unwrap();
        assert_eq!(
            keys,
            vec![
                "tasks/a/attachments/1/x.png".to_string(),
                "tasks/a/attachments/2/y.png".to_string(),
            ]
        );
        assert_eq!(store.list("tasks").await.unwrap().len(), 3);
        assert!(store.list("nonexistent").await.unwrap().is_empty());
    }
}
