use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

const FALLBACK_FILENAME: &str = "file";

/// Metadata for one blob uploaded against a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    pub task_id: String,
    pub storage_path: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub original_name: String,
    pub created_at: DateTime<Utc>,
}

/// A record ready to be appended to a task once its blob is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttachment {
    pub id: String,
    pub storage_path: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub original_name: String,
}

/// Raw upload as received at the boundary.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub original_name: String,
    pub mime_type: String,
    pub data: Bytes,
}

impl UploadFile {
    pub fn new(
        original_name: impl Into<String>,
        mime_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        let original_name = original_name.into();
        let mime_type = mime_type.into();
        Self {
            original_name: if original_name.trim().is_empty() {
                FALLBACK_FILENAME.to_string()
            } else {
                original_name
            },
            mime_type: if mime_type.trim().is_empty() {
                DEFAULT_MIME_TYPE.to_string()
            } else {
                mime_type
            },
            data: data.into(),
        }
    }
}

/// Reduce a client-supplied filename to a single safe path component.
///
/// Only the last `/` or `\` separated segment survives. Anything outside
/// `[A-Za-z0-9._-]` becomes `_`.
pub fn sanitize_filename(name: &str) -> String {
    let last = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = last
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    match cleaned.as_str() {
        "" | "." | ".." => FALLBACK_FILENAME.to_string(),
        _ => cleaned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_keeps_plain_names() {
        assert_eq!(sanitize_filename("a.txt"), "a.txt");
        assert_eq!(sanitize_filename("report-2024_v2.pdf"), "report-2024_v2.pdf");
    }

    #[test]
    fn sanitize_strips_directories() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\me\\photo.png"), "photo.png");
        assert_eq!(sanitize_filename("dir/"), "file");
    }

    #[test]
    fn sanitize_replaces_unsafe_characters() {
        assert_eq!(sanitize_filename("my file (1).txt"), "my_file__1_.txt");
        assert_eq!(sanitize_filename("résumé.doc"), "r_sum_.doc");
    }

    #[test]
    fn sanitize_never_returns_dot_segments() {
        assert_eq!(sanitize_filename(".."), "file");
        assert_eq!(sanitize_filename("."), "file");
        assert_eq!(sanitize_filename(""), "file");
    }

    #[test]
    fn upload_file_fills_defaults() {
        let file = UploadFile::new("", "", b"hello".to_vec());
        assert_eq!(file.original_name, "file");
        assert_eq!(file.mime_type, DEFAULT_MIME_TYPE);
        assert_eq!(file.data.len(), 5);

        let file = UploadFile::new("a.txt", "text/plain", "hello");
        assert_eq!(file.original_name, "a.txt");
        assert_eq!(file.mime_type, "text/plain");
    }
}
