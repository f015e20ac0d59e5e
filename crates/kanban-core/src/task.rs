use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::attachment::Attachment;
use crate::KanbanError;

/// People shown on a task card. All fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskMetadata {
    #[serde(default)]
    pub client_photo: Option<String>,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub assignee_photo: Option<String>,
    #[serde(default)]
    pub assignee_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub column_id: String,
    pub content: String,
    #[serde(flatten)]
    pub metadata: TaskMetadata,
    pub created_at: DateTime<Utc>,
    /// Attachments in upload order.
    #[serde(default)]
    pub files: Vec<Attachment>,
}

impl Task {
    pub fn attachment(&self, id: &str) -> Option<&Attachment> {
        self.files.iter().find(|f| f.id == id)
    }

    /// Creation date as `M/D/YYYY`.
    pub fn created_on(&self) -> String {
        self.created_at.format("%-m/%-d/%Y").to_string()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTask {
    #[serde(default, alias = "column")]
    pub column_id: String,
    #[serde(default)]
    pub content: String,
    #[serde(flatten)]
    pub metadata: TaskMetadata,
}

impl CreateTask {
    pub fn new(column_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            content: content.into(),
            metadata: TaskMetadata::default(),
        }
    }

    pub fn check_content(&self) -> Result<(), KanbanError> {
        if self.content.trim().is_empty() {
            return Err(KanbanError::Validation("content is required for a task".into()));
        }
        Ok(())
    }
}

/// A task as rendered by the board listing, with a display date alongside
/// the machine timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskListing {
    #[serde(flatten)]
    pub task: Task,
    pub created_on: String,
}

impl From<Task> for TaskListing {
    fn from(task: Task) -> Self {
        let created_on = task.created_on();
        Self { task, created_on }
    }
}
