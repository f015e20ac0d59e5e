use serde::{Deserialize, Serialize};

use crate::KanbanError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: String,
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateColumn {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: String,
}

impl CreateColumn {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
        }
    }

    pub fn validate(&self) -> Result<(), KanbanError> {
        if self.name.trim().is_empty() {
            return Err(KanbanError::Validation(
                "name is required for a column".into(),
            ));
        }
        Ok(())
    }
}
