//! The board's id space: UUID v4, rendered as a lowercase hyphenated string.

use uuid::Uuid;

use crate::KanbanError;

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Reject identifiers that cannot belong to the id space.
///
/// `kind` names the entity ("task", "column", "file") in the error message.
pub fn check_id(kind: &str, raw: &str) -> Result<(), KanbanError> {
    Uuid::parse_str(raw)
        .map(|_| ())
        .map_err(|_| KanbanError::InvalidReference(format!("invalid {kind} id: {raw:?}")))
}
