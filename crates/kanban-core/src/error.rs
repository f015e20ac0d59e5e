use thiserror::Error;

/// Input faults detected before any repository is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KanbanError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("invalid reference: {0}")]
    InvalidReference(String),
}
