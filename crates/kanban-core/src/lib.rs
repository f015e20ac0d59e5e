pub mod attachment;
pub mod column;
pub mod error;
pub mod id;
pub mod task;

pub use attachment::{Attachment, NewAttachment, UploadFile};
pub use column::{Column, CreateColumn};
pub use error::KanbanError;
pub use task::{CreateTask, Task, TaskListing, TaskMetadata};
