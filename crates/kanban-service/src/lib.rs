mod http;
mod local;
mod locks;
mod traits;

pub use http::HttpService;
pub use local::LocalService;
pub use traits::{BoardService, ServiceError};
