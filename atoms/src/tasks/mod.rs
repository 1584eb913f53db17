// Re-export model types, storage and service functions
pub mod http;
pub mod model;
pub mod service;
pub mod store;

pub use model::{CreateTaskPayload, Task, TaskListResponse, UpdateTaskPayload};
pub use store::{DynamoTaskStore, MemoryTaskStore, TaskStore};
pub use http::*;
pub use service::*;
