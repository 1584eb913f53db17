// ========== TASK ==========
pub use tasknest_atoms::tasks::model::{CreateTaskPayload, Task, TaskListResponse, UpdateTaskPayload};

// ========== ERRORS ==========
pub use tasknest_atoms::error::ApiError;
