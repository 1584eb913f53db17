use chrono::Utc;

use super::model::{CreateTaskPayload, Task, UpdateTaskPayload};
use super::store::TaskStore;
use crate::error::ApiError;

/// All tasks owned by the caller, creation order ascending (pure domain
/// logic, no HTTP). An owner with no tasks gets an empty list, not an error.
pub async fn list_tasks(store: &dyn TaskStore, owner_id: &str) -> Result<Vec<Task>, ApiError> {
    store.list_for_owner(owner_id).await
}

/// Create a new task for the caller
pub async fn create_task(
    store: &dyn TaskStore,
    owner_id: &str,
    payload: CreateTaskPayload,
) -> Result<Task, ApiError> {
    validate_description(&payload.description)?;

    let now = Utc::now();
    let task = Task {
        id: uuid::Uuid::new_v4().to_string(),
        owner_id: owner_id.to_string(),
        description: payload.description,
        due_date: payload.due_date,
        created_at: now,
        updated_at: now,
    };

    store.put(&task).await?;
    Ok(task)
}

/// Get a specific task, used to pre-populate an edit view
pub async fn get_task(
    store: &dyn TaskStore,
    owner_id: &str,
    task_id: &str,
) -> Result<Task, ApiError> {
    fetch_owned(store, owner_id, task_id).await
}

/// Update a task. Omitted fields are left unchanged; present fields
/// overwrite, and an explicit null due date clears it. The merged record is
/// committed with a single write, so no partial update can land.
pub async fn update_task(
    store: &dyn TaskStore,
    owner_id: &str,
    task_id: &str,
    payload: UpdateTaskPayload,
) -> Result<Task, ApiError> {
    let mut task = fetch_owned(store, owner_id, task_id).await?;

    if let Some(description) = payload.description {
        validate_description(&description)?;
        task.description = description;
    }

    if let Some(due_date) = payload.due_date {
        task.due_date = due_date;
    }

    task.updated_at = Utc::now();
    store.put(&task).await?;
    Ok(task)
}

/// Delete a task permanently
pub async fn delete_task(
    store: &dyn TaskStore,
    owner_id: &str,
    task_id: &str,
) -> Result<(), ApiError> {
    fetch_owned(store, owner_id, task_id).await?;
    store.delete(task_id).await
}

/// NotFound when the id is unknown anywhere, Forbidden when the task exists
/// under a different owner
async fn fetch_owned(
    store: &dyn TaskStore,
    owner_id: &str,
    task_id: &str,
) -> Result<Task, ApiError> {
    let task = store.get(task_id).await?.ok_or(ApiError::NotFound)?;
    if task.owner_id != owner_id {
        return Err(ApiError::Forbidden);
    }
    Ok(task)
}

fn validate_description(description: &str) -> Result<(), ApiError> {
    if description.trim().is_empty() {
        return Err(ApiError::Validation(
            "description must not be empty".to_string(),
        ));
    }
    Ok(())
}
