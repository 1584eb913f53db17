use lambda_http::{http::StatusCode, Body, Error, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::model::{CreateTaskPayload, TaskListResponse, UpdateTaskPayload};
use super::service;
use super::store::TaskStore;
use crate::error::ApiError;

/// List all tasks owned by the caller
pub async fn list_tasks_handler(
    store: &dyn TaskStore,
    owner_id: &str,
) -> Result<Response<Body>, Error> {
    match service::list_tasks(store, owner_id).await {
        Ok(tasks) => json_response(StatusCode::OK, &TaskListResponse { tasks }),
        Err(err) => err.to_response(),
    }
}

/// Create a task from the request body
pub async fn create_task_handler(
    store: &dyn TaskStore,
    owner_id: &str,
    body: &Body,
) -> Result<Response<Body>, Error> {
    let payload: CreateTaskPayload = match parse_body(body) {
        Ok(payload) => payload,
        Err(err) => return err.to_response(),
    };

    match service::create_task(store, owner_id, payload).await {
        Ok(task) => json_response(StatusCode::CREATED, &task),
        Err(err) => err.to_response(),
    }
}

/// Get a single task by id
pub async fn get_task_handler(
    store: &dyn TaskStore,
    owner_id: &str,
    task_id: &str,
) -> Result<Response<Body>, Error> {
    match service::get_task(store, owner_id, task_id).await {
        Ok(task) => json_response(StatusCode::OK, &task),
        Err(err) => err.to_response(),
    }
}

/// Update description and/or due date of a task
pub async fn update_task_handler(
    store: &dyn TaskStore,
    owner_id: &str,
    task_id: &str,
    body: &Body,
) -> Result<Response<Body>, Error> {
    let payload: UpdateTaskPayload = match parse_body(body) {
        Ok(payload) => payload,
        Err(err) => return err.to_response(),
    };

    match service::update_task(store, owner_id, task_id, payload).await {
        Ok(task) => json_response(StatusCode::OK, &task),
        Err(err) => err.to_response(),
    }
}

/// Delete a task; acknowledges with no content
pub async fn delete_task_handler(
    store: &dyn TaskStore,
    owner_id: &str,
    task_id: &str,
) -> Result<Response<Body>, Error> {
    match service::delete_task(store, owner_id, task_id).await {
        Ok(()) => Ok(Response::builder()
            .status(StatusCode::NO_CONTENT)
            .header("Access-Control-Allow-Origin", "*")
            .body(Body::Empty)
            .map_err(Box::new)?),
        Err(err) => err.to_response(),
    }
}

fn parse_body<T: DeserializeOwned>(body: &Body) -> Result<T, ApiError> {
    let bytes: &[u8] = match body {
        Body::Text(text) => text.as_bytes(),
        Body::Binary(bytes) => bytes.as_slice(),
        Body::Empty => &[],
    };

    serde_json::from_slice(bytes)
        .map_err(|e| ApiError::Validation(format!("invalid request body: {}", e)))
}

fn json_response<T: Serialize>(status: StatusCode, value: &T) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(serde_json::to_string(value)?.into())
        .map_err(Box::new)?)
}
