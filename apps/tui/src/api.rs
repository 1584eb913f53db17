use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::Session;

/// Wire form of a task as served by the API; fields the client does not
/// render are ignored
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub description: String,
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct TaskListResponse {
    tasks: Vec<Task>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateTaskBody<'a> {
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    due_date: Option<DateTime<Utc>>,
}

/// Updates always carry the description alongside the due date, so this
/// client never clears a field it did not mean to touch
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateTaskBody<'a> {
    description: &'a str,
    due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Error)]
pub enum ClientError {
    /// Token missing or rejected; the session must be invalidated
    #[error("session expired, sign in again")]
    Unauthorized,

    #[error("server error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("network error: {0}")]
    Transport(String),
}

pub struct ApiClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: String) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            base_url,
        }
    }

    pub fn from_env() -> Self {
        let base_url =
            std::env::var("TASKNEST_API_URL").unwrap_or_else(|_| "http://localhost:9000".to_string());
        Self::new(base_url)
    }

    pub fn list_tasks(&self, session: &Session) -> Result<Vec<Task>, ClientError> {
        let resp = self.send(self.http.get(self.url("/tasks")), session)?;
        let parsed: TaskListResponse = resp
            .json()
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        Ok(parsed.tasks)
    }

    pub fn create_task(
        &self,
        session: &Session,
        description: &str,
        due_date: Option<DateTime<Utc>>,
    ) -> Result<Task, ClientError> {
        let resp = self.send(
            self.http.post(self.url("/tasks")).json(&CreateTaskBody {
                description,
                due_date,
            }),
            session,
        )?;
        resp.json().map_err(|e| ClientError::Transport(e.to_string()))
    }

    pub fn update_task(
        &self,
        session: &Session,
        task_id: &str,
        description: &str,
        due_date: Option<DateTime<Utc>>,
    ) -> Result<Task, ClientError> {
        let resp = self.send(
            self.http
                .put(self.url(&format!("/tasks/{}", task_id)))
                .json(&UpdateTaskBody {
                    description,
                    due_date,
                }),
            session,
        )?;
        resp.json().map_err(|e| ClientError::Transport(e.to_string()))
    }

    pub fn delete_task(&self, session: &Session, task_id: &str) -> Result<(), ClientError> {
        self.send(
            self.http.delete(self.url(&format!("/tasks/{}", task_id))),
            session,
        )?;
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn send(
        &self,
        builder: reqwest::blocking::RequestBuilder,
        session: &Session,
    ) -> Result<reqwest::blocking::Response, ClientError> {
        let token = session.token().ok_or(ClientError::Unauthorized)?;
        let resp = builder
            .header("Authorization", token)
            .send()
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ClientError::Unauthorized);
        }
        if !status.is_success() {
            let message = resp
                .json::<serde_json::Value>()
                .ok()
                .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
                .unwrap_or_else(|| status.to_string());
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(resp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_body_sends_null_due_date_explicitly() {
        let body = UpdateTaskBody {
            description: "Buy milk",
            due_date: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"description":"Buy milk","dueDate":null}"#);
    }

    #[test]
    fn create_body_omits_absent_due_date() {
        let body = CreateTaskBody {
            description: "Buy milk",
            due_date: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"description":"Buy milk"}"#);
    }

    #[test]
    fn task_parses_wire_form() {
        let task: Task = serde_json::from_str(
            r#"{"id":"t1","ownerId":"u1","description":"x","dueDate":"2025-03-01T10:00:00Z","createdAt":"2025-02-01T00:00:00Z","updatedAt":"2025-02-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(task.id, "t1");
        assert!(task.due_date.is_some());
    }
}
