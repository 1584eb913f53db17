use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Task domain model - one to-do record owned by a single user
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,

    /// Owning user, set at creation and never reassigned
    pub owner_id: String,

    pub description: String,

    /// Optional deadline; serialized as null when unset
    pub due_date: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskPayload {
    pub description: String,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskPayload {
    pub description: Option<String>,

    /// Tri-state: field absent = leave unchanged, explicit null = clear,
    /// a timestamp = overwrite
    #[serde(default, deserialize_with = "some_or_null")]
    pub due_date: Option<Option<DateTime<Utc>>>,
}

/// List responses wrap the array, matching what the client indexes into
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskListResponse {
    pub tasks: Vec<Task>,
}

fn some_or_null<'de, D>(deserializer: D) -> Result<Option<Option<DateTime<Utc>>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<DateTime<Utc>>::deserialize(deserializer).map(Some)
}
