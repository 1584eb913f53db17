use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;
use chrono::{DateTime, SecondsFormat, Utc};

use super::model::Task;
use crate::error::ApiError;

/// Name of the GSI that keys tasks by owner, sorted by creation time
pub const OWNER_INDEX: &str = "owner-index";

/// Storage seam for task records. A put replaces the whole record, so a
/// single create or update is all-or-nothing.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Look up a task by bare id, regardless of owner
    async fn get(&self, task_id: &str) -> Result<Option<Task>, ApiError>;

    /// All tasks for one owner, creation order ascending
    async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<Task>, ApiError>;

    /// Insert or replace one record
    async fn put(&self, task: &Task) -> Result<(), ApiError>;

    async fn delete(&self, task_id: &str) -> Result<(), ApiError>;
}

/// Production store: single-table DynamoDB layout.
///
/// Items live under PK = SK = TASK#{id}; the owner listing goes through the
/// owner-index GSI keyed GSI1PK = USER#{owner_id}, GSI1SK = created_at.
pub struct DynamoTaskStore {
    client: DynamoClient,
    table_name: String,
}

impl DynamoTaskStore {
    pub fn new(client: DynamoClient, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }
}

fn task_key(task_id: &str) -> String {
    format!("TASK#{}", task_id)
}

fn owner_key(owner_id: &str) -> String {
    format!("USER#{}", owner_id)
}

fn to_rfc3339(ts: &DateTime<Utc>) -> String {
    // Fixed precision so the GSI sort key orders lexicographically
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_rfc3339(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn string_attr(item: &HashMap<String, AttributeValue>, name: &str) -> Option<String> {
    item.get(name).and_then(|v| v.as_s().ok()).cloned()
}

fn task_from_item(item: &HashMap<String, AttributeValue>) -> Option<Task> {
    let sk = item.get("SK").and_then(|v| v.as_s().ok())?;
    let task_id = sk.strip_prefix("TASK#")?;

    Some(Task {
        id: task_id.to_string(),
        owner_id: string_attr(item, "owner_id").unwrap_or_default(),
        description: string_attr(item, "description").unwrap_or_default(),
        due_date: string_attr(item, "due_date")
            .as_deref()
            .and_then(parse_rfc3339),
        created_at: string_attr(item, "created_at")
            .as_deref()
            .and_then(parse_rfc3339)?,
        updated_at: string_attr(item, "updated_at")
            .as_deref()
            .and_then(parse_rfc3339)?,
    })
}

#[async_trait]
impl TaskStore for DynamoTaskStore {
    async fn get(&self, task_id: &str) -> Result<Option<Task>, ApiError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(task_key(task_id)))
            .key("SK", AttributeValue::S(task_key(task_id)))
            .send()
            .await
            .map_err(|e| ApiError::Storage(format!("DynamoDB get_item error: {}", e)))?;

        Ok(result.item().and_then(task_from_item))
    }

    async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<Task>, ApiError> {
        let result = self
            .client
            .query()
            .table_name(&self.table_name)
            .index_name(OWNER_INDEX)
            .key_condition_expression("GSI1PK = :pk")
            .expression_attribute_values(":pk", AttributeValue::S(owner_key(owner_id)))
            .send()
            .await
            .map_err(|e| ApiError::Storage(format!("DynamoDB query error: {}", e)))?;

        let mut tasks = Vec::new();
        for item in result.items() {
            if let Some(task) = task_from_item(item) {
                tasks.push(task);
            }
        }

        Ok(tasks)
    }

    async fn put(&self, task: &Task) -> Result<(), ApiError> {
        let mut builder = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .item("PK", AttributeValue::S(task_key(&task.id)))
            .item("SK", AttributeValue::S(task_key(&task.id)))
            .item("GSI1PK", AttributeValue::S(owner_key(&task.owner_id)))
            .item("GSI1SK", AttributeValue::S(to_rfc3339(&task.created_at)))
            .item("owner_id", AttributeValue::S(task.owner_id.clone()))
            .item("description", AttributeValue::S(task.description.clone()))
            .item("created_at", AttributeValue::S(to_rfc3339(&task.created_at)))
            .item("updated_at", AttributeValue::S(to_rfc3339(&task.updated_at)));

        if let Some(due_date) = &task.due_date {
            builder = builder.item("due_date", AttributeValue::S(to_rfc3339(due_date)));
        }

        builder
            .send()
            .await
            .map_err(|e| ApiError::Storage(format!("DynamoDB put_item error: {}", e)))?;

        Ok(())
    }

    async fn delete(&self, task_id: &str) -> Result<(), ApiError> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(task_key(task_id)))
            .key("SK", AttributeValue::S(task_key(task_id)))
            .send()
            .await
            .map_err(|e| ApiError::Storage(format!("DynamoDB delete_item error: {}", e)))?;

        Ok(())
    }
}

/// In-process store used by tests and local runs. Records keep insertion
/// order, which matches the creation-order listing contract.
#[derive(Default)]
pub struct MemoryTaskStore {
    tasks: Mutex<Vec<Task>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn get(&self, task_id: &str) -> Result<Option<Task>, ApiError> {
        let tasks = self.lock()?;
        Ok(tasks.iter().find(|t| t.id == task_id).cloned())
    }

    async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<Task>, ApiError> {
        let tasks = self.lock()?;
        Ok(tasks
            .iter()
            .filter(|t| t.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn put(&self, task: &Task) -> Result<(), ApiError> {
        let mut tasks = self.lock()?;
        match tasks.iter_mut().find(|t| t.id == task.id) {
            Some(slot) => *slot = task.clone(),
            None => tasks.push(task.clone()),
        }
        Ok(())
    }

    async fn delete(&self, task_id: &str) -> Result<(), ApiError> {
        let mut tasks = self.lock()?;
        tasks.retain(|t| t.id != task_id);
        Ok(())
    }
}

impl MemoryTaskStore {
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<Task>>, ApiError> {
        self.tasks
            .lock()
            .map_err(|_| ApiError::Storage("task store lock poisoned".to_string()))
    }
}
