use crate::domain;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};

/// DTO for a task returned on the API. A missing description is sent as `null`.
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug, PartialEq))]
pub struct Task {
    #[schema(example = 10)]
    pub id: i64,
    #[schema(example = "Write the quarterly report")]
    pub title: String,
    #[schema(example = "Include numbers from every region")]
    pub description: Option<String>,
    #[schema(example = "pending")]
    pub status: String,
    #[schema(example = 2)]
    pub priority: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<domain::task::Task> for Task {
    fn from(value: domain::task::Task) -> Self {
        Task {
            id: value.id,
            title: value.title,
            description: value.description,
            status: value.status.to_string(),
            priority: value.priority,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// DTO for creating a new task via the API
#[derive(Deserialize, ToSchema)]
#[cfg_attr(test, derive(Serialize, Debug, PartialEq))]
pub struct NewTask {
    #[schema(example = "Write the quarterly report")]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// One of "pending", "in_progress", or "completed". Defaults to "pending".
    #[serde(default)]
    #[schema(example = "pending")]
    pub status: Option<String>,
    #[serde(default)]
    #[schema(example = 2)]
    pub priority: i32,
}

impl From<NewTask> for domain::task::CreateTask {
    fn from(value: NewTask) -> Self {
        domain::task::CreateTask {
            title: value.title,
            description: value.description,
            status: value.status,
            priority: value.priority,
        }
    }
}

/// DTO for patching a task via the API. Omitted fields are left alone, and a `null`
/// description clears the description.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTask {
    #[serde(default)]
    #[schema(example = "Write the annual report")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present_field")]
    #[schema(value_type = Option<String>, example = "Only the EMEA numbers")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    #[schema(example = "in_progress")]
    pub status: Option<String>,
    #[serde(default)]
    #[schema(example = 5)]
    pub priority: Option<i32>,
}

impl From<UpdateTask> for domain::task::UpdateTask {
    fn from(value: UpdateTask) -> Self {
        domain::task::UpdateTask {
            title: value.title,
            description: value.description,
            status: value.status,
            priority: value.priority,
        }
    }
}

/// Only called when the field is present, so `null` becomes `Some(None)` while a
/// missing field falls back to the `None` default
fn present_field<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Query parameters for listing tasks. Values are taken as raw strings; bad numbers fall
/// back to the defaults instead of failing the request.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListTasksQuery {
    /// Only return tasks with this status
    pub status: Option<String>,
    /// Page size, 10 by default and at most 100
    pub limit: Option<String>,
    /// Number of tasks to skip
    pub offset: Option<String>,
}

/// DTO for a page of tasks
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug))]
pub struct TaskList {
    pub tasks: Vec<Task>,
    #[schema(example = 10)]
    pub limit: i64,
    #[schema(example = 0)]
    pub offset: i64,
}

impl From<domain::task::TaskPage> for TaskList {
    fn from(value: domain::task::TaskPage) -> Self {
        TaskList {
            tasks: value.tasks.into_iter().map(Task::from).collect(),
            limit: value.limit,
            offset: value.offset,
        }
    }
}

/// DTO confirming a task was removed
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug))]
pub struct DeletedTask {
    #[schema(example = "Task deleted successfully")]
    pub message: String,
}
