use crate::domain;
use crate::domain::DrivenPortError;
use crate::domain::task::driven_ports::{TaskReader, TaskWriter};
use crate::external_connections::ExternalConnectivity;
use chrono::{DateTime, Utc};
use derive_more::Display;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;
use validator::{Validate, ValidationError, ValidationErrors};

/// Page size used when a caller asks for zero or a negative number of tasks
pub const DEFAULT_PAGE_SIZE: i64 = 10;
/// Largest page of tasks that can be requested at once
pub const MAX_PAGE_SIZE: i64 = 100;

const PENDING: &str = "pending";
const IN_PROGRESS: &str = "in_progress";
const COMPLETED: &str = "completed";

/// Lifecycle marker for a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TaskStatus {
    #[display("{}", PENDING)]
    Pending,
    #[display("{}", IN_PROGRESS)]
    InProgress,
    #[display("{}", COMPLETED)]
    Completed,
}

impl TaskStatus {
    /// The value stored in the database and sent over the API for this status
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => PENDING,
            Self::InProgress => IN_PROGRESS,
            Self::Completed => COMPLETED,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid status for task: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for TaskStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            PENDING => Ok(Self::Pending),
            IN_PROGRESS => Ok(Self::InProgress),
            COMPLETED => Ok(Self::Completed),
            other => Err(UnknownStatus(other.to_owned())),
        }
    }
}

/// A persisted task
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to create a task. `status` is kept as the caller sent it until validation
/// either accepts it or fills in the default.
#[derive(Debug, Default, Clone, PartialEq, Eq, Validate)]
pub struct CreateTask {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub description: Option<String>,
    #[validate(custom = "validate_status")]
    pub status: Option<String>,
    pub priority: i32,
}

impl CreateTask {
    /// Fills in the default status when none was given, then validates the request.
    pub fn validate_and_default(&mut self) -> Result<(), ValidationErrors> {
        if self.status.as_deref().is_none_or(str::is_empty) {
            self.status = Some(TaskStatus::Pending.to_string());
        }

        self.validate()
    }
}

/// Sparse patch for a task: `None` leaves a field alone.
///
/// `description` has three states: `None` leaves it alone, `Some(None)` clears it, and
/// `Some(Some(text))` replaces it.
#[derive(Debug, Default, Clone, PartialEq, Eq, Validate)]
pub struct UpdateTask {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    #[validate(custom = "validate_status")]
    pub status: Option<String>,
    pub priority: Option<i32>,
}

impl UpdateTask {
    /// True when the patch would not change anything
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
    }
}

/// Normalized listing parameters handed to storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub limit: i64,
    pub offset: i64,
}

/// One page of tasks along with the pagination values actually used to fetch it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPage {
    pub tasks: Vec<Task>,
    pub limit: i64,
    pub offset: i64,
}

fn validate_status(status: &str) -> Result<(), ValidationError> {
    match TaskStatus::from_str(status) {
        Ok(_) => Ok(()),
        Err(_) => Err(invalid_status_error(status)),
    }
}

fn invalid_status_error(status: &str) -> ValidationError {
    let mut err = ValidationError::new("status");
    err.message = Some("status must be one of pending, in_progress, completed".into());
    err.add_param("value".into(), &status);
    err
}

/// Checks a status used to filter a task listing. An empty filter means "every status".
pub fn check_status_filter(status: &str) -> Result<Option<TaskStatus>, ValidationErrors> {
    if status.is_empty() {
        return Ok(None);
    }

    TaskStatus::from_str(status).map(Some).map_err(|_| {
        let mut errors = ValidationErrors::new();
        errors.add("status", invalid_status_error(status));
        errors
    })
}

/// Parses a loosely-typed pagination value. Missing or unparseable values become 0,
/// which [normalize_limit] and [normalize_offset] then treat as "use the default".
pub fn parse_page_param(raw: Option<&str>) -> i64 {
    raw.and_then(|value| value.trim().parse().ok()).unwrap_or(0)
}

pub fn normalize_limit(limit: i64) -> i64 {
    if limit <= 0 {
        DEFAULT_PAGE_SIZE
    } else {
        limit.min(MAX_PAGE_SIZE)
    }
}

pub fn normalize_offset(offset: i64) -> i64 {
    offset.max(0)
}

fn check_task_id(task_id: i64) -> Result<(), domain::Error> {
    if task_id <= 0 {
        return Err(domain::Error::InvalidArgument(format!(
            "task ID must be a positive integer, got {task_id}"
        )));
    }

    Ok(())
}

pub mod driven_ports {
    use super::*;

    pub trait TaskReader {
        async fn get_by_id(
            &self,
            task_id: i64,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Task, DrivenPortError>;
        async fn get_all(
            &self,
            filter: &TaskFilter,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<Task>, DrivenPortError>;
    }

    pub trait TaskWriter {
        /// Stores a new task and returns it as the store sees it, with ID and timestamps
        async fn create(
            &self,
            new_task: &CreateTask,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Task, DrivenPortError>;

        /// Applies only the fields present in [update]. An empty patch must not write.
        async fn update(
            &self,
            task_id: i64,
            update: &UpdateTask,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Task, DrivenPortError>;

        async fn delete(
            &self,
            task_id: i64,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<(), DrivenPortError>;
    }
}

pub mod driving_ports {
    use super::*;

    pub trait TaskPort {
        async fn create_task(
            &self,
            new_task: CreateTask,
            ext_cxn: &mut impl ExternalConnectivity,
            task_write: &impl TaskWriter,
        ) -> Result<Task, domain::Error>;
        async fn get_task(
            &self,
            task_id: i64,
            ext_cxn: &mut impl ExternalConnectivity,
            task_read: &impl TaskReader,
        ) -> Result<Task, domain::Error>;
        async fn list_tasks(
            &self,
            status: &str,
            limit: i64,
            offset: i64,
            ext_cxn: &mut impl ExternalConnectivity,
            task_read: &impl TaskReader,
        ) -> Result<TaskPage, domain::Error>;
        async fn update_task(
            &self,
            task_id: i64,
            update: &UpdateTask,
            ext_cxn: &mut impl ExternalConnectivity,
            task_write: &impl TaskWriter,
        ) -> Result<Task, domain::Error>;
        async fn delete_task(
            &self,
            task_id: i64,
            ext_cxn: &mut impl ExternalConnectivity,
            task_write: &impl TaskWriter,
        ) -> Result<(), domain::Error>;
    }
}

pub struct TaskService {}

impl driving_ports::TaskPort for TaskService {
    async fn create_task(
        &self,
        mut new_task: CreateTask,
        ext_cxn: &mut impl ExternalConnectivity,
        task_write: &impl TaskWriter,
    ) -> Result<Task, domain::Error> {
        new_task.validate_and_default()?;

        let created_task = task_write
            .create(&new_task, &mut *ext_cxn)
            .await
            .map_err(|err| err.into_error_trying_to("create a task"))?;
        debug!(task_id = created_task.id, "created task");

        Ok(created_task)
    }

    async fn get_task(
        &self,
        task_id: i64,
        ext_cxn: &mut impl ExternalConnectivity,
        task_read: &impl TaskReader,
    ) -> Result<Task, domain::Error> {
        check_task_id(task_id)?;

        task_read
            .get_by_id(task_id, &mut *ext_cxn)
            .await
            .map_err(|err| err.into_error_trying_to(&format!("fetch task {task_id}")))
    }

    async fn list_tasks(
        &self,
        status: &str,
        limit: i64,
        offset: i64,
        ext_cxn: &mut impl ExternalConnectivity,
        task_read: &impl TaskReader,
    ) -> Result<TaskPage, domain::Error> {
        let filter = TaskFilter {
            status: check_status_filter(status)?,
            limit: normalize_limit(limit),
            offset: normalize_offset(offset),
        };

        let tasks = task_read
            .get_all(&filter, &mut *ext_cxn)
            .await
            .map_err(|err| err.into_error_trying_to("list tasks"))?;
        debug!(count = tasks.len(), "listed tasks");

        Ok(TaskPage {
            tasks,
            limit: filter.limit,
            offset: filter.offset,
        })
    }

    async fn update_task(
        &self,
        task_id: i64,
        update: &UpdateTask,
        ext_cxn: &mut impl ExternalConnectivity,
        task_write: &impl TaskWriter,
    ) -> Result<Task, domain::Error> {
        check_task_id(task_id)?;
        update.validate()?;

        task_write
            .update(task_id, update, &mut *ext_cxn)
            .await
            .map_err(|err| err.into_error_trying_to(&format!("update task {task_id}")))
    }

    async fn delete_task(
        &self,
        task_id: i64,
        ext_cxn: &mut impl ExternalConnectivity,
        task_write: &impl TaskWriter,
    ) -> Result<(), domain::Error> {
        check_task_id(task_id)?;

        task_write
            .delete(task_id, &mut *ext_cxn)
            .await
            .map_err(|err| err.into_error_trying_to(&format!("delete task {task_id}")))
    }
}
