use crate::domain::DrivenPortError;
use crate::domain::task::{CreateTask, Task, TaskFilter, TaskStatus, UpdateTask, driven_ports};
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::Context;
use chrono::{DateTime, Utc};
use sqlx::{Connection, PgConnection, Postgres, QueryBuilder, query, query_as};

const SELECT_TASK_BY_ID: &str = "SELECT id, title, description, status, priority, created_at, updated_at \
    FROM tasks WHERE id = $1";
const SELECT_TASK_BY_ID_FOR_UPDATE: &str = "SELECT id, title, description, status, priority, created_at, updated_at \
    FROM tasks WHERE id = $1 FOR UPDATE";

#[derive(sqlx::FromRow)]
struct TaskRow {
    id: i64,
    title: String,
    description: Option<String>,
    status: String,
    priority: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TaskRow> for Task {
    type Error = anyhow::Error;

    fn try_from(value: TaskRow) -> Result<Self, Self::Error> {
        let status = value
            .status
            .parse::<TaskStatus>()
            .with_context(|| format!("reading the status of task {}", value.id))?;

        Ok(Task {
            id: value.id,
            title: value.title,
            description: value.description,
            status,
            priority: value.priority,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

/// Reads a single task. With [lock_row] the row stays locked until the surrounding
/// transaction ends.
async fn select_task(
    cxn: &mut PgConnection,
    task_id: i64,
    lock_row: bool,
) -> Result<Task, DrivenPortError> {
    let statement = if lock_row {
        SELECT_TASK_BY_ID_FOR_UPDATE
    } else {
        SELECT_TASK_BY_ID
    };

    let task_row = query_as::<_, TaskRow>(statement)
        .bind(task_id)
        .fetch_optional(cxn)
        .await
        .context("trying to fetch a task by ID")?;

    match task_row {
        Some(row) => Ok(Task::try_from(row)?),
        None => Err(DrivenPortError::DoesNotExist),
    }
}

/// Builds the listing query. The status clause only appears when filtering.
fn list_query(filter: &TaskFilter) -> QueryBuilder<'static, Postgres> {
    let mut list_query = QueryBuilder::new(
        "SELECT id, title, description, status, priority, created_at, updated_at FROM tasks",
    );
    if let Some(status) = filter.status {
        list_query.push(" WHERE status = ").push_bind(status.as_str());
    }
    list_query
        .push(" ORDER BY created_at DESC, id DESC LIMIT ")
        .push_bind(filter.limit)
        .push(" OFFSET ")
        .push_bind(filter.offset);

    list_query
}

/// Builds an UPDATE with one assignment per field present in [update]. Returns None when
/// there is nothing to write.
fn sparse_update_query(task_id: i64, update: &UpdateTask) -> Option<QueryBuilder<'static, Postgres>> {
    if update.is_empty() {
        return None;
    }

    let mut update_query = QueryBuilder::new("UPDATE tasks SET ");
    {
        let mut assignments = update_query.separated(", ");
        if let Some(ref title) = update.title {
            assignments
                .push("title = ")
                .push_bind_unseparated(title.clone());
        }
        if let Some(ref description) = update.description {
            assignments
                .push("description = ")
                .push_bind_unseparated(description.clone());
        }
        if let Some(ref status) = update.status {
            assignments
                .push("status = ")
                .push_bind_unseparated(status.clone());
        }
        if let Some(priority) = update.priority {
            assignments
                .push("priority = ")
                .push_bind_unseparated(priority);
        }
        assignments.push("updated_at = NOW()");
    }
    update_query.push(" WHERE id = ").push_bind(task_id);

    Some(update_query)
}

pub struct DbTaskReader;

impl driven_ports::TaskReader for DbTaskReader {
    async fn get_by_id(
        &self,
        task_id: i64,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Task, DrivenPortError> {
        let mut cxn = ext_cxn.database_cxn().await?;

        select_task(cxn.borrow_connection(), task_id, false).await
    }

    async fn get_all(
        &self,
        filter: &TaskFilter,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Vec<Task>, DrivenPortError> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let mut task_query = list_query(filter);
        let task_rows = task_query
            .build_query_as::<TaskRow>()
            .fetch_all(cxn.borrow_connection())
            .await
            .context("trying to fetch a page of tasks")?;

        let tasks = task_rows
            .into_iter()
            .map(Task::try_from)
            .collect::<Result<Vec<Task>, _>>()?;

        Ok(tasks)
    }
}

pub struct DbTaskWriter;

impl driven_ports::TaskWriter for DbTaskWriter {
    async fn create(
        &self,
        new_task: &CreateTask,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Task, DrivenPortError> {
        let mut cxn = ext_cxn.database_cxn().await?;
        let status = new_task
            .status
            .as_deref()
            .filter(|status| !status.is_empty())
            .unwrap_or(TaskStatus::Pending.as_str());

        let new_id = query_as::<_, super::NewId>(
            "INSERT INTO tasks (title, description, status, priority) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&new_task.title)
        .bind(&new_task.description)
        .bind(status)
        .bind(new_task.priority)
        .fetch_one(cxn.borrow_connection())
        .await
        .context("trying to insert a new task into the database")?;

        // Timestamps are assigned by the database, so read the row back
        select_task(cxn.borrow_connection(), new_id.id, false).await
    }

    async fn update(
        &self,
        task_id: i64,
        update: &UpdateTask,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Task, DrivenPortError> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let Some(mut patch_statement) = sparse_update_query(task_id, update) else {
            return select_task(cxn.borrow_connection(), task_id, false).await;
        };

        // The existence check locks the row so nothing can delete or rewrite it
        // between the check and the write
        let mut txn = cxn
            .borrow_connection()
            .begin()
            .await
            .context("starting a transaction to update a task")?;
        select_task(&mut txn, task_id, true).await?;

        patch_statement
            .build()
            .execute(&mut *txn)
            .await
            .context("trying to update a task in the database")?;
        let updated_task = select_task(&mut txn, task_id, false).await?;

        txn.commit()
            .await
            .context("committing a task update")?;

        Ok(updated_task)
    }

    async fn delete(
        &self,
        task_id: i64,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<(), DrivenPortError> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let delete_result = query("DELETE FROM tasks WHERE id = $1")
            .bind(task_id)
            .execute(cxn.borrow_connection())
            .await
            .context("trying to remove a task from the database")?;

        if delete_result.rows_affected() == 0 {
            return Err(DrivenPortError::DoesNotExist);
        }

        Ok(())
    }
}
