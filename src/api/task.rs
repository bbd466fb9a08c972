use crate::domain::task::driving_ports::TaskPort;
use crate::external_connections::ExternalConnectivity;
use crate::routing_utils::{BasicErrorResponse, DomainErrorResponse, Json, Path};
use crate::{AppState, SharedData, domain, dto, persistence};
use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::ErrorResponse;
use axum::routing::get;
use std::sync::Arc;
use tracing::{debug, error, info};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(paths(create_task, list_tasks, get_task, update_task, delete_task))]
/// Defines the OpenAPI documentation for the task API
pub struct TaskApi;
/// Constant used to group task endpoints in OpenAPI documentation
pub const TASK_API_GROUP: &str = "Tasks";

/// Creates a router for endpoints under the "/api/v1/tasks" group of APIs
pub fn task_routes() -> Router<Arc<SharedData>> {
    let update = |State(app_state): AppState,
                  Path(task_id): Path<i64>,
                  Json(update): Json<dto::task::UpdateTask>| async move {
        let mut ext_cxn = app_state.ext_cxn.clone();
        let task_service = domain::task::TaskService {};

        update_task(task_id, update, &mut ext_cxn, &task_service).await
    };

    Router::new()
        .route(
            "/",
            get(
                |State(app_state): AppState, Query(query): Query<dto::task::ListTasksQuery>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let task_service = domain::task::TaskService {};

                    list_tasks(query, &mut ext_cxn, &task_service).await
                },
            )
            .post(
                |State(app_state): AppState, Json(new_task): Json<dto::task::NewTask>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let task_service = domain::task::TaskService {};

                    create_task(new_task, &mut ext_cxn, &task_service).await
                },
            ),
        )
        .route(
            "/:task_id",
            get(
                |State(app_state): AppState, Path(task_id): Path<i64>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let task_service = domain::task::TaskService {};

                    get_task(task_id, &mut ext_cxn, &task_service).await
                },
            )
            .put(update)
            .patch(update)
            .delete(
                |State(app_state): AppState, Path(task_id): Path<i64>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let task_service = domain::task::TaskService {};

                    delete_task(task_id, &mut ext_cxn, &task_service).await
                },
            ),
        )
}

/// Logs a failed task operation and converts it to an HTTP response. Only server-side
/// failures are logged as errors.
fn failure(action: &str, err: domain::Error) -> DomainErrorResponse {
    match err {
        domain::Error::RetrieveFailure { .. } => error!("Failed to {action}: {err:#}"),
        _ => debug!("Rejected request to {action}: {err}"),
    }

    DomainErrorResponse(err)
}

#[utoipa::path(
    post,
    path = "/api/v1/tasks",
    tag = TASK_API_GROUP,
    request_body = dto::task::NewTask,
    responses(
        (status = 201, description = "Task created", body = dto::task::Task),
        (status = 400, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
#[tracing::instrument(skip_all)]
/// Creates a task. The status defaults to "pending" when it isn't provided.
async fn create_task(
    new_task: dto::task::NewTask,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl TaskPort,
) -> Result<(StatusCode, Json<dto::task::Task>), ErrorResponse> {
    info!("Creating a task");
    let task_writer = persistence::db_task_driven_ports::DbTaskWriter;

    let created_task = task_service
        .create_task(new_task.into(), &mut *ext_cxn, &task_writer)
        .await
        .map_err(|err| failure("create a task", err))?;

    Ok((StatusCode::CREATED, Json(created_task.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/tasks",
    tag = TASK_API_GROUP,
    params(dto::task::ListTasksQuery),
    responses(
        (status = 200, description = "A page of tasks, newest first", body = dto::task::TaskList),
        (status = 400, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
#[tracing::instrument(skip(ext_cxn, task_service))]
/// Lists tasks, optionally only those with a given status
async fn list_tasks(
    query: dto::task::ListTasksQuery,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl TaskPort,
) -> Result<Json<dto::task::TaskList>, ErrorResponse> {
    info!("Listing tasks");
    let task_reader = persistence::db_task_driven_ports::DbTaskReader;
    let limit = domain::task::parse_page_param(query.limit.as_deref());
    let offset = domain::task::parse_page_param(query.offset.as_deref());

    let task_page = task_service
        .list_tasks(
            query.status.as_deref().unwrap_or_default(),
            limit,
            offset,
            &mut *ext_cxn,
            &task_reader,
        )
        .await
        .map_err(|err| failure("list tasks", err))?;

    Ok(Json(task_page.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/tasks/{task_id}",
    tag = TASK_API_GROUP,
    params(("task_id" = i64, Path, description = "ID of the task")),
    responses(
        (status = 200, description = "The requested task", body = dto::task::Task),
        (status = 400, response = BasicErrorResponse),
        (status = 404, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
#[tracing::instrument(skip(ext_cxn, task_service))]
/// Retrieves a single task
async fn get_task(
    task_id: i64,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl TaskPort,
) -> Result<Json<dto::task::Task>, ErrorResponse> {
    info!("Fetching task {task_id}");
    let task_reader = persistence::db_task_driven_ports::DbTaskReader;

    let task = task_service
        .get_task(task_id, &mut *ext_cxn, &task_reader)
        .await
        .map_err(|err| failure(&format!("fetch task {task_id}"), err))?;

    Ok(Json(task.into()))
}

#[utoipa::path(
    patch,
    path = "/api/v1/tasks/{task_id}",
    tag = TASK_API_GROUP,
    params(("task_id" = i64, Path, description = "ID of the task")),
    request_body = dto::task::UpdateTask,
    responses(
        (status = 200, description = "The task after the update. PUT behaves the same way.", body = dto::task::Task),
        (status = 400, response = BasicErrorResponse),
        (status = 404, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
#[tracing::instrument(skip(ext_cxn, task_service))]
/// Changes only the fields present in the request body
async fn update_task(
    task_id: i64,
    update: dto::task::UpdateTask,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl TaskPort,
) -> Result<Json<dto::task::Task>, ErrorResponse> {
    info!("Updating task {task_id}");
    let task_writer = persistence::db_task_driven_ports::DbTaskWriter;
    let domain_update = domain::task::UpdateTask::from(update);

    let updated_task = task_service
        .update_task(task_id, &domain_update, &mut *ext_cxn, &task_writer)
        .await
        .map_err(|err| failure(&format!("update task {task_id}"), err))?;

    Ok(Json(updated_task.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/tasks/{task_id}",
    tag = TASK_API_GROUP,
    params(("task_id" = i64, Path, description = "ID of the task")),
    responses(
        (status = 200, description = "Task deleted", body = dto::task::DeletedTask),
        (status = 400, response = BasicErrorResponse),
        (status = 404, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
#[tracing::instrument(skip(ext_cxn, task_service))]
/// Deletes a task
async fn delete_task(
    task_id: i64,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl TaskPort,
) -> Result<Json<dto::task::DeletedTask>, ErrorResponse> {
    info!("Deleting task {task_id}");
    let task_writer = persistence::db_task_driven_ports::DbTaskWriter;

    task_service
        .delete_task(task_id, &mut *ext_cxn, &task_writer)
        .await
        .map_err(|err| failure(&format!("delete task {task_id}"), err))?;

    Ok(Json(dto::task::DeletedTask {
        message: "Task deleted successfully".to_owned(),
    }))
}
