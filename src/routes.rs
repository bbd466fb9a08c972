use crate::{SharedData, api, logging};
use axum::Router;
use axum::http::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;

/// Builds the full route table for the server. Requests running longer than
/// [request_timeout] are abandoned with a 408.
pub fn build_router(shared_data: Arc<SharedData>, request_timeout: Duration) -> Router {
    let router = Router::new()
        .nest("/api/v1/tasks", api::task::task_routes())
        .merge(api::health::health_routes())
        .merge(api::swagger_main::build_documentation())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .with_state(shared_data);

    logging::attach_tracing_http(router)
}
