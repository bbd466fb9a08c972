use crate::external_connections::ExternalConnectivity;
use crate::routing_utils::Json;
use crate::{AppState, SharedData, db, dto};
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use std::sync::Arc;
use tracing::error;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(paths(health_check))]
/// Defines the OpenAPI documentation for the health check
pub struct HealthApi;

/// Creates a router with the "/health" endpoint
pub fn health_routes() -> Router<Arc<SharedData>> {
    Router::new().route(
        "/health",
        get(|State(app_state): AppState| async move {
            let mut ext_cxn = app_state.ext_cxn.clone();

            health_check(&mut ext_cxn).await
        }),
    )
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "The database is reachable", body = dto::HealthStatus),
        (status = 503, description = "The database could not be reached", body = dto::HealthStatus),
    ),
)]
#[tracing::instrument(skip_all)]
/// Reports whether the service can reach its database
async fn health_check(
    ext_cxn: &mut impl ExternalConnectivity,
) -> (StatusCode, Json<dto::HealthStatus>) {
    match db::check_database(ext_cxn).await {
        Ok(()) => (
            StatusCode::OK,
            Json(dto::HealthStatus {
                status: "healthy".to_owned(),
            }),
        ),
        Err(err) => {
            error!("Health check failed: {err:#}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(dto::HealthStatus {
                    status: "unhealthy".to_owned(),
                }),
            )
        }
    }
}
