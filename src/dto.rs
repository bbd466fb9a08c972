use crate::routing_utils::{BasicErrorResponse, ExtraInfo, ValidationErrorSchema};
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

pub mod task;

/// Collects the schemas shared across the API so they can be merged into the OpenAPI document
#[derive(OpenApi)]
#[openapi(
    components(
        schemas(
            task::Task,
            task::NewTask,
            task::UpdateTask,
            task::TaskList,
            task::DeletedTask,
            HealthStatus,
            ExtraInfo,
            ValidationErrorSchema,
        ),
        responses(BasicErrorResponse),
    )
)]
pub struct OpenApiSchemas;

/// DTO reporting whether the service can reach its database
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(serde::Deserialize, Debug))]
pub struct HealthStatus {
    #[schema(example = "healthy")]
    pub status: String,
}
