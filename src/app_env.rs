/// URL for accessing the PostgreSQL database (should contain a database name in the path)
pub const DB_URL: &str = "DATABASE_URL";
/// Port the HTTP server listens on. Defaults to 8080.
pub const SERVER_PORT: &str = "SERVER_PORT";
/// Number of seconds a request may run before the server gives up on it with a 408
pub const REQUEST_TIMEOUT_SECS: &str = "REQUEST_TIMEOUT_SECS";
/// Largest number of connections the database pool will open
pub const DB_MAX_CONNECTIONS: &str = "DB_MAX_CONNECTIONS";
/// Number of idle connections the database pool tries to keep open
pub const DB_MIN_CONNECTIONS: &str = "DB_MIN_CONNECTIONS";
/// Number of seconds an idle pooled connection is kept before it is closed
pub const DB_IDLE_TIMEOUT_SECS: &str = "DB_IDLE_TIMEOUT_SECS";
/// Log level configuration for the application. Accepts [EnvFilter](https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html)
/// directives such as "info" or "task_api=debug,sqlx=warn"
pub const LOG_LEVEL: &str = "LOG_LEVEL";

/// OpenTelemetry span export URL. Should be http://localhost:4317 by default, as the service should
/// have an OpenTelemetry collector sidecar which directs metrics to the correct place
pub const OTEL_SPAN_EXPORT_URL: &str = "OTEL_SPAN_EXPORT_URL";
/// OpenTelemetry metrics export URL. Should be http://localhost:4317 by default, as the service should
/// have an OpenTelemetry collector sidecar which directs metrics to the correct place
pub const OTEL_METRIC_EXPORT_URL: &str = "OTEL_METRIC_EXPORT_URL";
