use crate::config::PoolSettings;
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Connection, PgPool};
use std::time::Duration;
use tracing::info;

/// How long the health check waits on the database before reporting it unreachable
const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(2);
/// How long a request waits for a free pooled connection
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Builds the database connection pool and checks that it can reach the database
pub async fn connect_sqlx(db_url: &str, settings: &PoolSettings) -> Result<PgPool, anyhow::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .idle_timeout(settings.idle_timeout)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(db_url)
        .await
        .context("connecting to the database")?;
    info!(
        max_connections = settings.max_connections,
        "connected to the database"
    );

    Ok(pool)
}

/// Brings the database schema up to date with the migrations in the "migrations" directory
pub async fn migrate(pool: &PgPool) -> Result<(), anyhow::Error> {
    sqlx::migrate!()
        .run(pool)
        .await
        .context("running database migrations")?;
    info!("database migrations applied");

    Ok(())
}

/// Pings the database, giving up after [HEALTH_CHECK_TIMEOUT]
pub async fn check_database(ext_cxn: &mut impl ExternalConnectivity) -> Result<(), anyhow::Error> {
    tokio::time::timeout(HEALTH_CHECK_TIMEOUT, ping_database(ext_cxn))
        .await
        .context("timed out pinging the database")?
}

async fn ping_database(ext_cxn: &mut impl ExternalConnectivity) -> Result<(), anyhow::Error> {
    let mut cxn = ext_cxn.database_cxn().await?;

    cxn.borrow_connection()
        .ping()
        .await
        .context("pinging the database")
}
