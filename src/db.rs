use std::{future::Future, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{info, warn};

use crate::config::AppConfig;

/// Pause between connectivity probes while waiting for the database.
pub const DB_WAIT_INTERVAL: Duration = Duration::from_secs(1);

/// Builds the pool without opening a connection, so startup can probe it first.
pub fn connect_lazy(config: &AppConfig) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(3))
        .connect_lazy(&config.database_url)
        .context("build database pool")
}

pub async fn ping(db: &PgPool) -> anyhow::Result<()> {
    sqlx::query("SELECT 1")
        .execute(db)
        .await
        .context("database ping")?;
    Ok(())
}

/// Runs `probe` until it succeeds, sleeping `interval` after every failure.
/// Never gives up.
pub async fn wait_until_ready<F, Fut>(mut probe: F, interval: Duration)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<()>>,
{
    info!("waiting for database");
    loop {
        match probe().await {
            Ok(()) => break,
            Err(e) => {
                warn!(error = %e, wait_ms = interval.as_millis() as u64, "database unavailable, retrying");
                tokio::time::sleep(interval).await;
            }
        }
    }
    info!("database available");
}

pub async fn wait_for_db(db: &PgPool) {
    wait_until_ready(|| ping(db), DB_WAIT_INTERVAL).await
}

pub async fn run_migrations(db: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(db)
        .await
        .context("run migrations")?;
    Ok(())
}
