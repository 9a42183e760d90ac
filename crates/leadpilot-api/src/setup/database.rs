//! Postgres pool construction and startup migrations.

use anyhow::{Context, Result};
use leadpilot_core::Config;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::path::Path;
use std::time::Duration;

/// Connect the pool (all tuning comes from [`Config`]) and bring the schema
/// up to date before the server starts accepting requests.
pub async fn setup_database(config: &Config) -> Result<PgPool> {
    let pool = connect_pool(config).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}

async fn connect_pool(config: &Config) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections())
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds()))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout_seconds()))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime_seconds()))
        .connect(config.database_url())
        .await
        .context("Failed to connect to Postgres")?;

    tracing::info!(
        max_connections = config.db_max_connections(),
        "database pool ready"
    );
    Ok(pool)
}

async fn run_migrations(pool: &PgPool) -> Result<()> {
    // Migrations live at the workspace root, two levels up from this crate.
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations");
    let migrator = sqlx::migrate::Migrator::new(dir)
        .await
        .context("Failed to load migrations")?;
    migrator
        .run(pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("database migrations applied");
    Ok(())
}
