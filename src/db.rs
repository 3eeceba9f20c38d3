use anyhow::Context;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Opens a connection pool to the PostgreSQL database at [url]
pub async fn connect_sqlx(url: &str) -> Result<PgPool, anyhow::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(Duration::from_secs(2))
        .connect(url)
        .await
        .context("connecting to the database")
}

/// Brings the schema up to date. Safe to run on every startup.
pub async fn run_migrations(pool: &PgPool) -> Result<(), anyhow::Error> {
    MIGRATOR
        .run(pool)
        .await
        .context("running database migrations")
}
