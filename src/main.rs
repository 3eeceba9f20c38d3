use anyhow::Context;
use dotenv::dotenv;
use std::sync::Arc;
use tasks_api::app_env::{AppConfig, BootstrapUser};
use tasks_api::domain::user::driving_ports::UserPort;
use tasks_api::domain::user::{NewUser, UserService};
use tasks_api::persistence::db_user_driven_ports::{DbReadUsers, DbWriteUsers};
use tasks_api::{SharedData, build_router, db, logging, persistence};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenv().ok();
    let config = AppConfig::from_env()?;

    let otel_exporters = match &config.otel {
        Some(endpoints) => Some(logging::init_exporters(
            &endpoints.spans,
            &endpoints.metrics,
        )?),
        None => None,
    };
    logging::setup_logging_and_tracing(logging::init_env_filter()?, otel_exporters)?;

    info!("Connecting to the database.");
    let db_pool = db::connect_sqlx(&config.database_url).await?;
    db::run_migrations(&db_pool).await?;
    let ext_cxn = persistence::ExternalConnectivity::new(db_pool);

    if let Some(bootstrap_user) = &config.bootstrap_user {
        seed_bootstrap_user(bootstrap_user, ext_cxn.clone()).await?;
    }
    if config.require_auth {
        info!("Basic authentication is required for to-do routes.");
    }

    let router = build_router(Arc::new(SharedData {
        ext_cxn,
        require_auth: config.require_auth,
    }));

    let listener = TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("binding to {}", config.listen_addr))?;
    info!("Starting server on {}.", config.listen_addr);
    axum::serve(listener, router)
        .await
        .context("running the HTTP server")
}

async fn seed_bootstrap_user(
    bootstrap_user: &BootstrapUser,
    mut ext_cxn: persistence::ExternalConnectivity,
) -> Result<(), anyhow::Error> {
    let new_user = NewUser {
        username: bootstrap_user.username.clone(),
        password: bootstrap_user.password.clone(),
    };

    UserService
        .seed_user(&new_user, &mut ext_cxn, &DbReadUsers, &DbWriteUsers)
        .await?;

    Ok(())
}
