use std::sync::Arc;

use anyhow::Result;
use backend::{axum_http::http_serve, build_reconciler, config::config_loader};
use crates::infra::db::postgres::postgres_connection;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        error!("Backend exited with error: {:#}", error);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    crates::observability::init_observability("backend")?;

    let dotenvy_env = Arc::new(config_loader::load()?);
    info!("ENV has been loaded");

    let postgres_pool = postgres_connection::establish_connection(&dotenvy_env.database.url)?;
    info!("Postgres connection has been established");

    let reconciler = Arc::new(build_reconciler(&dotenvy_env, Arc::new(postgres_pool))?);
    if dotenvy_env.invoicing.api_key.is_none() {
        info!("Invoicing credentials not configured; invoices will be skipped");
    }

    http_serve::start(dotenvy_env, reconciler).await?;

    Ok(())
}
