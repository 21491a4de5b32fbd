use anyhow::Result;
use payroll_server::axum_http::http_serve;
use payroll_server::config::config_loader;
use payroll_core::infra::db::postgres::postgres_connection::{self, PoolSettings};
use std::{sync::Arc, time::Duration};
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
    payroll_core::observability::init_observability("backend")?;

    let dotenvy_env = config_loader::load()?;
    info!("ENV has been loaded");

    let postgres_pool = postgres_connection::establish_connection(
        &dotenvy_env.database.url,
        PoolSettings {
            max_connections: dotenvy_env.database.max_connections,
            connect_timeout: Duration::from_secs(dotenvy_env.database.connect_timeout),
        },
    )?;
    info!("Postgres connection has been established");

    http_serve::start(Arc::new(dotenvy_env), Arc::new(postgres_pool)).await?;

    Ok(())
}
