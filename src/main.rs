use std::sync::Arc;

use anyhow::{Error, Result, anyhow};
use tracing::info;
use tracing_subscriber::EnvFilter;

use notify_service::{
    api::run_api_server,
    clients::{gateway::GatewayClient, tenants::TenantDirectory},
    config::Config,
    queue::JobQueue,
    worker::{run_cleanup_sweep, run_worker},
};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load()?;

    let queue = Arc::new(JobQueue::new(config.queue_policy()));
    let tenants = Arc::new(TenantDirectory::new());
    let gateway = Arc::new(GatewayClient::new(
        &config.gateway_base_url,
        &config.gateway_api_version,
        config.gateway_timeout_seconds,
    )?);

    tokio::spawn(run_worker(
        Arc::clone(&queue),
        Arc::clone(&tenants),
        Arc::clone(&gateway),
        config.worker_settings(),
    ));

    tokio::spawn(run_cleanup_sweep(
        Arc::clone(&queue),
        config.cleanup_interval_minutes,
        config.job_retention_hours,
    ));

    info!("Notification service ready");

    run_api_server(config, queue, tenants)
        .await
        .map_err(|e| anyhow!("API server error: {}", e))?;

    Ok(())
}
