use std::sync::Arc;

use chrono::Utc;
use futures_util::future::join_all;
use tokio::time::{Duration, sleep};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    clients::{gateway::GatewayClient, tenants::TenantDirectory},
    models::{job::NotificationJob, outcome::DeliveryOutcome},
    queue::{JobQueue, cutoff_hours},
    strategy::resolve_strategy,
    utils::compose_message,
};

#[derive(Debug, Clone)]
pub struct WorkerSettings {
    pub poll_interval_ms: u64,
    pub batch_size: usize,
    pub default_language_code: String,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1_000,
            batch_size: 25,
            default_language_code: "en".to_string(),
        }
    }
}

pub async fn run_worker(
    queue: Arc<JobQueue>,
    tenants: Arc<TenantDirectory>,
    gateway: Arc<GatewayClient>,
    settings: WorkerSettings,
) {
    info!(
        poll_interval_ms = settings.poll_interval_ms,
        batch_size = settings.batch_size,
        "Notification worker started"
    );

    loop {
        let processed = run_once(&queue, &tenants, &gateway, &settings).await;
        if processed == 0 {
            sleep(Duration::from_millis(settings.poll_interval_ms)).await;
        }
    }
}

/// One processing pass: claim due jobs and deliver them concurrently. A
/// panicking job task is caught here so it cannot take the loop down; the
/// job is failed like any other delivery error.
pub async fn run_once(
    queue: &Arc<JobQueue>,
    tenants: &Arc<TenantDirectory>,
    gateway: &Arc<GatewayClient>,
    settings: &WorkerSettings,
) -> usize {
    let claimed = queue.claim_due(Utc::now(), settings.batch_size).await;
    if claimed.is_empty() {
        return 0;
    }

    debug!(count = claimed.len(), "Processing pass claimed jobs");

    let mut ids: Vec<Uuid> = Vec::with_capacity(claimed.len());
    let mut handles = Vec::with_capacity(claimed.len());

    for job in claimed {
        ids.push(job.id);

        let queue = Arc::clone(queue);
        let tenants = Arc::clone(tenants);
        let gateway = Arc::clone(gateway);
        let default_language = settings.default_language_code.clone();

        handles.push(tokio::spawn(async move {
            process_job(job, &queue, &tenants, &gateway, &default_language).await;
        }));
    }

    let results = join_all(handles).await;
    let mut processed = 0;

    for (id, result) in ids.into_iter().zip(results) {
        match result {
            Ok(()) => processed += 1,
            Err(e) => {
                error!(job_id = %id, error = %e, "Job task panicked during processing pass");
                queue.fail(id, "internal: processing task panicked").await;
            }
        }
    }

    processed
}

async fn process_job(
    job: NotificationJob,
    queue: &JobQueue,
    tenants: &TenantDirectory,
    gateway: &GatewayClient,
    default_language: &str,
) {
    info!(
        job_id = %job.id,
        store_id = %job.store_id,
        kind = %job.kind,
        attempt = job.attempts + 1,
        "Processing notification job"
    );

    let settings = tenants.settings_for(&job.store_id).await;
    let raw_strategy = settings
        .as_ref()
        .and_then(|s| s.strategy_for(&job.kind).cloned());
    let strategy = resolve_strategy(raw_strategy.as_ref(), default_language);
    let body = compose_message(&job);
    let credentials = settings.as_ref().and_then(|s| s.credentials.as_ref());

    let outcome = gateway
        .send(&job.payload.customer_phone, &body, &strategy, credentials)
        .await;

    match &outcome {
        DeliveryOutcome::Delivered => {
            queue.complete(job.id).await;
        }
        DeliveryOutcome::Failed {
            reason,
            fallback_link,
            ..
        } => {
            if reason.is_configuration() {
                warn!(
                    job_id = %job.id,
                    store_id = %job.store_id,
                    "Store has no usable gateway credentials, retries cannot self-heal"
                );
            }
            if let Some(link) = fallback_link {
                info!(job_id = %job.id, fallback_link = %link, "Manual contact link available");
            }

            let error = outcome.error_text().unwrap_or_else(|| reason.to_string());
            queue.fail(job.id, &error).await;
        }
    }
}

/// Periodic purge of terminal jobs past the retention window. Runs
/// alongside the processing loop; `cleanup` only ever touches terminal
/// jobs, so the two cannot corrupt each other.
pub async fn run_cleanup_sweep(queue: Arc<JobQueue>, interval_minutes: u64, retention_hours: i64) {
    info!(interval_minutes, retention_hours, "Cleanup sweep started");

    loop {
        sleep(Duration::from_secs(interval_minutes * 60)).await;

        let removed = queue.cleanup(cutoff_hours(retention_hours)).await;
        debug!(removed, "Cleanup sweep pass finished");
    }
}
