use std::collections::HashMap;

use anyhow::{Error, Result, anyhow};
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{
    job::{EnqueueRequest, JobStatus, MAX_PRIORITY, NotificationJob, QueueStats},
    validation::{normalize_phone, validate_destination},
};

#[derive(Debug, Clone)]
pub struct QueuePolicy {
    pub max_attempts: u32,
    pub base_delay_seconds: i64,
    pub max_delay_seconds: i64,
}

impl Default for QueuePolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_seconds: 30,
            max_delay_seconds: 15 * 60,
        }
    }
}

/// Owns the notification job lifecycle. The job map is the only shared
/// mutable state in the service; every transition happens under the mutex,
/// which is what makes `claim_due` safe against concurrent passes.
pub struct JobQueue {
    jobs: Mutex<HashMap<Uuid, NotificationJob>>,
    policy: QueuePolicy,
}

impl JobQueue {
    pub fn new(policy: QueuePolicy) -> Self {
        Self {
            jobs: Mutex::new(HashMap::new()),
            policy,
        }
    }

    /// Creates a pending job and returns its id without waiting on delivery.
    pub async fn enqueue(&self, request: EnqueueRequest) -> Result<Uuid, Error> {
        if request.store_id.trim().is_empty() {
            return Err(anyhow!("store_id cannot be empty"));
        }
        if request.order_id.trim().is_empty() {
            return Err(anyhow!("order_id cannot be empty"));
        }
        if request.kind.trim().is_empty() {
            return Err(anyhow!("kind cannot be empty"));
        }

        let mut payload = request.payload;
        payload.customer_phone = normalize_phone(&payload.customer_phone);
        validate_destination(&payload.customer_phone)?;

        let now = Utc::now();
        let job = NotificationJob {
            id: Uuid::new_v4(),
            store_id: request.store_id,
            order_id: request.order_id,
            kind: request.kind,
            payload,
            status: JobStatus::Pending,
            priority: request.priority.unwrap_or(0).min(MAX_PRIORITY),
            attempts: 0,
            max_attempts: self.policy.max_attempts,
            next_attempt_at: now,
            last_error: None,
            created_at: now,
            updated_at: now,
        };

        let id = job.id;
        info!(
            job_id = %id,
            store_id = %job.store_id,
            order_id = %job.order_id,
            kind = %job.kind,
            "Notification job enqueued"
        );

        self.jobs.lock().await.insert(id, job);
        Ok(id)
    }

    pub async fn stats(&self, store: Option<&str>) -> QueueStats {
        let jobs = self.jobs.lock().await;
        let mut stats = QueueStats::default();

        for job in jobs.values() {
            if !in_scope(job, store) {
                continue;
            }
            match job.status {
                JobStatus::Pending => stats.pending += 1,
                JobStatus::Processing => stats.processing += 1,
                JobStatus::Completed => stats.completed += 1,
                JobStatus::Failed => stats.failed += 1,
                JobStatus::Cancelled => stats.cancelled += 1,
            }
            stats.total += 1;
        }

        stats
    }

    /// Stable `(priority desc, created_at asc, id)` order, same as the
    /// dispatch order, so paginated listings do not shuffle between pages.
    pub async fn jobs_by_status(
        &self,
        status: JobStatus,
        store: Option<&str>,
    ) -> Vec<NotificationJob> {
        let jobs = self.jobs.lock().await;
        let mut selected: Vec<NotificationJob> = jobs
            .values()
            .filter(|job| job.status == status && in_scope(job, store))
            .cloned()
            .collect();

        sort_for_dispatch(&mut selected);
        selected
    }

    pub async fn job(&self, id: Uuid, scope: Option<&str>) -> Option<NotificationJob> {
        let jobs = self.jobs.lock().await;
        jobs.get(&id).filter(|job| in_scope(job, scope)).cloned()
    }

    /// Manual retry. A failed job gets a fresh attempt budget; a pending job
    /// waiting out a long backoff becomes immediately eligible. Anything
    /// else (including jobs outside the caller's scope) reports `false`.
    pub async fn retry(&self, id: Uuid, scope: Option<&str>) -> bool {
        let mut jobs = self.jobs.lock().await;
        let Some(job) = jobs.get_mut(&id) else {
            return false;
        };
        if !in_scope(job, scope) {
            return false;
        }

        let now = Utc::now();
        match job.status {
            JobStatus::Failed => {
                job.status = JobStatus::Pending;
                job.attempts = 0;
                job.next_attempt_at = now;
                job.updated_at = now;
                info!(job_id = %id, "Failed job reset for manual retry");
                true
            }
            JobStatus::Pending => {
                job.next_attempt_at = now;
                job.updated_at = now;
                info!(job_id = %id, "Pending job released from backoff");
                true
            }
            _ => false,
        }
    }

    pub async fn cancel(&self, id: Uuid, scope: Option<&str>) -> bool {
        let mut jobs = self.jobs.lock().await;
        let Some(job) = jobs.get_mut(&id) else {
            return false;
        };
        if !in_scope(job, scope) {
            return false;
        }

        match job.status {
            JobStatus::Pending | JobStatus::Processing | JobStatus::Failed => {
                job.status = JobStatus::Cancelled;
                job.updated_at = Utc::now();
                info!(job_id = %id, "Job cancelled");
                true
            }
            _ => false,
        }
    }

    /// Promotes the job to top priority so the next pass picks it first.
    /// Already-max is an accepted no-op; terminal jobs report `false`.
    pub async fn prioritize(&self, id: Uuid, scope: Option<&str>) -> bool {
        let mut jobs = self.jobs.lock().await;
        let Some(job) = jobs.get_mut(&id) else {
            return false;
        };
        if !in_scope(job, scope) || job.status.is_terminal() {
            return false;
        }

        if job.priority < MAX_PRIORITY {
            job.priority = MAX_PRIORITY;
            job.updated_at = Utc::now();
            debug!(job_id = %id, "Job promoted to top priority");
        }
        true
    }

    /// Deletes terminal jobs last touched before `cutoff`. Pending and
    /// processing jobs are never deleted regardless of age.
    pub async fn cleanup(&self, cutoff: DateTime<Utc>) -> usize {
        let mut jobs = self.jobs.lock().await;
        let before = jobs.len();

        jobs.retain(|_, job| !(job.status.is_terminal() && job.updated_at < cutoff));

        let removed = before - jobs.len();
        if removed > 0 {
            info!(removed, "Terminal jobs purged");
        }
        removed
    }

    /// Atomically claims due pending jobs for processing, in
    /// `(priority desc, created_at asc, id)` order. Jobs returned here are
    /// already `Processing`, so a concurrent pass cannot pick them up again.
    pub async fn claim_due(&self, now: DateTime<Utc>, limit: usize) -> Vec<NotificationJob> {
        let mut jobs = self.jobs.lock().await;

        let mut due: Vec<NotificationJob> = jobs
            .values()
            .filter(|job| job.status == JobStatus::Pending && job.next_attempt_at <= now)
            .cloned()
            .collect();
        sort_for_dispatch(&mut due);
        due.truncate(limit);

        let mut claimed = Vec::with_capacity(due.len());
        for picked in due {
            if let Some(job) = jobs.get_mut(&picked.id) {
                job.status = JobStatus::Processing;
                job.updated_at = now;
                claimed.push(job.clone());
            }
        }

        claimed
    }

    /// Applies a successful delivery. No-ops unless the job is still
    /// `Processing` — a job cancelled or purged mid-flight discards its
    /// late outcome.
    pub async fn complete(&self, id: Uuid) -> bool {
        let mut jobs = self.jobs.lock().await;
        let Some(job) = jobs.get_mut(&id) else {
            return false;
        };
        if job.status != JobStatus::Processing {
            debug!(job_id = %id, status = %job.status, "Delivery outcome discarded");
            return false;
        }

        job.attempts += 1;
        job.status = JobStatus::Completed;
        job.last_error = None;
        job.updated_at = Utc::now();
        info!(job_id = %id, attempts = job.attempts, "Job completed");
        true
    }

    /// Applies a failed delivery: schedules a capped exponential backoff
    /// while attempts remain, otherwise parks the job as `Failed` for
    /// operator attention. Same `Processing` guard as `complete`.
    pub async fn fail(&self, id: Uuid, error: &str) -> bool {
        let mut jobs = self.jobs.lock().await;
        let Some(job) = jobs.get_mut(&id) else {
            return false;
        };
        if job.status != JobStatus::Processing {
            debug!(job_id = %id, status = %job.status, "Delivery outcome discarded");
            return false;
        }

        job.attempts += 1;
        job.last_error = Some(error.to_string());
        let now = Utc::now();
        job.updated_at = now;

        if job.attempts >= job.max_attempts {
            job.status = JobStatus::Failed;
            warn!(
                job_id = %id,
                attempts = job.attempts,
                error,
                "Job failed permanently (attempts exhausted)"
            );
        } else {
            let delay = retry_delay(job.attempts, &self.policy);
            job.status = JobStatus::Pending;
            job.next_attempt_at = now + delay;
            warn!(
                job_id = %id,
                attempts = job.attempts,
                delay_seconds = delay.num_seconds(),
                error,
                "Delivery attempt failed, retry scheduled"
            );
        }
        true
    }
}

/// `base * 2^(attempts-1)` seconds, overflow-safe, capped at the policy
/// maximum.
pub fn retry_delay(attempts: u32, policy: &QueuePolicy) -> Duration {
    let exponent = attempts.saturating_sub(1);
    let multiplier = if exponent >= 62 {
        i64::MAX
    } else {
        1_i64 << exponent
    };

    let seconds = policy
        .base_delay_seconds
        .saturating_mul(multiplier)
        .min(policy.max_delay_seconds);

    Duration::seconds(seconds)
}

/// Convenience: compute a cleanup cutoff like "now - N hours".
pub fn cutoff_hours(hours: i64) -> DateTime<Utc> {
    Utc::now() - Duration::hours(hours)
}

fn in_scope(job: &NotificationJob, scope: Option<&str>) -> bool {
    scope.is_none_or(|store_id| job.store_id == store_id)
}

fn sort_for_dispatch(jobs: &mut [NotificationJob]) {
    jobs.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| a.created_at.cmp(&b.created_at))
            .then_with(|| a.id.cmp(&b.id))
    });
}
