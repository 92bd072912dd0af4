use anyhow::{Error, Result, anyhow};
use dotenvy::dotenv;
use serde::Deserialize;

use crate::{queue::QueuePolicy, worker::WorkerSettings};

#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    pub server_port: u16,

    pub gateway_base_url: String,
    pub gateway_api_version: String,
    pub gateway_timeout_seconds: u64,

    pub default_language_code: String,

    pub max_delivery_attempts: u32,
    pub retry_base_delay_seconds: i64,
    pub retry_max_delay_seconds: i64,

    pub worker_poll_interval_ms: u64,
    pub worker_batch_size: usize,

    pub cleanup_interval_minutes: u64,
    pub job_retention_hours: i64,
}

impl Config {
    pub fn load() -> Result<Self, Error> {
        dotenv().ok();

        let config = envy::from_env::<Self>()
            .map_err(|_| anyhow!("Invalid or missing environmental variable"))?;
        Ok(config)
    }

    pub fn queue_policy(&self) -> QueuePolicy {
        QueuePolicy {
            max_attempts: self.max_delivery_attempts,
            base_delay_seconds: self.retry_base_delay_seconds,
            max_delay_seconds: self.retry_max_delay_seconds,
        }
    }

    pub fn worker_settings(&self) -> WorkerSettings {
        WorkerSettings {
            poll_interval_ms: self.worker_poll_interval_ms,
            batch_size: self.worker_batch_size,
            default_language_code: self.default_language_code.clone(),
        }
    }
}
