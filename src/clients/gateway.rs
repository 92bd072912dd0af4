use std::time::Duration;

use anyhow::{Error, Result, anyhow};
use reqwest::Client;
use tracing::{debug, info, warn};
use url::form_urlencoded;

use crate::models::{
    gateway::GatewayRequest,
    outcome::{DeliveryOutcome, FailureReason},
    strategy::DeliveryStrategy,
    tenant::GatewayCredentials,
};

/// Stateless client for the messaging gateway: one bounded outbound call per
/// `send`, expected failures mapped to a typed outcome. Retrying is the
/// queue's job, not this client's.
pub struct GatewayClient {
    http_client: Client,
    base_url: String,
    default_api_version: String,
}

impl GatewayClient {
    pub fn new(
        base_url: &str,
        default_api_version: &str,
        timeout_seconds: u64,
    ) -> Result<Self, Error> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|_| anyhow!("Failed to create HTTP client"))?;

        info!(base_url, "Messaging gateway client initialized");

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            default_api_version: default_api_version.to_string(),
        })
    }

    pub async fn send(
        &self,
        destination: &str,
        body_text: &str,
        strategy: &DeliveryStrategy,
        credentials: Option<&GatewayCredentials>,
    ) -> DeliveryOutcome {
        if destination.trim().is_empty() {
            return DeliveryOutcome::Failed {
                reason: FailureReason::MissingDestination,
                detail: None,
                fallback_link: None,
            };
        }

        let Some(credentials) = credentials.filter(|c| c.is_usable()) else {
            warn!(destination, "No usable gateway credentials for delivery");
            return DeliveryOutcome::Failed {
                reason: FailureReason::MissingCredentials,
                detail: None,
                fallback_link: Some(fallback_link(destination, body_text)),
            };
        };

        let request = match strategy {
            DeliveryStrategy::Text => GatewayRequest::text(destination, body_text),
            DeliveryStrategy::Template {
                name,
                language_code,
                components,
            } => GatewayRequest::template(destination, name, language_code, components.clone()),
        };

        let api_version = credentials
            .api_version
            .as_deref()
            .unwrap_or(&self.default_api_version);
        let url = format!(
            "{}/{}/{}/messages",
            self.base_url, api_version, credentials.account_id
        );

        debug!(destination, url = %url, "Dispatching message to gateway");

        let response = match self
            .http_client
            .post(&url)
            .bearer_auth(&credentials.access_token)
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                return DeliveryOutcome::Failed {
                    reason: FailureReason::GatewayUnreachable,
                    detail: Some(e.to_string()),
                    fallback_link: Some(fallback_link(destination, body_text)),
                };
            }
        };

        if response.status().is_success() {
            info!(destination, "Message accepted by gateway");
            return DeliveryOutcome::Delivered;
        }

        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();

        DeliveryOutcome::Failed {
            reason: FailureReason::GatewayRejected,
            detail: Some(format!("{} {}", status, error_text)),
            fallback_link: Some(fallback_link(destination, body_text)),
        }
    }
}

/// Manual-contact deep-link: digits-only destination, message text
/// percent-encoded into the query.
pub fn fallback_link(destination: &str, body_text: &str) -> String {
    let digits: String = destination
        .chars()
        .filter(char::is_ascii_digit)
        .collect();
    let encoded: String = form_urlencoded::byte_serialize(body_text.as_bytes()).collect();

    format!("https://wa.me/{}?text={}", digits, encoded)
}
