use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::strategy::RawStrategyConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayCredentials {
    pub account_id: String,
    pub access_token: String,

    #[serde(default)]
    pub api_version: Option<String>,
}

impl GatewayCredentials {
    pub fn is_usable(&self) -> bool {
        !self.account_id.trim().is_empty() && !self.access_token.trim().is_empty()
    }
}

/// Per-store notification settings: gateway credentials plus the delivery
/// strategy configured for each notification kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default)]
    pub credentials: Option<GatewayCredentials>,

    #[serde(default)]
    pub strategies: HashMap<String, RawStrategyConfig>,
}

impl StoreSettings {
    pub fn strategy_for(&self, kind: &str) -> Option<&RawStrategyConfig> {
        self.strategies.get(kind)
    }
}
