use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::debug;

use crate::models::tenant::StoreSettings;

/// Read-mostly view of per-store notification settings. The platform owns
/// the canonical records; this core only needs keyed lookups and upserts.
#[derive(Default)]
pub struct TenantDirectory {
    stores: RwLock<HashMap<String, StoreSettings>>,
}

impl TenantDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn upsert(&self, store_id: &str, settings: StoreSettings) {
        debug!(store_id, "Store settings updated");
        self.stores
            .write()
            .await
            .insert(store_id.to_string(), settings);
    }

    pub async fn settings_for(&self, store_id: &str) -> Option<StoreSettings> {
        self.stores.read().await.get(store_id).cloned()
    }
}
