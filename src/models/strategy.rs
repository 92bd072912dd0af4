use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Strategy configuration as stored by the tenant settings screen. Every
/// field is optional and `components` may be a JSON array or a JSON-encoded
/// string (legacy rows stored it stringified).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawStrategyConfig {
    #[serde(default)]
    pub strategy: Option<String>,

    #[serde(default)]
    pub template_name: Option<String>,

    #[serde(default)]
    pub language_code: Option<String>,

    #[serde(default)]
    pub components: Option<Value>,
}

/// The resolved message shape for one delivery attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryStrategy {
    Text,
    Template {
        name: String,
        language_code: String,
        components: Option<Vec<Value>>,
    },
}
