use serde_json::Value;
use tracing::debug;

use crate::models::strategy::{DeliveryStrategy, RawStrategyConfig};

/// Resolves stored strategy configuration into the shape used for one
/// delivery attempt. Total: malformed configuration degrades to free text,
/// never to an error.
pub fn resolve_strategy(
    raw: Option<&RawStrategyConfig>,
    default_language: &str,
) -> DeliveryStrategy {
    let Some(raw) = raw else {
        return DeliveryStrategy::Text;
    };

    if raw.strategy.as_deref() != Some("template") {
        return DeliveryStrategy::Text;
    }

    let name = match raw.template_name.as_deref() {
        Some(name) if !name.trim().is_empty() => name.to_string(),
        _ => {
            debug!("Template strategy configured without a template name, using text");
            return DeliveryStrategy::Text;
        }
    };

    let language_code = raw
        .language_code
        .as_deref()
        .filter(|code| !code.trim().is_empty())
        .unwrap_or(default_language)
        .to_string();

    // Legacy rows stored the component list as a JSON-encoded string.
    let components = match &raw.components {
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) => Some(items.clone()),
        Some(Value::String(encoded)) => match serde_json::from_str::<Value>(encoded) {
            Ok(Value::Array(items)) => Some(items),
            _ => {
                debug!(template = %name, "Unparsable template components, using text");
                return DeliveryStrategy::Text;
            }
        },
        Some(_) => {
            debug!(template = %name, "Unsupported components shape, using text");
            return DeliveryStrategy::Text;
        }
    };

    DeliveryStrategy::Template {
        name,
        language_code,
        components,
    }
}
