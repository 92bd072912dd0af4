use notify_service::models::strategy::{DeliveryStrategy, RawStrategyConfig};
use notify_service::strategy::resolve_strategy;
use serde_json::{Value, json};

fn template_config(components: Option<Value>) -> RawStrategyConfig {
    RawStrategyConfig {
        strategy: Some("template".to_string()),
        template_name: Some("order_update".to_string()),
        language_code: Some("es_AR".to_string()),
        components,
    }
}

fn expect_template(strategy: DeliveryStrategy) -> (String, String, Option<Vec<Value>>) {
    match strategy {
        DeliveryStrategy::Template {
            name,
            language_code,
            components,
        } => (name, language_code, components),
        DeliveryStrategy::Text => panic!("expected a template strategy"),
    }
}

/// Test: Missing configuration resolves to free text
#[test]
fn test_absent_config_resolves_to_text() {
    assert_eq!(resolve_strategy(None, "en"), DeliveryStrategy::Text);
}

/// Test: Explicit text strategy resolves to free text
#[test]
fn test_text_strategy_resolves_to_text() {
    let config = RawStrategyConfig {
        strategy: Some("text".to_string()),
        ..RawStrategyConfig::default()
    };

    assert_eq!(resolve_strategy(Some(&config), "en"), DeliveryStrategy::Text);
}

/// Test: Template with an array components field resolves intact
#[test]
fn test_template_with_array_components() {
    let components = json!([
        {"type": "body", "parameters": [{"type": "text", "text": "A-100"}]}
    ]);
    let config = template_config(Some(components.clone()));

    let (name, language, resolved) = expect_template(resolve_strategy(Some(&config), "en"));
    assert_eq!(name, "order_update");
    assert_eq!(language, "es_AR");
    assert_eq!(resolved, Some(components.as_array().unwrap().clone()));
}

/// Test: Legacy JSON-string components are parsed like arrays
#[test]
fn test_template_with_json_string_components() {
    let encoded = r#"[{"type":"body","parameters":[{"type":"text","text":"A-100"}]}]"#;
    let config = template_config(Some(Value::String(encoded.to_string())));

    let (_, _, resolved) = expect_template(resolve_strategy(Some(&config), "en"));
    let resolved = resolved.expect("components should survive the string encoding");
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0]["type"], "body");
}

/// Test: Unparsable components degrade the whole strategy to text
#[test]
fn test_malformed_string_components_fall_back_to_text() {
    let config = template_config(Some(Value::String("{not json".to_string())));
    assert_eq!(resolve_strategy(Some(&config), "en"), DeliveryStrategy::Text);

    let config = template_config(Some(Value::String("\"an array this is not\"".to_string())));
    assert_eq!(resolve_strategy(Some(&config), "en"), DeliveryStrategy::Text);

    let config = template_config(Some(json!({"type": "body"})));
    assert_eq!(
        resolve_strategy(Some(&config), "en"),
        DeliveryStrategy::Text,
        "A bare object is not a component list"
    );
}

/// Test: Template without a name degrades to text
#[test]
fn test_template_without_name_falls_back_to_text() {
    let mut config = template_config(None);
    config.template_name = None;
    assert_eq!(resolve_strategy(Some(&config), "en"), DeliveryStrategy::Text);

    let mut config = template_config(None);
    config.template_name = Some("   ".to_string());
    assert_eq!(resolve_strategy(Some(&config), "en"), DeliveryStrategy::Text);
}

/// Test: Missing language code defaults to the configured locale
#[test]
fn test_missing_language_defaults() {
    let mut config = template_config(None);
    config.language_code = None;

    let (_, language, components) = expect_template(resolve_strategy(Some(&config), "en"));
    assert_eq!(language, "en");
    assert!(components.is_none());
}

/// Test: Null components are treated as absent, not as an error
#[test]
fn test_null_components_are_absent() {
    let config = template_config(Some(Value::Null));

    let (_, _, components) = expect_template(resolve_strategy(Some(&config), "en"));
    assert!(components.is_none());
}
