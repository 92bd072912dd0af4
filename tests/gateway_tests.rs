use anyhow::Result;
use notify_service::clients::gateway::{GatewayClient, fallback_link};
use notify_service::models::outcome::{DeliveryOutcome, FailureReason};
use notify_service::models::strategy::DeliveryStrategy;
use notify_service::models::tenant::GatewayCredentials;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credentials() -> GatewayCredentials {
    GatewayCredentials {
        account_id: "123456".to_string(),
        access_token: "secret-token".to_string(),
        api_version: None,
    }
}

/// Test: Free-text messages post the gateway's text wire shape
#[tokio::test]
async fn test_text_message_wire_format() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/123456/messages"))
        .and(header("authorization", "Bearer secret-token"))
        .and(body_partial_json(json!({
            "to": "+541112345678",
            "type": "text",
            "text": {"body": "Your order is ready."}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "messages": [{"id": "gw.1"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = GatewayClient::new(&server.uri(), "v1", 5)?;
    let outcome = client
        .send(
            "+541112345678",
            "Your order is ready.",
            &DeliveryStrategy::Text,
            Some(&credentials()),
        )
        .await;

    assert_eq!(outcome, DeliveryOutcome::Delivered);

    Ok(())
}

/// Test: Template messages post name, language, and components
#[tokio::test]
async fn test_template_message_wire_format() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/123456/messages"))
        .and(body_partial_json(json!({
            "to": "+541112345678",
            "type": "template",
            "template": {
                "name": "order_update",
                "language": {"code": "es_AR"},
                "components": [
                    {"type": "body", "parameters": [{"type": "text", "text": "A-100"}]}
                ]
            }
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let strategy = DeliveryStrategy::Template {
        name: "order_update".to_string(),
        language_code: "es_AR".to_string(),
        components: Some(vec![json!({
            "type": "body",
            "parameters": [{"type": "text", "text": "A-100"}]
        })]),
    };

    let client = GatewayClient::new(&server.uri(), "v1", 5)?;
    let outcome = client
        .send("+541112345678", "fallback text", &strategy, Some(&credentials()))
        .await;

    assert_eq!(outcome, DeliveryOutcome::Delivered);

    Ok(())
}

/// Test: A per-tenant API version overrides the client default
#[tokio::test]
async fn test_tenant_api_version_override() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v19.0/123456/messages"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut credentials = credentials();
    credentials.api_version = Some("v19.0".to_string());

    let client = GatewayClient::new(&server.uri(), "v1", 5)?;
    let outcome = client
        .send("+541112345678", "hello", &DeliveryStrategy::Text, Some(&credentials))
        .await;

    assert_eq!(outcome, DeliveryOutcome::Delivered);

    Ok(())
}

/// Test: Non-2xx responses preserve the raw gateway error for diagnostics
#[tokio::test]
async fn test_rejection_preserves_gateway_error() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("unknown recipient"))
        .mount(&server)
        .await;

    let client = GatewayClient::new(&server.uri(), "v1", 5)?;
    let outcome = client
        .send("+541112345678", "hello", &DeliveryStrategy::Text, Some(&credentials()))
        .await;

    match outcome {
        DeliveryOutcome::Failed {
            reason,
            detail,
            fallback_link,
        } => {
            assert_eq!(reason, FailureReason::GatewayRejected);
            let detail = detail.expect("detail should carry the gateway error");
            assert!(detail.contains("500"), "Detail was: {}", detail);
            assert!(detail.contains("unknown recipient"), "Detail was: {}", detail);
            assert!(fallback_link.is_some(), "Rejections keep the manual link");
        }
        other => panic!("expected a failed outcome, got {:?}", other),
    }

    Ok(())
}

/// Test: An unreachable gateway maps to a distinct failure reason
#[tokio::test]
async fn test_unreachable_gateway() -> Result<()> {
    let client = GatewayClient::new("http://127.0.0.1:9", "v1", 2)?;
    let outcome = client
        .send("+541112345678", "hello", &DeliveryStrategy::Text, Some(&credentials()))
        .await;

    match outcome {
        DeliveryOutcome::Failed { reason, detail, .. } => {
            assert_eq!(reason, FailureReason::GatewayUnreachable);
            assert!(detail.is_some(), "Transport errors keep their detail");
        }
        other => panic!("expected a failed outcome, got {:?}", other),
    }

    Ok(())
}

/// Test: An empty destination is rejected before any network call
#[tokio::test]
async fn test_missing_destination() -> Result<()> {
    let client = GatewayClient::new("http://127.0.0.1:9", "v1", 2)?;
    let outcome = client
        .send("  ", "hello", &DeliveryStrategy::Text, Some(&credentials()))
        .await;

    assert_eq!(
        outcome,
        DeliveryOutcome::Failed {
            reason: FailureReason::MissingDestination,
            detail: None,
            fallback_link: None,
        }
    );

    Ok(())
}

/// Test: Missing credentials synthesize a manual-contact link
#[tokio::test]
async fn test_missing_credentials_synthesizes_fallback() -> Result<()> {
    let client = GatewayClient::new("http://127.0.0.1:9", "v1", 2)?;
    let outcome = client
        .send("+541112345678", "Your order is ready.", &DeliveryStrategy::Text, None)
        .await;

    match outcome {
        DeliveryOutcome::Failed {
            reason,
            fallback_link: Some(link),
            ..
        } => {
            assert_eq!(reason, FailureReason::MissingCredentials);
            assert_eq!(link, fallback_link("+541112345678", "Your order is ready."));
            assert!(
                link.starts_with("https://wa.me/541112345678?text="),
                "Link was: {}",
                link
            );
            assert!(!link.contains(' '), "Message text must be encoded");
        }
        other => panic!("expected a credentials failure, got {:?}", other),
    }

    Ok(())
}

/// Test: Blank credentials are treated the same as absent ones
#[tokio::test]
async fn test_blank_credentials_treated_as_missing() -> Result<()> {
    let blank = GatewayCredentials {
        account_id: "123456".to_string(),
        access_token: "   ".to_string(),
        api_version: None,
    };

    let client = GatewayClient::new("http://127.0.0.1:9", "v1", 2)?;
    let outcome = client
        .send("+541112345678", "hello", &DeliveryStrategy::Text, Some(&blank))
        .await;

    match outcome {
        DeliveryOutcome::Failed { reason, .. } => {
            assert_eq!(reason, FailureReason::MissingCredentials);
        }
        other => panic!("expected a credentials failure, got {:?}", other),
    }

    Ok(())
}
