use serde::Serialize;
use serde_json::Value;

/// Request body accepted by the messaging gateway: either a free-text
/// message or a pre-approved template, addressed to a phone-like destination.
#[derive(Debug, Clone, Serialize)]
pub struct GatewayRequest {
    pub to: String,

    #[serde(rename = "type")]
    pub message_type: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<TextContent>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<TemplateContent>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TextContent {
    pub body: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateContent {
    pub name: String,
    pub language: TemplateLanguage,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateLanguage {
    pub code: String,
}

impl GatewayRequest {
    pub fn text(to: &str, body: &str) -> Self {
        Self {
            to: to.to_string(),
            message_type: "text",
            text: Some(TextContent {
                body: body.to_string(),
            }),
            template: None,
        }
    }

    pub fn template(
        to: &str,
        name: &str,
        language_code: &str,
        components: Option<Vec<Value>>,
    ) -> Self {
        Self {
            to: to.to_string(),
            message_type: "template",
            text: None,
            template: Some(TemplateContent {
                name: name.to_string(),
                language: TemplateLanguage {
                    code: language_code.to_string(),
                },
                components,
            }),
        }
    }
}
