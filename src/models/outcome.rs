use std::fmt::{Display, Formatter, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    MissingDestination,
    MissingCredentials,
    GatewayRejected,
    GatewayUnreachable,
}

impl FailureReason {
    /// Missing credentials is tenant misconfiguration: retries cannot heal it
    /// and operators need to see it called out distinctly.
    pub fn is_configuration(&self) -> bool {
        matches!(self, FailureReason::MissingCredentials)
    }
}

impl Display for FailureReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            FailureReason::MissingDestination => write!(f, "missing_destination"),
            FailureReason::MissingCredentials => write!(f, "missing_credentials"),
            FailureReason::GatewayRejected => write!(f, "gateway_rejected"),
            FailureReason::GatewayUnreachable => write!(f, "gateway_unreachable"),
        }
    }
}

/// Result of a single delivery attempt. Failures that still have a usable
/// destination carry a manual-contact deep-link so an operator can finish
/// the contact by hand.
#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryOutcome {
    Delivered,
    Failed {
        reason: FailureReason,
        detail: Option<String>,
        fallback_link: Option<String>,
    },
}

impl DeliveryOutcome {
    pub fn error_text(&self) -> Option<String> {
        match self {
            DeliveryOutcome::Delivered => None,
            DeliveryOutcome::Failed { reason, detail, .. } => Some(match detail {
                Some(detail) => format!("{}: {}", reason, detail),
                None => reason.to_string(),
            }),
        }
    }
}
