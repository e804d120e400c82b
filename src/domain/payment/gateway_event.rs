//! Payment gateway webhook event types.
//!
//! Only fields relevant to subscription processing are captured. Unknown
//! fields in the payload are ignored.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::WebhookError;

/// Billing reason the gateway reports on a renewal invoice.
pub const SUBSCRIPTION_CYCLE: &str = "subscription_cycle";

/// Gateway webhook event envelope.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayEvent {
    /// Unique identifier for the event. Idempotency key.
    pub id: String,

    /// Type of event (e.g., "checkout.session.completed").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Time at which the event was created (Unix timestamp).
    #[serde(default)]
    pub created: i64,

    pub data: GatewayEventData,

    #[serde(default)]
    pub livemode: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
}

/// Container for event-specific data.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayEventData {
    /// The object that triggered the event (shape depends on event type).
    pub object: serde_json::Value,
}

impl GatewayEvent {
    /// Parse the event type into a known enum variant.
    pub fn parsed_type(&self) -> GatewayEventType {
        GatewayEventType::parse(&self.event_type)
    }

    /// Deserializes the data object as the payload type for this event.
    pub fn object<T: serde::de::DeserializeOwned>(&self) -> Result<T, WebhookError> {
        serde_json::from_value(self.data.object.clone())
            .map_err(|e| WebhookError::ParseError(format!("{}: {}", self.event_type, e)))
    }
}

/// Gateway event types that drive the subscription lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayEventType {
    CheckoutSessionCompleted,
    InvoicePaid,
    InvoicePaymentFailed,
    SubscriptionDeleted,
    /// Acknowledged without side effects.
    Unknown,
}

impl GatewayEventType {
    pub fn parse(s: &str) -> Self {
        match s {
            "checkout.session.completed" => Self::CheckoutSessionCompleted,
            "invoice.paid" => Self::InvoicePaid,
            "invoice.payment_failed" => Self::InvoicePaymentFailed,
            "customer.subscription.deleted" => Self::SubscriptionDeleted,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CheckoutSessionCompleted => "checkout.session.completed",
            Self::InvoicePaid => "invoice.paid",
            Self::InvoicePaymentFailed => "invoice.payment_failed",
            Self::SubscriptionDeleted => "customer.subscription.deleted",
            Self::Unknown => "unknown",
        }
    }
}

/// `data.object` of a checkout-session-completed event.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CheckoutSession {
    /// Checkout session id.
    pub id: String,
    #[serde(default)]
    pub customer: Option<String>,
    /// Gateway subscription id created by the checkout.
    #[serde(default)]
    pub subscription: Option<String>,
    /// Gateway invoice id for the first payment, if any.
    #[serde(default)]
    pub invoice: Option<String>,
    #[serde(default)]
    pub amount_total: Option<i64>,
    /// Set by the checkout initiator: `organization_id`, `plan_type`, `discount_type`.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl CheckoutSession {
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// Idempotency key for the first invoice: the gateway invoice if present,
    /// otherwise the session itself.
    pub fn invoice_ref(&self) -> &str {
        self.invoice.as_deref().unwrap_or(&self.id)
    }
}

/// `data.object` of invoice events.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayInvoice {
    pub id: String,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub subscription: Option<String>,
    #[serde(default)]
    pub amount_paid: i64,
    #[serde(default)]
    pub amount_due: i64,
    #[serde(default)]
    pub billing_reason: Option<String>,
}

impl GatewayInvoice {
    /// True when this invoice pays for a new term of an existing subscription.
    pub fn is_renewal(&self) -> bool {
        self.billing_reason.as_deref() == Some(SUBSCRIPTION_CYCLE)
    }
}

/// `data.object` of subscription events.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewaySubscription {
    pub id: String,
    #[serde(default)]
    pub customer: Option<String>,
}

/// Builder for creating test GatewayEvent instances.
#[cfg(test)]
pub struct GatewayEventBuilder {
    id: String,
    event_type: String,
    created: i64,
    object: serde_json::Value,
}

#[cfg(test)]
impl Default for GatewayEventBuilder {
    fn default() -> Self {
        Self {
            id: "evt_test_123".to_string(),
            event_type: "checkout.session.completed".to_string(),
            created: chrono::Utc::now().timestamp(),
            object: serde_json::json!({}),
        }
    }
}

#[cfg(test)]
impl GatewayEventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = event_type.into();
        self
    }

    pub fn object(mut self, object: serde_json::Value) -> Self {
        self.object = object;
        self
    }

    pub fn build(self) -> GatewayEvent {
        GatewayEvent {
            id: self.id,
            event_type: self.event_type,
            created: self.created,
            data: GatewayEventData {
                object: self.object,
            },
            livemode: false,
            api_version: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_minimal_envelope() {
        let event: GatewayEvent = serde_json::from_value(json!({
            "id": "evt_1",
            "type": "invoice.paid",
            "data": { "object": { "id": "in_1" } }
        }))
        .unwrap();

        assert_eq!(event.parsed_type(), GatewayEventType::InvoicePaid);
        assert!(!event.livemode);
    }

    #[test]
    fn unknown_type_parses_as_unknown() {
        assert_eq!(
            GatewayEventType::parse("customer.created"),
            GatewayEventType::Unknown
        );
    }

    #[test]
    fn event_type_strings_round_trip() {
        for t in [
            GatewayEventType::CheckoutSessionCompleted,
            GatewayEventType::InvoicePaid,
            GatewayEventType::InvoicePaymentFailed,
            GatewayEventType::SubscriptionDeleted,
        ] {
            assert_eq!(GatewayEventType::parse(t.as_str()), t);
        }
    }

    #[test]
    fn checkout_session_reads_metadata_and_invoice_ref() {
        let event = GatewayEventBuilder::new()
            .object(json!({
                "id": "cs_1",
                "customer": "cus_1",
                "metadata": { "organization_id": "abc", "plan_type": "EXPERT", "discount_type": "" }
            }))
            .build();

        let session: CheckoutSession = event.object().unwrap();

        assert_eq!(session.metadata_value("plan_type"), Some("EXPERT"));
        assert_eq!(session.metadata_value("discount_type"), None);
        assert_eq!(session.invoice_ref(), "cs_1");
    }

    #[test]
    fn checkout_session_prefers_gateway_invoice_ref() {
        let session: CheckoutSession =
            serde_json::from_value(json!({ "id": "cs_1", "invoice": "in_7" })).unwrap();
        assert_eq!(session.invoice_ref(), "in_7");
    }

    #[test]
    fn invoice_renewal_detection() {
        let invoice: GatewayInvoice = serde_json::from_value(json!({
            "id": "in_1",
            "billing_reason": "subscription_cycle"
        }))
        .unwrap();
        assert!(invoice.is_renewal());

        let first: GatewayInvoice = serde_json::from_value(json!({
            "id": "in_2",
            "billing_reason": "subscription_create"
        }))
        .unwrap();
        assert!(!first.is_renewal());
    }

    #[test]
    fn object_with_wrong_shape_is_parse_error() {
        let event = GatewayEventBuilder::new().object(json!({ "nope": 1 })).build();
        let result: Result<GatewayInvoice, _> = event.object();
        assert!(matches!(result, Err(WebhookError::ParseError(_))));
    }
}
