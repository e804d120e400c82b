//! Template types and their inputs.
//!
//! Inputs are a closed tagged union per template plus a generic fallback.
//! The stored form is what resend re-renders from.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::foundation::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TemplateType {
    Contact,
    Welcome,
    RenewalReminder,
    PaymentFailed,
}

impl TemplateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateType::Contact => "CONTACT",
            TemplateType::Welcome => "WELCOME",
            TemplateType::RenewalReminder => "RENEWAL_REMINDER",
            TemplateType::PaymentFailed => "PAYMENT_FAILED",
        }
    }

    /// `None` for template types this build does not know how to render.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CONTACT" => Some(TemplateType::Contact),
            "WELCOME" => Some(TemplateType::Welcome),
            "RENEWAL_REMINDER" => Some(TemplateType::RenewalReminder),
            "PAYMENT_FAILED" => Some(TemplateType::PaymentFailed),
            _ => None,
        }
    }
}

impl std::fmt::Display for TemplateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs for a contact form relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContactParams {
    pub sender_name: String,
    pub sender_email: String,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WelcomeParams {
    pub organization_name: String,
    pub plan_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenewalReminderParams {
    pub organization_name: String,
    /// Date the current period ends, `YYYY-MM-DD`.
    pub period_end: String,
    /// Renewal price in minor units.
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PaymentFailedParams {
    pub organization_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,
    pub amount: i64,
}

/// Recognized inputs, tagged by template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "template", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KnownParams {
    Contact(ContactParams),
    Welcome(WelcomeParams),
    RenewalReminder(RenewalReminderParams),
    PaymentFailed(PaymentFailedParams),
}

impl KnownParams {
    pub fn template_type(&self) -> TemplateType {
        match self {
            KnownParams::Contact(_) => TemplateType::Contact,
            KnownParams::Welcome(_) => TemplateType::Welcome,
            KnownParams::RenewalReminder(_) => TemplateType::RenewalReminder,
            KnownParams::PaymentFailed(_) => TemplateType::PaymentFailed,
        }
    }
}

/// Template inputs as sent and as stored in history metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemplateParams {
    Known(KnownParams),
    /// Free-form key/value inputs for templates without a typed shape.
    Generic(Map<String, Value>),
}

impl TemplateParams {
    /// Parses stored metadata. Objects that match no known shape become `Generic`.
    pub fn from_value(value: &Value) -> Option<Self> {
        match serde_json::from_value::<KnownParams>(value.clone()) {
            Ok(known) => Some(TemplateParams::Known(known)),
            Err(_) => value.as_object().cloned().map(TemplateParams::Generic),
        }
    }

    /// Rejects typed inputs that belong to a different template.
    pub fn validate_for(&self, template_type: TemplateType) -> Result<(), ValidationError> {
        match self {
            TemplateParams::Known(known) if known.template_type() != template_type => {
                Err(ValidationError::invalid_format(
                    "params",
                    format!(
                        "{} inputs cannot render {}",
                        known.template_type(),
                        template_type
                    ),
                ))
            }
            _ => Ok(()),
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Output of the template renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedTemplate {
    pub subject: String,
    pub html: String,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn contact() -> KnownParams {
        KnownParams::Contact(ContactParams {
            sender_name: "Ada".into(),
            sender_email: "ada@example.org".into(),
            subject: "Hello".into(),
            message: "Question about membership".into(),
        })
    }

    #[test]
    fn known_params_serialize_with_template_tag() {
        let value = TemplateParams::Known(contact()).to_value();
        assert_eq!(value["template"], "CONTACT");
        assert_eq!(value["sender_name"], "Ada");
    }

    #[test]
    fn stored_known_params_parse_back() {
        let value = TemplateParams::Known(contact()).to_value();
        assert_eq!(
            TemplateParams::from_value(&value),
            Some(TemplateParams::Known(contact()))
        );
    }

    #[test]
    fn unknown_shape_falls_back_to_generic() {
        let value = json!({ "headline": "Spring gala", "date": "2024-04-01" });
        match TemplateParams::from_value(&value) {
            Some(TemplateParams::Generic(map)) => assert_eq!(map.len(), 2),
            other => panic!("expected generic, got {:?}", other),
        }
    }

    #[test]
    fn non_object_metadata_is_none() {
        assert!(TemplateParams::from_value(&json!("text")).is_none());
    }

    #[test]
    fn mismatched_typed_params_are_rejected() {
        let params = TemplateParams::Known(contact());
        assert!(params.validate_for(TemplateType::Welcome).is_err());
        assert!(params.validate_for(TemplateType::Contact).is_ok());
    }

    #[test]
    fn generic_params_validate_for_any_template() {
        let params = TemplateParams::Generic(Map::new());
        assert!(params.validate_for(TemplateType::PaymentFailed).is_ok());
    }

    #[test]
    fn template_type_parse_rejects_unknown() {
        assert_eq!(TemplateType::parse("RENEWAL_REMINDER"), Some(TemplateType::RenewalReminder));
        assert_eq!(TemplateType::parse("EVENT_DIGEST"), None);
    }
}
