//! Notification history records.
//!
//! One record per send attempt. Records are never updated; a resend writes a
//! new record pointing at the original through `resend_of`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::foundation::{NotificationId, Timestamp, UserId, ValidationError};

use super::{RenderedTemplate, TemplateParams, TemplateType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    Sent,
    Failed,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Sent => "SENT",
            DeliveryStatus::Failed => "FAILED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SENT" => Some(DeliveryStatus::Sent),
            "FAILED" => Some(DeliveryStatus::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipientType {
    /// A contact person of a member organization.
    Member,
    /// Platform staff.
    Staff,
    /// Anyone else, e.g. a contact form submitter.
    External,
}

impl RecipientType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecipientType::Member => "member",
            RecipientType::Staff => "staff",
            RecipientType::External => "external",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "member" => Some(RecipientType::Member),
            "staff" => Some(RecipientType::Staff),
            "external" => Some(RecipientType::External),
            _ => None,
        }
    }
}

/// Who a notification is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    pub recipient_type: RecipientType,
    /// Id of the member or staff user, when known.
    #[serde(default)]
    pub recipient_id: Option<String>,
}

impl Recipient {
    pub fn new(email: impl Into<String>, recipient_type: RecipientType) -> Self {
        Self {
            email: email.into(),
            name: None,
            recipient_type,
            recipient_id: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(ValidationError::empty_field("recipient_email"));
        }
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
            _ => Err(ValidationError::invalid_format(
                "recipient_email",
                "expected local@domain",
            )),
        }
    }
}

/// One send attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationHistoryRecord {
    pub id: NotificationId,
    /// Stored as a string so records of retired templates stay readable.
    pub template_type: String,
    pub recipient: Recipient,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
    pub status: DeliveryStatus,
    pub error_message: Option<String>,
    pub sent_by_id: Option<UserId>,
    /// Template inputs the content was rendered from.
    pub metadata: Value,
    pub sent_at: Timestamp,
    pub resend_of: Option<NotificationId>,
}

impl NotificationHistoryRecord {
    /// Records an attempt of a known template.
    pub fn attempt(
        template_type: TemplateType,
        recipient: Recipient,
        content: &RenderedTemplate,
        params: &TemplateParams,
        sent_by_id: Option<UserId>,
        outcome: Result<(), String>,
    ) -> Self {
        Self::build(
            template_type.as_str().to_string(),
            recipient,
            content,
            params.to_value(),
            sent_by_id,
            outcome,
            None,
        )
    }

    /// Records a resend of `original` with the content actually sent this time.
    pub fn resend(
        original: &NotificationHistoryRecord,
        content: &RenderedTemplate,
        sent_by_id: Option<UserId>,
        outcome: Result<(), String>,
    ) -> Self {
        Self::build(
            original.template_type.clone(),
            original.recipient.clone(),
            content,
            original.metadata.clone(),
            sent_by_id,
            outcome,
            Some(original.id),
        )
    }

    /// Known template type, if this build can render it.
    pub fn known_template(&self) -> Option<TemplateType> {
        TemplateType::parse(&self.template_type)
    }

    /// The content stored on this record.
    pub fn stored_content(&self) -> RenderedTemplate {
        RenderedTemplate {
            subject: self.subject.clone(),
            html: self.html_body.clone(),
            text: self.text_body.clone(),
        }
    }

    pub fn is_sent(&self) -> bool {
        self.status == DeliveryStatus::Sent
    }

    fn build(
        template_type: String,
        recipient: Recipient,
        content: &RenderedTemplate,
        metadata: Value,
        sent_by_id: Option<UserId>,
        outcome: Result<(), String>,
        resend_of: Option<NotificationId>,
    ) -> Self {
        let (status, error_message) = match outcome {
            Ok(()) => (DeliveryStatus::Sent, None),
            Err(message) => (DeliveryStatus::Failed, Some(message)),
        };
        Self {
            id: NotificationId::new(),
            template_type,
            recipient,
            subject: content.subject.clone(),
            html_body: content.html.clone(),
            text_body: content.text.clone(),
            status,
            error_message,
            sent_by_id,
            metadata,
            sent_at: Timestamp::now(),
            resend_of,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn content() -> RenderedTemplate {
        RenderedTemplate {
            subject: "Hi".into(),
            html: "<p>Hi</p>".into(),
            text: "Hi".into(),
        }
    }

    fn recipient() -> Recipient {
        Recipient::new("ops@example.org", RecipientType::Staff)
    }

    #[test]
    fn failed_attempt_records_error() {
        let record = NotificationHistoryRecord::attempt(
            TemplateType::Welcome,
            recipient(),
            &content(),
            &TemplateParams::Generic(Map::new()),
            None,
            Err("smtp timeout".into()),
        );
        assert_eq!(record.status, DeliveryStatus::Failed);
        assert_eq!(record.error_message.as_deref(), Some("smtp timeout"));
        assert!(record.resend_of.is_none());
    }

    #[test]
    fn resend_points_to_original_with_new_id() {
        let original = NotificationHistoryRecord::attempt(
            TemplateType::Welcome,
            recipient(),
            &content(),
            &TemplateParams::Generic(Map::new()),
            None,
            Ok(()),
        );
        let resend = NotificationHistoryRecord::resend(&original, &content(), None, Ok(()));

        assert_ne!(resend.id, original.id);
        assert_eq!(resend.resend_of, Some(original.id));
        assert_eq!(resend.template_type, original.template_type);
        assert_eq!(resend.metadata, original.metadata);
    }

    #[test]
    fn recipient_email_must_look_like_an_address() {
        assert!(recipient().validate().is_ok());
        assert!(Recipient::new("", RecipientType::Member).validate().is_err());
        assert!(Recipient::new("nobody", RecipientType::Member).validate().is_err());
    }

    #[test]
    fn unknown_stored_template_type_is_not_known() {
        let mut record = NotificationHistoryRecord::attempt(
            TemplateType::Contact,
            recipient(),
            &content(),
            &TemplateParams::Generic(Map::new()),
            None,
            Ok(()),
        );
        assert_eq!(record.known_template(), Some(TemplateType::Contact));
        record.template_type = "EVENT_DIGEST".into();
        assert_eq!(record.known_template(), None);
    }
}
