use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::adapters::http::ApiError;
use crate::domain::foundation::Timestamp;
use crate::domain::notification::{
    DeliveryStatus, NotificationHistoryRecord, Recipient, TemplateParams, TemplateType,
};

#[derive(Debug, Clone, Deserialize)]
pub struct SendNotificationRequest {
    pub template_type: String,
    #[serde(default)]
    pub params: Value,
    pub recipient: Recipient,
}

/// One history record as returned to clients. Bodies are omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationResponse {
    pub history_id: String,
    pub template_type: String,
    pub recipient_email: String,
    pub subject: String,
    pub status: DeliveryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub sent_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resend_of: Option<String>,
}

impl From<NotificationHistoryRecord> for NotificationResponse {
    fn from(record: NotificationHistoryRecord) -> Self {
        Self {
            history_id: record.id.to_string(),
            template_type: record.template_type,
            recipient_email: record.recipient.email,
            subject: record.subject,
            status: record.status,
            error_message: record.error_message,
            sent_at: record.sent_at,
            resend_of: record.resend_of.map(|id| id.to_string()),
        }
    }
}

pub fn parse_template_type(raw: &str) -> Result<TemplateType, ApiError> {
    TemplateType::parse(raw)
        .ok_or_else(|| ApiError::bad_request(format!("Unknown template type: {}", raw)))
}

/// Missing params are treated as an empty generic map.
pub fn parse_params(raw: &Value) -> Result<TemplateParams, ApiError> {
    if raw.is_null() {
        return Ok(TemplateParams::Generic(Default::default()));
    }
    TemplateParams::from_value(raw)
        .ok_or_else(|| ApiError::bad_request("params must be a JSON object"))
}
