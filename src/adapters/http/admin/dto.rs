//! Request and response DTOs for admin endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::adapters::http::notifications::NotificationResponse;
use crate::adapters::http::ApiError;
use crate::application::handlers::{
    BatchResult, CreateSubscriptionResult, RollbackAuditEntryResult, UpdateContentFlagsResult,
};
use crate::domain::audit::AuditLogEntry;
use crate::domain::content::{ContentItem, ContentKind};
use crate::domain::foundation::OrganizationId;
use crate::domain::notification::{NotificationHistoryRecord, Recipient};
use crate::domain::subscription::{
    DiscountType, Feature, Invoice, PaymentMethod, PlanType, Subscription,
};

// ════════════════════════════════════════════════════════════════════════════════
// Requests
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubscriptionRequest {
    pub organization_id: String,
    pub plan_type: String,
    #[serde(default)]
    pub discount_type: Option<String>,
    pub payment_method: String,
}

/// Validated form of [`CreateSubscriptionRequest`].
#[derive(Debug, Clone, Copy)]
pub struct ParsedSubscriptionRequest {
    pub organization_id: OrganizationId,
    pub plan_type: PlanType,
    pub discount_type: DiscountType,
    pub payment_method: PaymentMethod,
}

impl CreateSubscriptionRequest {
    pub fn parse(&self) -> Result<ParsedSubscriptionRequest, ApiError> {
        let organization_id = parse_id(&self.organization_id, "organization_id")?;
        let plan_type = PlanType::parse(&self.plan_type)
            .ok_or_else(|| ApiError::bad_request(format!("Unknown plan type: {}", self.plan_type)))?;
        let discount_type = match self.discount_type.as_deref() {
            None | Some("") => DiscountType::None,
            Some(raw) => DiscountType::parse(raw)
                .ok_or_else(|| ApiError::bad_request(format!("Unknown discount type: {}", raw)))?,
        };
        let payment_method = PaymentMethod::parse(&self.payment_method).ok_or_else(|| {
            ApiError::bad_request(format!("Unknown payment method: {}", self.payment_method))
        })?;

        Ok(ParsedSubscriptionRequest {
            organization_id,
            plan_type,
            discount_type,
            payment_method,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditLogsQueryParams {
    pub resource_id: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendBatchRequest {
    pub template_type: String,
    #[serde(default)]
    pub params: Value,
    pub recipients: Vec<Recipient>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Responses
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionResponse {
    pub subscription: Subscription,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice: Option<Invoice>,
    pub entitlements: Vec<Feature>,
}

impl From<CreateSubscriptionResult> for SubscriptionResponse {
    fn from(result: CreateSubscriptionResult) -> Self {
        Self {
            subscription: result.subscription,
            invoice: result.invoice,
            entitlements: result.entitlements.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentResponse {
    pub item: ContentItem,
    /// False when the patch matched the stored flags and nothing was written.
    pub changed: bool,
}

impl From<UpdateContentFlagsResult> for ContentResponse {
    fn from(result: UpdateContentFlagsResult) -> Self {
        Self {
            item: result.item,
            changed: result.changed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogsResponse {
    pub entries: Vec<AuditLogEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollbackResponse {
    pub rolled_back: bool,
    pub message: String,
    pub rollback_entry_id: String,
    pub item: ContentItem,
}

impl From<RollbackAuditEntryResult> for RollbackResponse {
    fn from(result: RollbackAuditEntryResult) -> Self {
        Self {
            rolled_back: true,
            message: result.message,
            rollback_entry_id: result.rollback_entry.id.to_string(),
            item: result.restored,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResendResponse {
    pub success: bool,
    pub message: String,
    pub history_id: String,
}

impl From<&NotificationHistoryRecord> for ResendResponse {
    fn from(record: &NotificationHistoryRecord) -> Self {
        let message = if record.is_sent() {
            "Notification resent".to_string()
        } else {
            format!(
                "Resend failed: {}",
                record.error_message.as_deref().unwrap_or("unknown error")
            )
        };
        Self {
            success: record.is_sent(),
            message,
            history_id: record.id.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResponse {
    pub sent: usize,
    pub failed: usize,
    pub records: Vec<NotificationResponse>,
}

impl From<BatchResult> for BatchResponse {
    fn from(result: BatchResult) -> Self {
        Self {
            sent: result.sent,
            failed: result.failed,
            records: result.records.into_iter().map(Into::into).collect(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Path parsing
// ════════════════════════════════════════════════════════════════════════════════

pub fn parse_id<T: std::str::FromStr>(raw: &str, field: &str) -> Result<T, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid {}: {}", field, raw)))
}

pub fn parse_kind(raw: &str) -> Result<ContentKind, ApiError> {
    ContentKind::parse(raw)
        .ok_or_else(|| ApiError::bad_request(format!("Unknown content kind: {}", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ContentId, ErrorCode};

    fn request(discount: Option<&str>) -> CreateSubscriptionRequest {
        CreateSubscriptionRequest {
            organization_id: OrganizationId::new().to_string(),
            plan_type: "expert".to_string(),
            discount_type: discount.map(str::to_string),
            payment_method: "BANK_TRANSFER".to_string(),
        }
    }

    #[test]
    fn missing_discount_means_none() {
        let parsed = request(None).parse().unwrap();
        assert_eq!(parsed.discount_type, DiscountType::None);
        assert_eq!(parsed.plan_type, PlanType::Expert);
        assert_eq!(parsed.payment_method, PaymentMethod::BankTransfer);
    }

    #[test]
    fn unknown_discount_is_rejected() {
        let err = request(Some("FRIENDS")).parse().unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationFailed);
    }

    #[test]
    fn malformed_organization_id_is_rejected() {
        let mut req = request(None);
        req.organization_id = "org-1".to_string();
        assert!(req.parse().is_err());
    }

    #[test]
    fn path_ids_parse() {
        let id = ContentId::new();
        let parsed: ContentId = parse_id(&id.to_string(), "id").unwrap();
        assert_eq!(parsed, id);
        assert!(parse_id::<ContentId>("nope", "id").is_err());
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert!(parse_kind("event").is_ok());
        assert!(parse_kind("poster").is_err());
    }
}
