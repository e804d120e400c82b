//! ResendNotificationHandler - Command handler for replaying a recorded notification.
//!
//! Known template types are re-rendered from the inputs stored on the
//! original record. A render failure or timeout for a known type makes the
//! resend FAILED, as it would for a first send. Only unrecognized template
//! types replay the stored subject and bodies verbatim. The original record
//! is never modified; the resend gets its own record pointing back at it.

use serde_json::{Map, Value};

use crate::application::handlers::audit::AuditRecorder;
use crate::domain::audit::AuditAction;
use crate::domain::foundation::{Caller, DomainError, NotificationId};
use crate::domain::notification::{NotificationHistoryRecord, RenderedTemplate, TemplateParams};

use super::NotificationDelivery;

#[derive(Debug, Clone)]
pub struct ResendNotificationCommand {
    pub history_id: NotificationId,
}

pub struct ResendNotificationHandler {
    delivery: NotificationDelivery,
    audit: AuditRecorder,
}

impl ResendNotificationHandler {
    pub fn new(delivery: NotificationDelivery, audit: AuditRecorder) -> Self {
        Self { delivery, audit }
    }

    /// Returns the new history record, SENT or FAILED.
    ///
    /// # Errors
    ///
    /// - `Forbidden` if the caller is not an administrator
    /// - `NotFound` if the original record does not exist
    pub async fn handle(
        &self,
        caller: &Caller,
        cmd: ResendNotificationCommand,
    ) -> Result<NotificationHistoryRecord, DomainError> {
        caller.require_administrator()?;

        let original = self
            .delivery
            .history()
            .find_by_id(&cmd.history_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Notification", cmd.history_id))?;

        let (content, outcome) = match self.content_for(&original).await {
            Ok(content) => {
                let outcome = self.delivery.deliver(&original.recipient, &content).await;
                (content, outcome)
            }
            Err(message) => (original.stored_content(), Err(message)),
        };
        let record = NotificationHistoryRecord::resend(
            &original,
            &content,
            Some(caller.user_id.clone()),
            outcome,
        );
        self.delivery.persist(&record).await;

        tracing::info!(
            history_id = %record.id,
            resend_of = %original.id,
            status = ?record.status,
            user_id = %caller.user_id,
            "Notification resent"
        );

        let mut metadata = Map::new();
        metadata.insert(
            "resend_of".to_string(),
            Value::String(original.id.to_string()),
        );
        metadata.insert(
            "status".to_string(),
            Value::String(record.status.as_str().to_string()),
        );
        self.audit
            .record_best_effort(
                Some(caller.user_id.clone()),
                AuditAction::NotificationResend,
                record.id.to_string(),
                metadata,
            )
            .await;

        Ok(record)
    }

    /// The error is the message stored on the FAILED resend record.
    async fn content_for(
        &self,
        original: &NotificationHistoryRecord,
    ) -> Result<RenderedTemplate, String> {
        let Some(template_type) = original.known_template() else {
            return Ok(original.stored_content());
        };
        let params = TemplateParams::from_value(&original.metadata)
            .filter(|p| p.validate_for(template_type).is_ok())
            .ok_or_else(|| format!("stored inputs cannot render {}", template_type))?;

        self.delivery
            .render(template_type, &params)
            .await
            .map_err(|error| {
                tracing::warn!(
                    history_id = %original.id,
                    error = %error,
                    "Re-render failed; resend not delivered"
                );
                error
            })
    }
}
