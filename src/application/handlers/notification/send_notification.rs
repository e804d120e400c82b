//! SendNotificationHandler - Command handler for single and batch sends.

use crate::domain::foundation::{Caller, DomainError};
use crate::domain::notification::{
    NotificationHistoryRecord, Recipient, RenderedTemplate, TemplateParams, TemplateType,
};

use super::NotificationDelivery;

#[derive(Debug, Clone)]
pub struct SendNotificationCommand {
    pub template_type: TemplateType,
    pub params: TemplateParams,
    pub recipient: Recipient,
}

#[derive(Debug, Clone)]
pub struct SendBatchCommand {
    pub template_type: TemplateType,
    pub params: TemplateParams,
    pub recipients: Vec<Recipient>,
}

/// Outcome of a batch. Every recipient is counted exactly once.
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    pub sent: usize,
    pub failed: usize,
    pub records: Vec<NotificationHistoryRecord>,
}

/// Sends notifications. CONTACT messages may be sent by any caller; every
/// other template requires an administrator.
pub struct SendNotificationHandler {
    delivery: NotificationDelivery,
}

impl SendNotificationHandler {
    pub fn new(delivery: NotificationDelivery) -> Self {
        Self { delivery }
    }

    /// Sends one notification and records the attempt.
    ///
    /// Delivery failure is not an error: the returned record is FAILED.
    ///
    /// # Errors
    ///
    /// - `Forbidden` if the caller may not send this template
    /// - `ValidationFailed` for a malformed recipient or mismatched inputs
    pub async fn send(
        &self,
        caller: &Caller,
        cmd: SendNotificationCommand,
    ) -> Result<NotificationHistoryRecord, DomainError> {
        authorize(caller, cmd.template_type)?;
        cmd.recipient.validate()?;
        cmd.params.validate_for(cmd.template_type)?;

        let rendered = self.delivery.render(cmd.template_type, &cmd.params).await;
        Ok(self
            .attempt(caller, cmd.template_type, &cmd.params, cmd.recipient, &rendered)
            .await)
    }

    /// Sends to each recipient in turn. One recipient's failure does not
    /// affect the others.
    pub async fn send_batch(
        &self,
        caller: &Caller,
        cmd: SendBatchCommand,
    ) -> Result<BatchResult, DomainError> {
        caller.require_administrator()?;
        cmd.params.validate_for(cmd.template_type)?;

        let rendered = self.delivery.render(cmd.template_type, &cmd.params).await;
        let mut result = BatchResult::default();

        for recipient in cmd.recipients {
            if let Err(err) = recipient.validate() {
                tracing::warn!(
                    recipient = %recipient.email,
                    error = %err,
                    "Skipping invalid batch recipient"
                );
                result.failed += 1;
                continue;
            }
            let record = self
                .attempt(caller, cmd.template_type, &cmd.params, recipient, &rendered)
                .await;
            if record.is_sent() {
                result.sent += 1;
            } else {
                result.failed += 1;
            }
            result.records.push(record);
        }

        tracing::info!(
            template_type = %cmd.template_type,
            sent = result.sent,
            failed = result.failed,
            "Notification batch finished"
        );
        Ok(result)
    }

    async fn attempt(
        &self,
        caller: &Caller,
        template_type: TemplateType,
        params: &TemplateParams,
        recipient: Recipient,
        rendered: &Result<RenderedTemplate, String>,
    ) -> NotificationHistoryRecord {
        let (content, outcome) = match rendered {
            Ok(content) => (
                content.clone(),
                self.delivery.deliver(&recipient, content).await,
            ),
            Err(message) => (
                RenderedTemplate {
                    subject: String::new(),
                    html: String::new(),
                    text: String::new(),
                },
                Err(message.clone()),
            ),
        };

        let record = NotificationHistoryRecord::attempt(
            template_type,
            recipient,
            &content,
            params,
            Some(caller.user_id.clone()),
            outcome,
        );
        self.delivery.persist(&record).await;

        if let Some(error) = &record.error_message {
            tracing::warn!(
                history_id = %record.id,
                template_type = %template_type,
                error = %error,
                "Notification not delivered"
            );
        }
        record
    }
}

fn authorize(caller: &Caller, template_type: TemplateType) -> Result<(), DomainError> {
    match template_type {
        TemplateType::Contact => Ok(()),
        _ => caller.require_administrator(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::in_memory::InMemoryNotificationHistory;
    use crate::adapters::mail::RecordingMailTransport;
    use crate::adapters::templates::BuiltinTemplateRenderer;
    use crate::domain::foundation::{ErrorCode, Role, UserId};
    use crate::domain::notification::{
        ContactParams, DeliveryStatus, KnownParams, RecipientType, WelcomeParams,
    };
    use std::sync::Arc;
    use std::time::Duration;

    use super::super::DeliveryTimeouts;

    struct Fixture {
        transport: Arc<RecordingMailTransport>,
        history: Arc<InMemoryNotificationHistory>,
        handler: SendNotificationHandler,
    }

    fn fixture(timeouts: DeliveryTimeouts) -> Fixture {
        let transport = Arc::new(RecordingMailTransport::new());
        let history = Arc::new(InMemoryNotificationHistory::new());
        let delivery = NotificationDelivery::new(
            Arc::new(BuiltinTemplateRenderer::default()),
            transport.clone(),
            history.clone(),
            timeouts,
        );
        Fixture {
            transport,
            history,
            handler: SendNotificationHandler::new(delivery),
        }
    }

    fn admin() -> Caller {
        Caller::administrator(UserId::new("admin-1").unwrap())
    }

    fn welcome() -> TemplateParams {
        TemplateParams::Known(KnownParams::Welcome(WelcomeParams {
            organization_name: "Harbour Guild".into(),
            plan_type: "STANDARD".into(),
        }))
    }

    fn contact() -> TemplateParams {
        TemplateParams::Known(KnownParams::Contact(ContactParams {
            sender_name: "Ada".into(),
            sender_email: "ada@example.org".into(),
            subject: "Venue".into(),
            message: "Is the hall free?".into(),
        }))
    }

    #[tokio::test]
    async fn send_records_one_sent_entry() {
        let f = fixture(DeliveryTimeouts::default());

        let record = f
            .handler
            .send(
                &admin(),
                SendNotificationCommand {
                    template_type: TemplateType::Welcome,
                    params: welcome(),
                    recipient: Recipient::new("office@harbour.org", RecipientType::Member),
                },
            )
            .await
            .unwrap();

        assert_eq!(record.status, DeliveryStatus::Sent);
        assert_eq!(f.history.records().await, vec![record]);
        assert_eq!(f.transport.sent().await.len(), 1);
    }

    #[tokio::test]
    async fn transport_timeout_records_failed_entry() {
        let f = fixture(DeliveryTimeouts {
            render: Duration::from_secs(1),
            send: Duration::from_millis(20),
        });
        f.transport.delay_by(Duration::from_millis(200)).await;

        let record = f
            .handler
            .send(
                &admin(),
                SendNotificationCommand {
                    template_type: TemplateType::Welcome,
                    params: welcome(),
                    recipient: Recipient::new("office@harbour.org", RecipientType::Member),
                },
            )
            .await
            .unwrap();

        assert_eq!(record.status, DeliveryStatus::Failed);
        assert!(record.error_message.unwrap().contains("timed out"));
        assert_eq!(f.history.records().await.len(), 1);
    }

    #[tokio::test]
    async fn member_may_send_contact_but_not_welcome() {
        let f = fixture(DeliveryTimeouts::default());
        let member = Caller::new(UserId::new("m-1").unwrap(), Role::Member);
        let to = Recipient::new("desk@memberdesk.org", RecipientType::Staff);

        let contact = f
            .handler
            .send(
                &member,
                SendNotificationCommand {
                    template_type: TemplateType::Contact,
                    params: contact(),
                    recipient: to.clone(),
                },
            )
            .await;
        let welcome = f
            .handler
            .send(
                &member,
                SendNotificationCommand {
                    template_type: TemplateType::Welcome,
                    params: welcome(),
                    recipient: to,
                },
            )
            .await;

        assert!(contact.is_ok());
        assert_eq!(welcome.unwrap_err().code, ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn batch_isolates_failures() {
        let f = fixture(DeliveryTimeouts::default());
        f.transport.reject("bounced@harbour.org").await;

        let result = f
            .handler
            .send_batch(
                &admin(),
                SendBatchCommand {
                    template_type: TemplateType::Welcome,
                    params: welcome(),
                    recipients: vec![
                        Recipient::new("a@harbour.org", RecipientType::Member),
                        Recipient::new("bounced@harbour.org", RecipientType::Member),
                        Recipient::new("not-an-address", RecipientType::Member),
                        Recipient::new("b@harbour.org", RecipientType::Member),
                    ],
                },
            )
            .await
            .unwrap();

        assert_eq!(result.sent, 2);
        assert_eq!(result.failed, 2);
        assert_eq!(f.history.records().await.len(), 3);
    }

    #[tokio::test]
    async fn history_failure_does_not_fail_send() {
        let f = fixture(DeliveryTimeouts::default());
        f.history
            .fail_with(Some(DomainError::transient("history table locked")));

        let record = f
            .handler
            .send(
                &admin(),
                SendNotificationCommand {
                    template_type: TemplateType::Welcome,
                    params: welcome(),
                    recipient: Recipient::new("office@harbour.org", RecipientType::Member),
                },
            )
            .await
            .unwrap();

        assert!(record.is_sent());
    }
}
