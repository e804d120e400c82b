//! Shared application state.
//!
//! Cloned per request; every dependency is behind an `Arc`. Handlers are
//! built on demand from it.

use std::sync::Arc;

use crate::application::handlers::{
    AuditRecorder, CreateSubscriptionHandler, DeleteContentHandler, HandleGatewayWebhookHandler,
    ListAuditLogsHandler, NotificationDelivery, ResendNotificationHandler,
    RollbackAuditEntryHandler, SendNotificationHandler, SubscriptionLifecycle,
    UpdateContentFlagsHandler,
};
use crate::domain::payment::WebhookVerifier;
use crate::domain::subscription::BillingPolicy;
use crate::ports::{
    AuditLogRepository, ContentRepository, IdentityProvider, OrganizationRepository,
    ProcessedEventStore, SubscriptionRepository,
};

#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<dyn IdentityProvider>,
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    pub organizations: Arc<dyn OrganizationRepository>,
    pub content: Arc<dyn ContentRepository>,
    pub audit_log: Arc<dyn AuditLogRepository>,
    pub processed_events: Arc<dyn ProcessedEventStore>,
    pub notifications: NotificationDelivery,
    pub verifier: WebhookVerifier,
    pub policy: BillingPolicy,
}

impl AppState {
    pub fn audit_recorder(&self) -> AuditRecorder {
        AuditRecorder::new(self.audit_log.clone())
    }

    pub fn webhook_handler(&self) -> HandleGatewayWebhookHandler {
        let lifecycle =
            SubscriptionLifecycle::new(self.subscriptions.clone(), self.audit_recorder(), self.policy);
        HandleGatewayWebhookHandler::new(
            self.verifier.clone(),
            self.processed_events.clone(),
            Arc::new(lifecycle),
        )
    }

    pub fn create_subscription_handler(&self) -> CreateSubscriptionHandler {
        CreateSubscriptionHandler::new(
            self.subscriptions.clone(),
            self.organizations.clone(),
            self.audit_recorder(),
            self.policy,
        )
    }

    pub fn update_content_handler(&self) -> UpdateContentFlagsHandler {
        UpdateContentFlagsHandler::new(self.content.clone(), self.audit_recorder())
    }

    pub fn delete_content_handler(&self) -> DeleteContentHandler {
        DeleteContentHandler::new(self.content.clone(), self.audit_recorder())
    }

    pub fn rollback_handler(&self) -> RollbackAuditEntryHandler {
        RollbackAuditEntryHandler::new(self.audit_log.clone(), self.content.clone())
    }

    pub fn list_audit_logs_handler(&self) -> ListAuditLogsHandler {
        ListAuditLogsHandler::new(self.audit_log.clone())
    }

    pub fn send_notification_handler(&self) -> SendNotificationHandler {
        SendNotificationHandler::new(self.notifications.clone())
    }

    pub fn resend_notification_handler(&self) -> ResendNotificationHandler {
        ResendNotificationHandler::new(self.notifications.clone(), self.audit_recorder())
    }
}
