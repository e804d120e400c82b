//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations. Every
//! administrative handler takes the caller explicitly.

pub mod audit;
pub mod content;
pub mod notification;
pub mod subscription;

pub use audit::{
    AuditRecorder, ListAuditLogsHandler, ListAuditLogsQuery, RollbackAuditEntryCommand,
    RollbackAuditEntryHandler, RollbackAuditEntryResult,
};
pub use content::{
    DeleteContentCommand, DeleteContentHandler, UpdateContentFlagsCommand,
    UpdateContentFlagsHandler, UpdateContentFlagsResult,
};
pub use notification::{
    BatchResult, DeliveryTimeouts, NotificationDelivery, ResendNotificationCommand,
    ResendNotificationHandler, SendBatchCommand, SendNotificationCommand, SendNotificationHandler,
};
pub use subscription::{
    CreateSubscriptionCommand, CreateSubscriptionHandler, CreateSubscriptionResult,
    GatewayEventDispatcher, HandleGatewayWebhookCommand, HandleGatewayWebhookHandler,
    LifecycleOutcome, SubscriptionLifecycle, WebhookOutcome,
};
