//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `SubscriptionRepository` - Subscriptions, invoices, entitlements
//! - `OrganizationRepository` - Subscribing organizations
//! - `ContentRepository` - Events and notices, transactional restore
//! - `AuditLogRepository` - Append-only audit log
//! - `NotificationHistoryRepository` - Append-only send history
//! - `ProcessedEventStore` - Gateway event idempotency table
//!
//! ## Collaborator Ports
//!
//! - `IdentityProvider` - Caller id and role for a request
//! - `TemplateRenderer` - Subject and bodies for a template
//! - `MailTransport` - Outbound mail

mod audit_log_repository;
mod content_repository;
mod identity_provider;
mod mail_transport;
mod notification_history_repository;
mod organization_repository;
mod processed_event_store;
mod subscription_repository;
mod template_renderer;

pub use audit_log_repository::AuditLogRepository;
pub use content_repository::ContentRepository;
pub use identity_provider::IdentityProvider;
pub use mail_transport::{MailTransport, OutgoingMail};
pub use notification_history_repository::NotificationHistoryRepository;
pub use organization_repository::OrganizationRepository;
pub use processed_event_store::{ProcessedEventStore, ProcessedGatewayEvent, SaveResult};
pub use subscription_repository::{SubscriptionChange, SubscriptionRepository, SubscriptionWrite};
pub use template_renderer::TemplateRenderer;
