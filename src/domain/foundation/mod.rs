//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, timestamps, the caller identity, the state machine
//! trait and error types that form the vocabulary of the memberdesk domain.

mod caller;
mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use caller::{Caller, Role};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{
    AuditLogId, ContentId, InvoiceId, NotificationId, OrganizationId, SubscriptionId, UserId,
};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
