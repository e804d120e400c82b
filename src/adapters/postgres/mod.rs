//! PostgreSQL adapters - sqlx implementations of the persistence ports.
//!
//! - `PostgresSubscriptionRepository` - Subscriptions, invoices, entitlements
//! - `PostgresOrganizationRepository` - Subscribing organizations
//! - `PostgresContentRepository` - Events and notices, transactional restore
//! - `PostgresAuditLog` - Append-only audit log
//! - `PostgresNotificationHistory` - Append-only send history
//! - `PostgresProcessedEventStore` - Gateway event idempotency claims
//!
//! The schema lives in `migrations/`. Uniqueness invariants are enforced by
//! constraints there and surface here as `Conflict`.

mod audit_log;
mod content_repository;
mod notification_history;
mod organization_repository;
mod processed_event_store;
mod subscription_repository;

pub use audit_log::PostgresAuditLog;
pub use content_repository::PostgresContentRepository;
pub use notification_history::PostgresNotificationHistory;
pub use organization_repository::PostgresOrganizationRepository;
pub use processed_event_store::PostgresProcessedEventStore;
pub use subscription_repository::PostgresSubscriptionRepository;

use crate::domain::foundation::DomainError;

/// SQLSTATE for unique_violation.
const UNIQUE_VIOLATION: &str = "23505";

/// Maps a sqlx error onto the domain taxonomy.
///
/// Unique violations become `Conflict`; rows that cannot be decoded are
/// `Permanent`; everything else is treated as a transient datastore failure.
pub(crate) fn map_db_error(context: &str, err: sqlx::Error) -> DomainError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            DomainError::conflict(format!(
                "{}: unique constraint {} violated",
                context,
                db_err.constraint().unwrap_or("unknown")
            ))
        }
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            DomainError::permanent(format!("{}: {}", context, err))
        }
        _ => DomainError::transient(format!("{}: {}", context, err)),
    }
}

/// Error for a stored value that no longer parses into its domain type.
pub(crate) fn corrupt(column: &str, value: &str) -> DomainError {
    DomainError::permanent(format!("Invalid {} value in database: {}", column, value))
}
