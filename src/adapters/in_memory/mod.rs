//! In-memory adapters for every persistence port.
//!
//! They enforce the same uniqueness rules as the PostgreSQL schema so the
//! application layer can be tested against them. Each repository can be told
//! to fail its next calls, to exercise transient-failure paths.

mod audit_log;
mod content_repository;
mod notification_history;
mod organization_repository;
mod processed_event_store;
mod subscription_repository;

pub use audit_log::InMemoryAuditLog;
pub use content_repository::InMemoryContentRepository;
pub use notification_history::InMemoryNotificationHistory;
pub use organization_repository::InMemoryOrganizationRepository;
pub use processed_event_store::InMemoryProcessedEventStore;
pub use subscription_repository::InMemorySubscriptionRepository;

use std::sync::Mutex;

use crate::domain::foundation::DomainError;

/// Injected failure shared by the in-memory adapters.
#[derive(Debug, Default)]
pub(crate) struct FailureSwitch {
    next: Mutex<Option<DomainError>>,
}

impl FailureSwitch {
    pub(crate) fn set(&self, error: Option<DomainError>) {
        if let Ok(mut guard) = self.next.lock() {
            *guard = error;
        }
    }

    /// Returns the injected error, if any. The error stays armed until cleared.
    pub(crate) fn check(&self) -> Result<(), DomainError> {
        match self.next.lock() {
            Ok(guard) => match guard.as_ref() {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            },
            Err(_) => Err(DomainError::transient("failure switch lock poisoned")),
        }
    }

    /// Like `check`, but disarms the switch when it fires.
    pub(crate) fn take(&self) -> Result<(), DomainError> {
        match self.next.lock() {
            Ok(mut guard) => match guard.take() {
                Some(err) => Err(err),
                None => Ok(()),
            },
            Err(_) => Err(DomainError::transient("failure switch lock poisoned")),
        }
    }
}
