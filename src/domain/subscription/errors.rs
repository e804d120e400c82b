//! Subscription-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | NotFound | 404 |
//! | AlreadyExists | 409 |
//! | InvalidTransition | 400 |
//! | ValidationFailed | 400 |
//! | Infrastructure | 503 |
//! | Rejected | per code |

use crate::domain::foundation::{DomainError, ErrorCode, OrganizationId};
use thiserror::Error;

use super::SubscriptionStatus;

/// Subscription-specific errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubscriptionError {
    #[error("Subscription not found: {0}")]
    NotFound(String),

    #[error("Organization {0} already has a pending or active subscription")]
    AlreadyExists(OrganizationId),

    #[error("Cannot transition subscription from {from} to {to}")]
    InvalidTransition {
        from: SubscriptionStatus,
        to: SubscriptionStatus,
    },

    #[error("Validation failed for '{field}': {message}")]
    ValidationFailed { field: String, message: String },

    #[error("Infrastructure error: {0}")]
    Infrastructure(String),

    /// Any other domain failure surfaced by a port, code preserved.
    #[error("{message}")]
    Rejected { code: ErrorCode, message: String },
}

impl SubscriptionError {
    pub fn not_found(what: impl Into<String>) -> Self {
        SubscriptionError::NotFound(what.into())
    }

    pub fn already_exists(organization_id: OrganizationId) -> Self {
        SubscriptionError::AlreadyExists(organization_id)
    }

    pub fn invalid_transition(from: SubscriptionStatus, to: SubscriptionStatus) -> Self {
        SubscriptionError::InvalidTransition { from, to }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        SubscriptionError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        SubscriptionError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            SubscriptionError::NotFound(_) => ErrorCode::NotFound,
            SubscriptionError::AlreadyExists(_) => ErrorCode::Conflict,
            SubscriptionError::InvalidTransition { .. } => ErrorCode::InvalidState,
            SubscriptionError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            SubscriptionError::Infrastructure(_) => ErrorCode::Transient,
            SubscriptionError::Rejected { code, .. } => *code,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.code().is_retryable()
    }
}

impl From<DomainError> for SubscriptionError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::NotFound => SubscriptionError::NotFound(err.message),
            ErrorCode::ValidationFailed => SubscriptionError::ValidationFailed {
                field: err.details.get("field").cloned().unwrap_or_default(),
                message: err.message,
            },
            ErrorCode::Transient => SubscriptionError::Infrastructure(err.message),
            code => SubscriptionError::Rejected {
                code,
                message: err.message,
            },
        }
    }
}

impl From<SubscriptionError> for DomainError {
    fn from(err: SubscriptionError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn already_exists_maps_to_conflict() {
        let err = SubscriptionError::already_exists(OrganizationId::new());
        assert_eq!(err.code(), ErrorCode::Conflict);
        assert!(!err.is_retryable());
    }

    #[test]
    fn invalid_transition_mentions_both_states() {
        let err = SubscriptionError::invalid_transition(
            SubscriptionStatus::Suspended,
            SubscriptionStatus::Active,
        );
        assert_eq!(
            err.to_string(),
            "Cannot transition subscription from SUSPENDED to ACTIVE"
        );
        assert_eq!(err.code(), ErrorCode::InvalidState);
    }

    #[test]
    fn datastore_failure_becomes_retryable_infrastructure() {
        let err: SubscriptionError = DomainError::transient("connection reset").into();
        assert!(err.is_retryable());
    }

    #[test]
    fn unique_violation_keeps_conflict_code() {
        let err: SubscriptionError = DomainError::conflict("duplicate key").into();
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[test]
    fn converts_into_domain_error_with_same_code() {
        let err: DomainError = SubscriptionError::not_found("sub_123").into();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
