//! Webhook error types for payment gateway webhook handling.
//!
//! Defines all error conditions that can occur during webhook processing,
//! with HTTP status code mapping and retryability semantics.

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::subscription::SubscriptionError;

/// Errors that occur during webhook processing.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Webhook signature verification failed.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Signature header could not be read, so the payload cannot be verified.
    #[error("Malformed signature header: {0}")]
    MalformedSignature(&'static str),

    /// Webhook timestamp is older than the tolerance window.
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// Event timestamp is in the future beyond clock skew tolerance.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// Verified payload is not a well-formed event.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Required metadata field missing from webhook event.
    #[error("Missing metadata: {0}")]
    MissingMetadata(&'static str),

    /// Required field missing from webhook payload.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// No subscription matches the event's external references.
    #[error("Subscription not found: {0}")]
    SubscriptionNotFound(String),

    /// Attempted state transition is not valid.
    #[error("Invalid state transition: {0}")]
    InvalidTransition(String),

    /// Applying the event would violate a uniqueness invariant.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Event was intentionally ignored (not an error condition).
    #[error("Event ignored: {0}")]
    Ignored(String),

    /// Datastore operation failed.
    #[error("Database error: {0}")]
    Database(String),
}

impl WebhookError {
    /// Returns true if the gateway should retry delivering this webhook.
    ///
    /// Only downstream failures are retryable. Everything that depends on
    /// the event content will fail the same way on redelivery.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WebhookError::Database(_))
    }

    /// Returns true if the signature or timestamp could not be verified.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            WebhookError::InvalidSignature
                | WebhookError::MalformedSignature(_)
                | WebhookError::TimestampOutOfRange
                | WebhookError::InvalidTimestamp
        )
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            WebhookError::InvalidSignature
            | WebhookError::MalformedSignature(_)
            | WebhookError::TimestampOutOfRange
            | WebhookError::InvalidTimestamp => ErrorCode::Unauthorized,
            WebhookError::ParseError(_)
            | WebhookError::MissingMetadata(_)
            | WebhookError::MissingField(_) => ErrorCode::ValidationFailed,
            WebhookError::SubscriptionNotFound(_) => ErrorCode::NotFound,
            WebhookError::InvalidTransition(_) => ErrorCode::InvalidState,
            WebhookError::Conflict(_) => ErrorCode::Conflict,
            WebhookError::Ignored(_) => ErrorCode::InvalidState,
            WebhookError::Database(_) => ErrorCode::Transient,
        }
    }

    /// Maps the error to an HTTP status code.
    ///
    /// Status codes determine the gateway's retry behavior:
    /// - 2xx: Event acknowledged, no retry
    /// - 4xx: Client error, no retry
    /// - 5xx: Server error, will retry
    ///
    /// Errors raised while applying a verified event are acknowledged with
    /// 200 so the gateway does not retry an event that can never succeed.
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::InvalidSignature
            | WebhookError::MalformedSignature(_)
            | WebhookError::TimestampOutOfRange
            | WebhookError::InvalidTimestamp => StatusCode::UNAUTHORIZED,

            WebhookError::ParseError(_) => StatusCode::BAD_REQUEST,

            WebhookError::MissingMetadata(_)
            | WebhookError::MissingField(_)
            | WebhookError::SubscriptionNotFound(_)
            | WebhookError::InvalidTransition(_)
            | WebhookError::Conflict(_)
            | WebhookError::Ignored(_) => StatusCode::OK,

            WebhookError::Database(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<DomainError> for WebhookError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::NotFound => WebhookError::SubscriptionNotFound(err.message),
            ErrorCode::Conflict => WebhookError::Conflict(err.message),
            ErrorCode::InvalidState => WebhookError::InvalidTransition(err.message),
            ErrorCode::ValidationFailed | ErrorCode::Permanent => {
                WebhookError::ParseError(err.message)
            }
            _ => WebhookError::Database(err.message),
        }
    }
}

impl From<SubscriptionError> for WebhookError {
    fn from(err: SubscriptionError) -> Self {
        match err {
            SubscriptionError::NotFound(what) => WebhookError::SubscriptionNotFound(what),
            SubscriptionError::AlreadyExists(org) => {
                WebhookError::Conflict(format!("organization {} already subscribed", org))
            }
            SubscriptionError::InvalidTransition { .. } => {
                WebhookError::InvalidTransition(err.to_string())
            }
            SubscriptionError::ValidationFailed { .. } => WebhookError::ParseError(err.to_string()),
            SubscriptionError::Infrastructure(msg) => WebhookError::Database(msg),
            SubscriptionError::Rejected { code, message } => {
                WebhookError::from(DomainError::new(code, message))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ══════════════════════════════════════════════════════════════
    // Error Display Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn invalid_signature_displays_correctly() {
        assert_eq!(format!("{}", WebhookError::InvalidSignature), "Invalid signature");
    }

    #[test]
    fn missing_metadata_displays_field_name() {
        let err = WebhookError::MissingMetadata("organization_id");
        assert_eq!(format!("{}", err), "Missing metadata: organization_id");
    }

    // ══════════════════════════════════════════════════════════════
    // Retryability Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn database_error_is_retryable() {
        assert!(WebhookError::Database("connection failed".to_string()).is_retryable());
    }

    #[test]
    fn subscription_not_found_is_not_retryable() {
        assert!(!WebhookError::SubscriptionNotFound("cus_1".to_string()).is_retryable());
    }

    #[test]
    fn invalid_signature_is_not_retryable() {
        assert!(!WebhookError::InvalidSignature.is_retryable());
    }

    #[test]
    fn malformed_signature_header_is_an_authentication_failure() {
        let err = WebhookError::MalformedSignature("missing timestamp");
        assert!(err.is_authentication_failure());
        assert_eq!(err.code(), ErrorCode::Unauthorized);
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }

    // ══════════════════════════════════════════════════════════════
    // Status Code Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn auth_failures_return_401() {
        assert_eq!(WebhookError::InvalidSignature.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(WebhookError::TimestampOutOfRange.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(WebhookError::InvalidTimestamp.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn permanent_processing_errors_are_acknowledged() {
        for err in [
            WebhookError::MissingMetadata("plan_type"),
            WebhookError::SubscriptionNotFound("cus_1".into()),
            WebhookError::InvalidTransition("x".into()),
            WebhookError::Conflict("dup".into()),
        ] {
            assert_eq!(err.status_code(), StatusCode::OK, "{}", err);
        }
    }

    #[test]
    fn transient_errors_return_503() {
        let err = WebhookError::Database("pool timed out".into());
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.code(), ErrorCode::Transient);
    }

    // ══════════════════════════════════════════════════════════════
    // Conversion Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn transient_domain_error_becomes_database_error() {
        let err: WebhookError = DomainError::transient("db down").into();
        assert!(err.is_retryable());
    }

    #[test]
    fn conflict_domain_error_is_acknowledged() {
        let err: WebhookError = DomainError::conflict("unique violation").into();
        assert!(matches!(err, WebhookError::Conflict(_)));
        assert!(!err.is_retryable());
    }
}
