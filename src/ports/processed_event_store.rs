//! ProcessedEventStore port - Idempotency table for payment gateway events.
//!
//! The gateway may deliver the same event more than once (timeouts, 5xx
//! responses, its own retries). Each event id is claimed atomically before
//! any side effect. A claim is released only when processing failed in a way
//! the gateway's retry could fix.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Timestamp};

/// A claimed gateway event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedGatewayEvent {
    /// Gateway event id. Primary key.
    pub event_id: String,
    pub event_type: String,
    pub received_at: Timestamp,
}

impl ProcessedGatewayEvent {
    pub fn new(event_id: impl Into<String>, event_type: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            event_type: event_type.into(),
            received_at: Timestamp::now(),
        }
    }
}

/// Result of an insert guarded by a unique key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveResult {
    /// The row was inserted; the caller owns it.
    Inserted,
    /// A row with the same key already existed; nothing was written.
    AlreadyExists,
}

#[async_trait]
pub trait ProcessedEventStore: Send + Sync {
    /// Atomically claims the event id.
    ///
    /// Returns `AlreadyExists` if another delivery already claimed it.
    async fn claim(&self, event: &ProcessedGatewayEvent) -> Result<SaveResult, DomainError>;

    /// Removes a claim so a redelivery can process the event again.
    async fn release(&self, event_id: &str) -> Result<(), DomainError>;

    /// Returns true if the event id is currently claimed.
    async fn contains(&self, event_id: &str) -> Result<bool, DomainError>;
}
