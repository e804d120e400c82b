//! In-memory processed gateway event store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::DomainError;
use crate::ports::{ProcessedEventStore, ProcessedGatewayEvent, SaveResult};

use super::FailureSwitch;

#[derive(Debug, Default)]
pub struct InMemoryProcessedEventStore {
    claims: RwLock<HashMap<String, ProcessedGatewayEvent>>,
    failure: FailureSwitch,
}

impl InMemoryProcessedEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every call fail with `error` until cleared with `None`.
    pub fn fail_with(&self, error: Option<DomainError>) {
        self.failure.set(error);
    }

    pub async fn len(&self) -> usize {
        self.claims.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.claims.read().await.is_empty()
    }
}

#[async_trait]
impl ProcessedEventStore for InMemoryProcessedEventStore {
    async fn claim(&self, event: &ProcessedGatewayEvent) -> Result<SaveResult, DomainError> {
        self.failure.check()?;
        let mut claims = self.claims.write().await;
        if claims.contains_key(&event.event_id) {
            return Ok(SaveResult::AlreadyExists);
        }
        claims.insert(event.event_id.clone(), event.clone());
        Ok(SaveResult::Inserted)
    }

    async fn release(&self, event_id: &str) -> Result<(), DomainError> {
        self.failure.check()?;
        self.claims.write().await.remove(event_id);
        Ok(())
    }

    async fn contains(&self, event_id: &str) -> Result<bool, DomainError> {
        self.failure.check()?;
        Ok(self.claims.read().await.contains_key(event_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_claim_inserts_second_reports_existing() {
        let store = InMemoryProcessedEventStore::new();
        let event = ProcessedGatewayEvent::new("evt_1", "invoice.paid");

        assert_eq!(store.claim(&event).await.unwrap(), SaveResult::Inserted);
        assert_eq!(store.claim(&event).await.unwrap(), SaveResult::AlreadyExists);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn released_event_can_be_claimed_again() {
        let store = InMemoryProcessedEventStore::new();
        let event = ProcessedGatewayEvent::new("evt_1", "invoice.paid");

        store.claim(&event).await.unwrap();
        store.release("evt_1").await.unwrap();

        assert!(!store.contains("evt_1").await.unwrap());
        assert_eq!(store.claim(&event).await.unwrap(), SaveResult::Inserted);
    }

    #[tokio::test]
    async fn injected_failure_is_returned() {
        let store = InMemoryProcessedEventStore::new();
        store.fail_with(Some(DomainError::transient("down")));
        let result = store.claim(&ProcessedGatewayEvent::new("evt_1", "x")).await;
        assert!(result.unwrap_err().is_retryable());
    }
}
