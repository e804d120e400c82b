//! In-memory audit log.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::audit::{AuditAction, AuditLogEntry};
use crate::domain::foundation::{AuditLogId, DomainError};
use crate::ports::AuditLogRepository;

use super::FailureSwitch;

/// Cloneable handle; clones share the same log.
///
/// [`InMemoryContentRepository`](super::InMemoryContentRepository) holds a
/// clone so restore and audit append happen under one lock.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuditLog {
    pub(crate) entries: Arc<RwLock<Vec<AuditLogEntry>>>,
    failure: Arc<FailureSwitch>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every call fail with `error` until cleared with `None`.
    pub fn fail_with(&self, error: Option<DomainError>) {
        self.failure.set(error);
    }

    pub(crate) fn check(&self) -> Result<(), DomainError> {
        self.failure.check()
    }

    // === Test Helpers ===

    pub async fn entries(&self) -> Vec<AuditLogEntry> {
        self.entries.read().await.clone()
    }

    pub async fn entries_with_action(&self, action: AuditAction) -> Vec<AuditLogEntry> {
        self.entries
            .read()
            .await
            .iter()
            .filter(|e| e.action == action)
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl AuditLogRepository for InMemoryAuditLog {
    async fn append(&self, entry: &AuditLogEntry) -> Result<(), DomainError> {
        self.check()?;
        self.entries.write().await.push(entry.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &AuditLogId) -> Result<Option<AuditLogEntry>, DomainError> {
        self.check()?;
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .find(|e| &e.id == id)
            .cloned())
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<AuditLogEntry>, DomainError> {
        self.check()?;
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .rev()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn list_for_resource(
        &self,
        resource_id: &str,
    ) -> Result<Vec<AuditLogEntry>, DomainError> {
        self.check()?;
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .rev()
            .filter(|e| e.resource_id == resource_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn entry(resource: &str) -> AuditLogEntry {
        AuditLogEntry::new(None, AuditAction::SubscriptionCancel, resource, Map::new())
    }

    #[tokio::test]
    async fn list_recent_is_newest_first_and_limited() {
        let log = InMemoryAuditLog::new();
        for r in ["a", "b", "c"] {
            log.append(&entry(r)).await.unwrap();
        }

        let recent = log.list_recent(2).await.unwrap();

        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].resource_id, "c");
        assert_eq!(recent[1].resource_id, "b");
    }

    #[tokio::test]
    async fn list_for_resource_filters() {
        let log = InMemoryAuditLog::new();
        log.append(&entry("a")).await.unwrap();
        log.append(&entry("b")).await.unwrap();
        log.append(&entry("a")).await.unwrap();

        assert_eq!(log.list_for_resource("a").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn clones_share_entries() {
        let log = InMemoryAuditLog::new();
        let clone = log.clone();
        clone.append(&entry("a")).await.unwrap();
        assert_eq!(log.len().await, 1);
    }
}
