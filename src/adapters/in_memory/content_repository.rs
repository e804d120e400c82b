//! In-memory content repository.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::audit::AuditLogEntry;
use crate::domain::content::{ContentItem, FlagPatch};
use crate::domain::foundation::{ContentId, DomainError, Timestamp};
use crate::ports::ContentRepository;

use super::{FailureSwitch, InMemoryAuditLog};

#[derive(Debug)]
pub struct InMemoryContentRepository {
    items: RwLock<HashMap<ContentId, ContentItem>>,
    audit_log: InMemoryAuditLog,
    failure: FailureSwitch,
}

impl InMemoryContentRepository {
    /// Restores write their audit entries into `audit_log`.
    pub fn new(audit_log: InMemoryAuditLog) -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
            audit_log,
            failure: FailureSwitch::default(),
        }
    }

    /// Makes every call fail with `error` until cleared with `None`.
    pub fn fail_with(&self, error: Option<DomainError>) {
        self.failure.set(error);
    }

    /// Removes an item outright, as if it had been purged.
    pub async fn purge(&self, id: &ContentId) {
        self.items.write().await.remove(id);
    }
}

#[async_trait]
impl ContentRepository for InMemoryContentRepository {
    async fn save(&self, item: &ContentItem) -> Result<(), DomainError> {
        self.failure.check()?;
        self.items.write().await.insert(item.id, item.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &ContentId) -> Result<Option<ContentItem>, DomainError> {
        self.failure.check()?;
        Ok(self.items.read().await.get(id).cloned())
    }

    async fn restore_with_audit(
        &self,
        id: &ContentId,
        patch: &FlagPatch,
        entry: &AuditLogEntry,
    ) -> Result<ContentItem, DomainError> {
        self.failure.check()?;
        let mut items = self.items.write().await;
        let mut entries = self.audit_log.entries.write().await;

        let current = items
            .get(id)
            .ok_or_else(|| DomainError::not_found("Content item", id))?;
        // Either write may fail; check both before touching anything.
        self.audit_log.check()?;

        let mut restored = current.clone();
        restored.apply(patch, Timestamp::now());
        entries.push(entry.clone());
        items.insert(*id, restored.clone());
        Ok(restored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::audit::AuditAction;
    use crate::domain::content::ContentKind;
    use serde_json::Map;

    fn rollback_entry(id: &ContentId) -> AuditLogEntry {
        AuditLogEntry::new(None, AuditAction::AuditLogRollback, id.to_string(), Map::new())
    }

    #[tokio::test]
    async fn restore_applies_patch_and_appends_entry() {
        let log = InMemoryAuditLog::new();
        let repo = InMemoryContentRepository::new(log.clone());
        let mut item = ContentItem::new(ContentId::new(), ContentKind::Event, "AGM");
        item.is_deleted = true;
        repo.save(&item).await.unwrap();

        let patch = FlagPatch {
            is_deleted: Some(false),
            ..FlagPatch::default()
        };
        let restored = repo
            .restore_with_audit(&item.id, &patch, &rollback_entry(&item.id))
            .await
            .unwrap();

        assert!(!restored.is_deleted);
        assert_eq!(log.len().await, 1);
    }

    #[tokio::test]
    async fn audit_failure_leaves_item_untouched() {
        let log = InMemoryAuditLog::new();
        let repo = InMemoryContentRepository::new(log.clone());
        let mut item = ContentItem::new(ContentId::new(), ContentKind::Event, "AGM");
        item.is_deleted = true;
        repo.save(&item).await.unwrap();
        log.fail_with(Some(DomainError::transient("audit table locked")));

        let patch = FlagPatch {
            is_deleted: Some(false),
            ..FlagPatch::default()
        };
        let result = repo
            .restore_with_audit(&item.id, &patch, &rollback_entry(&item.id))
            .await;

        assert!(result.is_err());
        assert!(repo.find_by_id(&item.id).await.unwrap().unwrap().is_deleted);
        log.fail_with(None);
        assert!(log.is_empty().await);
    }

    #[tokio::test]
    async fn restore_of_missing_item_is_not_found() {
        let repo = InMemoryContentRepository::new(InMemoryAuditLog::new());
        let id = ContentId::new();
        let err = repo
            .restore_with_audit(&id, &FlagPatch::default(), &rollback_entry(&id))
            .await
            .unwrap_err();
        assert_eq!(err.code, crate::domain::foundation::ErrorCode::NotFound);
    }
}
