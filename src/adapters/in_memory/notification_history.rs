//! In-memory notification history.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, NotificationId};
use crate::domain::notification::NotificationHistoryRecord;
use crate::ports::NotificationHistoryRepository;

use super::FailureSwitch;

#[derive(Debug, Default)]
pub struct InMemoryNotificationHistory {
    records: RwLock<Vec<NotificationHistoryRecord>>,
    failure: FailureSwitch,
}

impl InMemoryNotificationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every call fail with `error` until cleared with `None`.
    pub fn fail_with(&self, error: Option<DomainError>) {
        self.failure.set(error);
    }

    pub async fn records(&self) -> Vec<NotificationHistoryRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl NotificationHistoryRepository for InMemoryNotificationHistory {
    async fn append(&self, record: &NotificationHistoryRecord) -> Result<(), DomainError> {
        self.failure.check()?;
        let mut records = self.records.write().await;
        if records.iter().any(|r| r.id == record.id) {
            return Err(DomainError::conflict(format!(
                "History record {} already exists",
                record.id
            )));
        }
        records.push(record.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &NotificationId,
    ) -> Result<Option<NotificationHistoryRecord>, DomainError> {
        self.failure.check()?;
        Ok(self.records.read().await.iter().find(|r| &r.id == id).cloned())
    }

    async fn list_resends_of(
        &self,
        id: &NotificationId,
    ) -> Result<Vec<NotificationHistoryRecord>, DomainError> {
        self.failure.check()?;
        Ok(self
            .records
            .read()
            .await
            .iter()
            .filter(|r| r.resend_of.as_ref() == Some(id))
            .cloned()
            .collect())
    }
}
