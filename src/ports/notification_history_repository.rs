//! Notification history repository port. Append and read only.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, NotificationId};
use crate::domain::notification::NotificationHistoryRecord;

#[async_trait]
pub trait NotificationHistoryRepository: Send + Sync {
    async fn append(&self, record: &NotificationHistoryRecord) -> Result<(), DomainError>;

    async fn find_by_id(
        &self,
        id: &NotificationId,
    ) -> Result<Option<NotificationHistoryRecord>, DomainError>;

    /// Records whose `resend_of` is `id`, oldest first.
    async fn list_resends_of(
        &self,
        id: &NotificationId,
    ) -> Result<Vec<NotificationHistoryRecord>, DomainError>;
}
