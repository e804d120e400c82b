//! Content repository port.

use async_trait::async_trait;

use crate::domain::audit::AuditLogEntry;
use crate::domain::content::{ContentItem, FlagPatch};
use crate::domain::foundation::{ContentId, DomainError};

#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Insert or update an item.
    async fn save(&self, item: &ContentItem) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &ContentId) -> Result<Option<ContentItem>, DomainError>;

    /// Applies `patch` to the item and appends `entry` to the audit log in one
    /// transaction. Either both are written or neither is.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the item does not exist
    /// - `Transient` on persistence failure, with nothing written
    async fn restore_with_audit(
        &self,
        id: &ContentId,
        patch: &FlagPatch,
        entry: &AuditLogEntry,
    ) -> Result<ContentItem, DomainError>;
}
