//! Audit log repository port.
//!
//! Append and read only. Entries are never updated or deleted.

use async_trait::async_trait;

use crate::domain::audit::AuditLogEntry;
use crate::domain::foundation::{AuditLogId, DomainError};

#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    async fn append(&self, entry: &AuditLogEntry) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &AuditLogId) -> Result<Option<AuditLogEntry>, DomainError>;

    /// Newest first.
    async fn list_recent(&self, limit: u32) -> Result<Vec<AuditLogEntry>, DomainError>;

    /// All entries for one resource, newest first.
    async fn list_for_resource(&self, resource_id: &str)
        -> Result<Vec<AuditLogEntry>, DomainError>;
}
