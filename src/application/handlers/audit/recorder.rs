//! AuditRecorder - validates and appends audit entries.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::domain::audit::{AuditAction, AuditLogEntry};
use crate::domain::foundation::{DomainError, UserId};
use crate::ports::AuditLogRepository;

/// Appends audit entries after checking the metadata contract.
#[derive(Clone)]
pub struct AuditRecorder {
    repository: Arc<dyn AuditLogRepository>,
}

impl AuditRecorder {
    pub fn new(repository: Arc<dyn AuditLogRepository>) -> Self {
        Self { repository }
    }

    /// Validates and appends an entry.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if an update-class rollbackable action lacks a matching snapshot
    /// - Whatever the repository returns
    pub async fn record(
        &self,
        user_id: Option<UserId>,
        action: AuditAction,
        resource_id: impl Into<String>,
        metadata: Map<String, Value>,
    ) -> Result<AuditLogEntry, DomainError> {
        let entry = AuditLogEntry::new(user_id, action, resource_id, metadata);
        entry.validate()?;
        self.repository.append(&entry).await?;
        Ok(entry)
    }

    /// Records an entry for a mutation that has already been committed.
    ///
    /// Failures are logged and swallowed: the primary mutation stands even if
    /// its audit row could not be written.
    pub async fn record_best_effort(
        &self,
        user_id: Option<UserId>,
        action: AuditAction,
        resource_id: impl Into<String>,
        metadata: Map<String, Value>,
    ) -> Option<AuditLogEntry> {
        let resource_id = resource_id.into();
        match self
            .record(user_id, action, resource_id.clone(), metadata)
            .await
        {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::warn!(
                    action = %action,
                    resource_id = %resource_id,
                    error = %err,
                    "Failed to write audit entry"
                );
                None
            }
        }
    }
}
