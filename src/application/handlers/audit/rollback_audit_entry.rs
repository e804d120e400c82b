//! RollbackAuditEntryHandler - Command handler for reversing an audited mutation.
//!
//! Only the actions in [`RollbackableAction`] can be reversed:
//!
//! - delete-class entries clear the logical-delete flag unconditionally
//! - update-class entries restore exactly the fields in the `before` snapshot
//!
//! The restore and its `audit_log.rollback` entry are written in one
//! transaction. That entry is itself never rollbackable, so undo chains stop
//! at depth one.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::domain::audit::{
    AuditAction, AuditLogEntry, BeforeSnapshot, RollbackClass, RollbackableAction,
};
use crate::domain::content::{ContentItem, FlagPatch};
use crate::domain::foundation::{AuditLogId, Caller, ContentId, DomainError};
use crate::ports::{AuditLogRepository, ContentRepository};

#[derive(Debug, Clone)]
pub struct RollbackAuditEntryCommand {
    pub log_id: AuditLogId,
}

#[derive(Debug, Clone)]
pub struct RollbackAuditEntryResult {
    /// The new `audit_log.rollback` entry.
    pub rollback_entry: AuditLogEntry,
    /// The content item after the restore.
    pub restored: ContentItem,
    pub message: String,
}

pub struct RollbackAuditEntryHandler {
    audit_log: Arc<dyn AuditLogRepository>,
    content: Arc<dyn ContentRepository>,
}

impl RollbackAuditEntryHandler {
    pub fn new(
        audit_log: Arc<dyn AuditLogRepository>,
        content: Arc<dyn ContentRepository>,
    ) -> Self {
        Self { audit_log, content }
    }

    /// # Errors
    ///
    /// - `Forbidden` if the caller is not an administrator or the action is not rollbackable
    /// - `NotFound` if the entry or its target no longer exists
    /// - `InvalidState` if an update entry carries no `before` snapshot
    /// - `Permanent` if the stored snapshot is unrecognized or does not fit the action
    pub async fn handle(
        &self,
        caller: &Caller,
        cmd: RollbackAuditEntryCommand,
    ) -> Result<RollbackAuditEntryResult, DomainError> {
        caller.require_administrator()?;

        let entry = self
            .audit_log
            .find_by_id(&cmd.log_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Audit log entry", cmd.log_id))?;

        let action = entry.action.rollbackable().ok_or_else(|| {
            DomainError::forbidden(format!("Action {} cannot be rolled back", entry.action))
        })?;

        let content_id: ContentId = entry.resource_id.parse().map_err(|_| {
            DomainError::permanent(format!(
                "Audit entry {} targets an unparseable resource id",
                entry.id
            ))
        })?;

        let item = self
            .content
            .find_by_id(&content_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Content item", content_id))?;

        if item.kind != action.content_kind() {
            return Err(DomainError::permanent(format!(
                "Audit entry {} is {} but resource is a {}",
                entry.id, entry.action, item.kind
            )));
        }

        let patch = restore_patch(&entry, action)?;

        let mut metadata = Map::new();
        metadata.insert(
            "rolled_back_entry_id".to_string(),
            Value::String(entry.id.to_string()),
        );
        metadata.insert(
            "original_action".to_string(),
            Value::String(entry.action.to_string()),
        );
        metadata.insert(
            "restored".to_string(),
            serde_json::to_value(patch)
                .map_err(|e| DomainError::permanent(format!("Unencodable patch: {}", e)))?,
        );
        let rollback_entry = AuditLogEntry::new(
            Some(caller.user_id.clone()),
            AuditAction::AuditLogRollback,
            entry.resource_id.clone(),
            metadata,
        );
        rollback_entry.validate()?;

        let restored = self
            .content
            .restore_with_audit(&content_id, &patch, &rollback_entry)
            .await?;

        tracing::info!(
            rolled_back_entry_id = %entry.id,
            rollback_entry_id = %rollback_entry.id,
            action = %entry.action,
            resource_id = %entry.resource_id,
            user_id = %caller.user_id,
            "Audit entry rolled back"
        );

        Ok(RollbackAuditEntryResult {
            message: format!("Rolled back {} on {}", entry.action, entry.resource_id),
            rollback_entry,
            restored,
        })
    }
}

/// The writes that undo `entry`.
fn restore_patch(
    entry: &AuditLogEntry,
    action: RollbackableAction,
) -> Result<FlagPatch, DomainError> {
    match action.class() {
        RollbackClass::Delete => Ok(FlagPatch {
            is_deleted: Some(false),
            ..FlagPatch::default()
        }),
        RollbackClass::Update => match entry.before() {
            None => Err(DomainError::invalid_state(format!(
                "Audit entry {} has no before snapshot",
                entry.id
            ))),
            Some(BeforeSnapshot::Unrecognized(_)) => Err(DomainError::permanent(format!(
                "Audit entry {} has an unrecognized before snapshot",
                entry.id
            ))),
            Some(BeforeSnapshot::Known(snapshot)) => {
                if snapshot.kind() != action.content_kind() || snapshot.is_empty() {
                    return Err(DomainError::permanent(format!(
                        "Before snapshot of entry {} does not fit {}",
                        entry.id, entry.action
                    )));
                }
                Ok(snapshot.to_patch())
            }
        },
    }
}
