//! Audit log entries.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::foundation::{AuditLogId, DomainError, Timestamp, UserId};

use super::{AuditAction, BeforeSnapshot, ContentSnapshot, RollbackClass};

/// Metadata key holding the before-state snapshot.
pub const BEFORE_KEY: &str = "before";

/// One immutable audit log row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: AuditLogId,
    /// `None` for system actions such as gateway-driven transitions.
    pub user_id: Option<UserId>,
    pub action: AuditAction,
    /// Identifier of the target resource.
    pub resource_id: String,
    /// JSON object. Update-class rollbackable entries carry `before`.
    pub metadata: Value,
    pub created_at: Timestamp,
}

impl AuditLogEntry {
    pub fn new(
        user_id: Option<UserId>,
        action: AuditAction,
        resource_id: impl Into<String>,
        metadata: Map<String, Value>,
    ) -> Self {
        Self {
            id: AuditLogId::new(),
            user_id,
            action,
            resource_id: resource_id.into(),
            metadata: Value::Object(metadata),
            created_at: Timestamp::now(),
        }
    }

    /// Builds the metadata object for a content update.
    pub fn update_metadata(
        snapshot: &ContentSnapshot,
        title: &str,
    ) -> Result<Map<String, Value>, DomainError> {
        let before = serde_json::to_value(snapshot)
            .map_err(|e| DomainError::permanent(format!("Unencodable snapshot: {}", e)))?;
        let mut metadata = Map::new();
        metadata.insert(BEFORE_KEY.to_string(), before);
        metadata.insert("title".to_string(), Value::String(title.to_string()));
        Ok(metadata)
    }

    /// The stored `before` value, if present and not null.
    pub fn before(&self) -> Option<BeforeSnapshot> {
        self.metadata
            .get(BEFORE_KEY)
            .filter(|v| !v.is_null())
            .map(BeforeSnapshot::from_value)
    }

    /// Checks the metadata contract for the action.
    ///
    /// Update-class rollbackable actions must carry a recognized, non-empty
    /// snapshot of the matching content kind.
    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.metadata.is_object() {
            return Err(DomainError::validation("metadata", "Metadata must be an object"));
        }
        if self.resource_id.trim().is_empty() {
            return Err(DomainError::validation("resource_id", "Resource id cannot be empty"));
        }

        let Some(rollbackable) = self.action.rollbackable() else {
            return Ok(());
        };
        if rollbackable.class() != RollbackClass::Update {
            return Ok(());
        }

        let snapshot = match self.before() {
            Some(BeforeSnapshot::Known(snapshot)) => snapshot,
            Some(BeforeSnapshot::Unrecognized(_)) => {
                return Err(DomainError::validation(
                    BEFORE_KEY,
                    format!("Unrecognized before snapshot for {}", self.action),
                ))
            }
            None => {
                return Err(DomainError::validation(
                    BEFORE_KEY,
                    format!("{} requires a before snapshot", self.action),
                ))
            }
        };

        if snapshot.kind() != rollbackable.content_kind() {
            return Err(DomainError::validation(
                BEFORE_KEY,
                format!(
                    "Snapshot of kind {} does not match {}",
                    snapshot.kind(),
                    self.action
                ),
            ));
        }
        if snapshot.is_empty() {
            return Err(DomainError::validation(BEFORE_KEY, "Snapshot captures no fields"));
        }
        Ok(())
    }
}
