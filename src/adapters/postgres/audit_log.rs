//! PostgreSQL implementation of AuditLogRepository.
//!
//! The table is append-only; this adapter never updates or deletes rows.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use super::{corrupt, map_db_error};
use crate::domain::audit::{AuditAction, AuditLogEntry};
use crate::domain::foundation::{AuditLogId, DomainError, Timestamp, UserId};
use crate::ports::AuditLogRepository;

const ENTRY_COLUMNS: &str = "id, user_id, action, resource_id, metadata, created_at";

pub struct PostgresAuditLog {
    pool: PgPool,
}

impl PostgresAuditLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AuditLogRow {
    id: Uuid,
    user_id: Option<String>,
    action: String,
    resource_id: String,
    metadata: Json<Value>,
    created_at: DateTime<Utc>,
}

impl TryFrom<AuditLogRow> for AuditLogEntry {
    type Error = DomainError;

    fn try_from(row: AuditLogRow) -> Result<Self, Self::Error> {
        let user_id = match row.user_id {
            Some(raw) => Some(UserId::new(raw.clone()).map_err(|_| corrupt("user_id", &raw))?),
            None => None,
        };
        Ok(AuditLogEntry {
            id: AuditLogId::from_uuid(row.id),
            user_id,
            action: AuditAction::parse(&row.action)
                .ok_or_else(|| corrupt("action", &row.action))?,
            resource_id: row.resource_id,
            metadata: row.metadata.0,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

/// Inserts one entry on any executor, so callers can append inside their
/// own transaction.
pub(crate) async fn insert_entry<'e>(
    executor: impl PgExecutor<'e>,
    entry: &AuditLogEntry,
) -> Result<(), DomainError> {
    sqlx::query(
        r#"
        INSERT INTO audit_log (id, user_id, action, resource_id, metadata, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(entry.id.as_uuid())
    .bind(entry.user_id.as_ref().map(UserId::as_str))
    .bind(entry.action.as_str())
    .bind(&entry.resource_id)
    .bind(Json(&entry.metadata))
    .bind(entry.created_at.as_datetime())
    .execute(executor)
    .await
    .map_err(|e| map_db_error("Failed to append audit entry", e))?;

    Ok(())
}

#[async_trait]
impl AuditLogRepository for PostgresAuditLog {
    async fn append(&self, entry: &AuditLogEntry) -> Result<(), DomainError> {
        insert_entry(&self.pool, entry).await
    }

    async fn find_by_id(&self, id: &AuditLogId) -> Result<Option<AuditLogEntry>, DomainError> {
        let sql = format!("SELECT {} FROM audit_log WHERE id = $1", ENTRY_COLUMNS);
        let row: Option<AuditLogRow> = sqlx::query_as(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to load audit entry", e))?;

        row.map(AuditLogEntry::try_from).transpose()
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<AuditLogEntry>, DomainError> {
        let sql = format!(
            "SELECT {} FROM audit_log ORDER BY created_at DESC LIMIT $1",
            ENTRY_COLUMNS
        );
        let rows: Vec<AuditLogRow> = sqlx::query_as(&sql)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to list audit entries", e))?;

        rows.into_iter().map(AuditLogEntry::try_from).collect()
    }

    async fn list_for_resource(
        &self,
        resource_id: &str,
    ) -> Result<Vec<AuditLogEntry>, DomainError> {
        let sql = format!(
            "SELECT {} FROM audit_log WHERE resource_id = $1 ORDER BY created_at DESC",
            ENTRY_COLUMNS
        );
        let rows: Vec<AuditLogRow> = sqlx::query_as(&sql)
            .bind(resource_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to list audit entries", e))?;

        rows.into_iter().map(AuditLogEntry::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(action: &str) -> AuditLogRow {
        AuditLogRow {
            id: Uuid::new_v4(),
            user_id: Some("admin-1".to_string()),
            action: action.to_string(),
            resource_id: Uuid::new_v4().to_string(),
            metadata: Json(json!({ "before": { "kind": "event", "is_published": true } })),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn row_converts_with_metadata_intact() {
        let entry = AuditLogEntry::try_from(row("event.update")).unwrap();
        assert_eq!(entry.action, AuditAction::EventUpdate);
        assert_eq!(entry.metadata["before"]["is_published"], true);
        assert_eq!(entry.user_id.unwrap().as_str(), "admin-1");
    }

    #[test]
    fn system_entries_have_no_user() {
        let mut system = row("subscription.renew");
        system.user_id = None;
        assert!(AuditLogEntry::try_from(system).unwrap().user_id.is_none());
    }

    #[test]
    fn unknown_action_is_rejected() {
        assert!(AuditLogEntry::try_from(row("event.archive")).is_err());
    }
}
