//! PostgreSQL implementation of ContentRepository.
//!
//! `restore_with_audit` locks the row, applies the patch and appends the audit
//! entry in one transaction. Either both writes commit or neither does.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::audit_log::insert_entry;
use super::{corrupt, map_db_error};
use crate::domain::audit::AuditLogEntry;
use crate::domain::content::{ContentItem, ContentKind, FlagPatch};
use crate::domain::foundation::{ContentId, DomainError, Timestamp};
use crate::ports::ContentRepository;

pub struct PostgresContentRepository {
    pool: PgPool,
}

impl PostgresContentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ContentRow {
    id: Uuid,
    kind: String,
    title: String,
    is_published: bool,
    is_canceled: bool,
    is_deleted: bool,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ContentRow> for ContentItem {
    type Error = DomainError;

    fn try_from(row: ContentRow) -> Result<Self, Self::Error> {
        Ok(ContentItem {
            id: ContentId::from_uuid(row.id),
            kind: ContentKind::parse(&row.kind).ok_or_else(|| corrupt("kind", &row.kind))?,
            title: row.title,
            is_published: row.is_published,
            is_canceled: row.is_canceled,
            is_deleted: row.is_deleted,
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

const UPDATE_FLAGS: &str = r#"
    UPDATE content_items SET
        is_published = $2,
        is_canceled = $3,
        is_deleted = $4,
        updated_at = $5
    WHERE id = $1
"#;

#[async_trait]
impl ContentRepository for PostgresContentRepository {
    async fn save(&self, item: &ContentItem) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO content_items (id, kind, title, is_published, is_canceled, is_deleted, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                title = EXCLUDED.title,
                is_published = EXCLUDED.is_published,
                is_canceled = EXCLUDED.is_canceled,
                is_deleted = EXCLUDED.is_deleted,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(item.id.as_uuid())
        .bind(item.kind.as_str())
        .bind(&item.title)
        .bind(item.is_published)
        .bind(item.is_canceled)
        .bind(item.is_deleted)
        .bind(item.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to save content item", e))?;

        Ok(())
    }

    async fn find_by_id(&self, id: &ContentId) -> Result<Option<ContentItem>, DomainError> {
        let row: Option<ContentRow> = sqlx::query_as(
            r#"
            SELECT id, kind, title, is_published, is_canceled, is_deleted, updated_at
            FROM content_items WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to load content item", e))?;

        row.map(ContentItem::try_from).transpose()
    }

    async fn restore_with_audit(
        &self,
        id: &ContentId,
        patch: &FlagPatch,
        entry: &AuditLogEntry,
    ) -> Result<ContentItem, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_db_error("Failed to begin restore", e))?;

        let row: Option<ContentRow> = sqlx::query_as(
            r#"
            SELECT id, kind, title, is_published, is_canceled, is_deleted, updated_at
            FROM content_items WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_db_error("Failed to lock content item", e))?;

        let mut item = match row {
            Some(row) => ContentItem::try_from(row)?,
            None => return Err(DomainError::not_found("Content item", id)),
        };
        item.apply(patch, Timestamp::now());

        sqlx::query(UPDATE_FLAGS)
            .bind(item.id.as_uuid())
            .bind(item.is_published)
            .bind(item.is_canceled)
            .bind(item.is_deleted)
            .bind(item.updated_at.as_datetime())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_db_error("Failed to restore content item", e))?;

        insert_entry(&mut *tx, entry).await?;

        tx.commit()
            .await
            .map_err(|e| map_db_error("Failed to commit restore", e))?;

        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_converts_to_item() {
        let item = ContentItem::try_from(ContentRow {
            id: Uuid::new_v4(),
            kind: "notice".to_string(),
            title: "Office closed".to_string(),
            is_published: true,
            is_canceled: false,
            is_deleted: true,
            updated_at: Utc::now(),
        })
        .unwrap();
        assert_eq!(item.kind, ContentKind::Notice);
        assert!(item.is_deleted);
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let result = ContentItem::try_from(ContentRow {
            id: Uuid::new_v4(),
            kind: "page".to_string(),
            title: "About".to_string(),
            is_published: false,
            is_canceled: false,
            is_deleted: false,
            updated_at: Utc::now(),
        });
        assert!(result.is_err());
    }
}
