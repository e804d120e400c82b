//! PostgreSQL implementation of NotificationHistoryRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::{corrupt, map_db_error};
use crate::domain::foundation::{DomainError, NotificationId, Timestamp, UserId};
use crate::domain::notification::{DeliveryStatus, NotificationHistoryRecord, Recipient};
use crate::ports::NotificationHistoryRepository;

const RECORD_COLUMNS: &str = r#"
    id, template_type, recipient, subject, html_body, text_body,
    status, error_message, sent_by_id, metadata, sent_at, resend_of
"#;

pub struct PostgresNotificationHistory {
    pool: PgPool,
}

impl PostgresNotificationHistory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct HistoryRow {
    id: Uuid,
    template_type: String,
    recipient: Json<Recipient>,
    subject: String,
    html_body: String,
    text_body: String,
    status: String,
    error_message: Option<String>,
    sent_by_id: Option<String>,
    metadata: Json<Value>,
    sent_at: DateTime<Utc>,
    resend_of: Option<Uuid>,
}

impl TryFrom<HistoryRow> for NotificationHistoryRecord {
    type Error = DomainError;

    fn try_from(row: HistoryRow) -> Result<Self, Self::Error> {
        let sent_by_id = match row.sent_by_id {
            Some(raw) => Some(UserId::new(raw.clone()).map_err(|_| corrupt("sent_by_id", &raw))?),
            None => None,
        };
        Ok(NotificationHistoryRecord {
            id: NotificationId::from_uuid(row.id),
            template_type: row.template_type,
            recipient: row.recipient.0,
            subject: row.subject,
            html_body: row.html_body,
            text_body: row.text_body,
            status: DeliveryStatus::parse(&row.status)
                .ok_or_else(|| corrupt("delivery status", &row.status))?,
            error_message: row.error_message,
            sent_by_id,
            metadata: row.metadata.0,
            sent_at: Timestamp::from_datetime(row.sent_at),
            resend_of: row.resend_of.map(NotificationId::from_uuid),
        })
    }
}

#[async_trait]
impl NotificationHistoryRepository for PostgresNotificationHistory {
    async fn append(&self, record: &NotificationHistoryRecord) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO notification_history (
                id, template_type, recipient, subject, html_body, text_body,
                status, error_message, sent_by_id, metadata, sent_at, resend_of
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(&record.template_type)
        .bind(Json(&record.recipient))
        .bind(&record.subject)
        .bind(&record.html_body)
        .bind(&record.text_body)
        .bind(record.status.as_str())
        .bind(&record.error_message)
        .bind(record.sent_by_id.as_ref().map(UserId::as_str))
        .bind(Json(&record.metadata))
        .bind(record.sent_at.as_datetime())
        .bind(record.resend_of.as_ref().map(NotificationId::as_uuid))
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to append notification history", e))?;

        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &NotificationId,
    ) -> Result<Option<NotificationHistoryRecord>, DomainError> {
        let sql = format!("SELECT {} FROM notification_history WHERE id = $1", RECORD_COLUMNS);
        let row: Option<HistoryRow> = sqlx::query_as(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to load notification", e))?;

        row.map(NotificationHistoryRecord::try_from).transpose()
    }

    async fn list_resends_of(
        &self,
        id: &NotificationId,
    ) -> Result<Vec<NotificationHistoryRecord>, DomainError> {
        let sql = format!(
            "SELECT {} FROM notification_history WHERE resend_of = $1 ORDER BY sent_at",
            RECORD_COLUMNS
        );
        let rows: Vec<HistoryRow> = sqlx::query_as(&sql)
            .bind(id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to list resends", e))?;

        rows.into_iter().map(NotificationHistoryRecord::try_from).collect()
    }
}
