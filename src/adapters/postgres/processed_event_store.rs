//! PostgreSQL implementation of ProcessedEventStore.
//!
//! The primary key on `event_id` is the claim. `INSERT .. ON CONFLICT DO
//! NOTHING` lets exactly one concurrent delivery of an event win.

use async_trait::async_trait;
use sqlx::PgPool;

use super::map_db_error;
use crate::domain::foundation::DomainError;
use crate::ports::{ProcessedEventStore, ProcessedGatewayEvent, SaveResult};

pub struct PostgresProcessedEventStore {
    pool: PgPool,
}

impl PostgresProcessedEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProcessedEventStore for PostgresProcessedEventStore {
    async fn claim(&self, event: &ProcessedGatewayEvent) -> Result<SaveResult, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO processed_gateway_events (event_id, event_type, received_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (event_id) DO NOTHING
            "#,
        )
        .bind(&event.event_id)
        .bind(&event.event_type)
        .bind(event.received_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to claim gateway event", e))?;

        if result.rows_affected() == 0 {
            Ok(SaveResult::AlreadyExists)
        } else {
            Ok(SaveResult::Inserted)
        }
    }

    async fn release(&self, event_id: &str) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM processed_gateway_events WHERE event_id = $1")
            .bind(event_id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to release gateway event", e))?;
        Ok(())
    }

    async fn contains(&self, event_id: &str) -> Result<bool, DomainError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM processed_gateway_events WHERE event_id = $1)",
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to check gateway event", e))
    }
}
