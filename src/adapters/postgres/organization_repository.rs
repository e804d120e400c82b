//! PostgreSQL implementation of OrganizationRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{corrupt, map_db_error};
use crate::domain::foundation::{DomainError, OrganizationId, Timestamp};
use crate::domain::subscription::{Organization, OrganizationType};
use crate::ports::OrganizationRepository;

pub struct PostgresOrganizationRepository {
    pool: PgPool,
}

impl PostgresOrganizationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrganizationRow {
    id: Uuid,
    name: String,
    organization_type: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrganizationRow> for Organization {
    type Error = DomainError;

    fn try_from(row: OrganizationRow) -> Result<Self, Self::Error> {
        Ok(Organization {
            id: OrganizationId::from_uuid(row.id),
            name: row.name,
            organization_type: OrganizationType::parse(&row.organization_type)
                .ok_or_else(|| corrupt("organization_type", &row.organization_type))?,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

#[async_trait]
impl OrganizationRepository for PostgresOrganizationRepository {
    async fn save(&self, organization: &Organization) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO organizations (id, name, organization_type, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                organization_type = EXCLUDED.organization_type
            "#,
        )
        .bind(organization.id.as_uuid())
        .bind(&organization.name)
        .bind(organization.organization_type.as_str())
        .bind(organization.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to save organization", e))?;

        Ok(())
    }

    async fn find_by_id(&self, id: &OrganizationId) -> Result<Option<Organization>, DomainError> {
        let row: Option<OrganizationRow> = sqlx::query_as(
            "SELECT id, name, organization_type, created_at FROM organizations WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to load organization", e))?;

        row.map(Organization::try_from).transpose()
    }
}
