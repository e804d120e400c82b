//! PostgreSQL implementation of SubscriptionRepository.
//!
//! Subscriptions, their invoices and their entitlement rows. The partial
//! unique index `subscriptions_one_open_per_organization` backs the
//! one-open-subscription rule; `invoices_external_invoice_ref_key` makes
//! invoice recording idempotent. `apply_change` runs the invoice, row and
//! entitlement writes on one transaction.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgExecutor, PgPool};
use uuid::Uuid;

use super::{corrupt, map_db_error};
use crate::domain::foundation::{
    DomainError, InvoiceId, OrganizationId, SubscriptionId, Timestamp,
};
use crate::domain::subscription::{
    DiscountType, Feature, Invoice, InvoiceStatus, PaymentMethod, PlanType, Subscription,
    SubscriptionStatus,
};
use crate::ports::{SaveResult, SubscriptionChange, SubscriptionRepository, SubscriptionWrite};

const SUBSCRIPTION_COLUMNS: &str = r#"
    id, organization_id, plan_type, status, payment_method,
    base_price, discount_type, discount_percent, discount_amount, final_price,
    current_period_start, current_period_end, auto_renewal,
    external_customer_ref, external_payment_ref,
    renewal_notified_at, canceled_at, created_at, updated_at
"#;

pub struct PostgresSubscriptionRepository {
    pool: PgPool,
}

impl PostgresSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_where(
        &self,
        clause: &str,
        value: &str,
    ) -> Result<Option<Subscription>, DomainError> {
        let sql = format!(
            "SELECT {} FROM subscriptions WHERE {} ORDER BY created_at DESC LIMIT 1",
            SUBSCRIPTION_COLUMNS, clause
        );
        let row: Option<SubscriptionRow> = sqlx::query_as(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to load subscription", e))?;
        row.map(Subscription::try_from).transpose()
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: Uuid,
    organization_id: Uuid,
    plan_type: String,
    status: String,
    payment_method: String,
    base_price: i64,
    discount_type: String,
    discount_percent: i64,
    discount_amount: i64,
    final_price: i64,
    current_period_start: DateTime<Utc>,
    current_period_end: DateTime<Utc>,
    auto_renewal: bool,
    external_customer_ref: Option<String>,
    external_payment_ref: Option<String>,
    renewal_notified_at: Option<DateTime<Utc>>,
    canceled_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        Ok(Subscription {
            id: SubscriptionId::from_uuid(row.id),
            organization_id: OrganizationId::from_uuid(row.organization_id),
            plan_type: PlanType::parse(&row.plan_type)
                .ok_or_else(|| corrupt("plan_type", &row.plan_type))?,
            status: SubscriptionStatus::parse(&row.status)
                .ok_or_else(|| corrupt("status", &row.status))?,
            payment_method: PaymentMethod::parse(&row.payment_method)
                .ok_or_else(|| corrupt("payment_method", &row.payment_method))?,
            base_price: row.base_price,
            discount_type: DiscountType::parse(&row.discount_type)
                .ok_or_else(|| corrupt("discount_type", &row.discount_type))?,
            discount_percent: row.discount_percent,
            discount_amount: row.discount_amount,
            final_price: row.final_price,
            current_period_start: Timestamp::from_datetime(row.current_period_start),
            current_period_end: Timestamp::from_datetime(row.current_period_end),
            auto_renewal: row.auto_renewal,
            external_customer_ref: row.external_customer_ref,
            external_payment_ref: row.external_payment_ref,
            renewal_notified_at: row.renewal_notified_at.map(Timestamp::from_datetime),
            canceled_at: row.canceled_at.map(Timestamp::from_datetime),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct InvoiceRow {
    id: Uuid,
    subscription_id: Uuid,
    external_invoice_ref: String,
    amount: i64,
    status: String,
    invoice_number: String,
    paid_at: Option<DateTime<Utc>>,
    due_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<InvoiceRow> for Invoice {
    type Error = DomainError;

    fn try_from(row: InvoiceRow) -> Result<Self, Self::Error> {
        Ok(Invoice {
            id: InvoiceId::from_uuid(row.id),
            subscription_id: SubscriptionId::from_uuid(row.subscription_id),
            external_invoice_ref: row.external_invoice_ref,
            amount: row.amount,
            status: InvoiceStatus::parse(&row.status)
                .ok_or_else(|| corrupt("invoice status", &row.status))?,
            invoice_number: row.invoice_number,
            paid_at: row.paid_at.map(Timestamp::from_datetime),
            due_date: row.due_date.map(Timestamp::from_datetime),
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

/// Unknown feature names are skipped so a retired feature does not make the
/// whole set unreadable.
fn parse_features(names: Vec<String>) -> BTreeSet<Feature> {
    names
        .iter()
        .filter_map(|name| {
            let feature = Feature::parse(name);
            if feature.is_none() {
                tracing::warn!(feature = %name, "Ignoring unknown entitlement");
            }
            feature
        })
        .collect()
}

async fn insert_subscription<'e>(
    executor: impl PgExecutor<'e>,
    subscription: &Subscription,
) -> Result<(), DomainError> {
    sqlx::query(
        r#"
        INSERT INTO subscriptions (
            id, organization_id, plan_type, status, payment_method,
            base_price, discount_type, discount_percent, discount_amount, final_price,
            current_period_start, current_period_end, auto_renewal,
            external_customer_ref, external_payment_ref,
            renewal_notified_at, canceled_at, created_at, updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
        "#,
    )
    .bind(subscription.id.as_uuid())
    .bind(subscription.organization_id.as_uuid())
    .bind(subscription.plan_type.as_str())
    .bind(subscription.status.as_str())
    .bind(subscription.payment_method.as_str())
    .bind(subscription.base_price)
    .bind(subscription.discount_type.as_str())
    .bind(subscription.discount_percent)
    .bind(subscription.discount_amount)
    .bind(subscription.final_price)
    .bind(subscription.current_period_start.as_datetime())
    .bind(subscription.current_period_end.as_datetime())
    .bind(subscription.auto_renewal)
    .bind(&subscription.external_customer_ref)
    .bind(&subscription.external_payment_ref)
    .bind(subscription.renewal_notified_at.as_ref().map(Timestamp::as_datetime))
    .bind(subscription.canceled_at.as_ref().map(Timestamp::as_datetime))
    .bind(subscription.created_at.as_datetime())
    .bind(subscription.updated_at.as_datetime())
    .execute(executor)
    .await
    .map_err(|e| map_db_error("Failed to insert subscription", e))?;

    Ok(())
}

async fn update_subscription<'e>(
    executor: impl PgExecutor<'e>,
    subscription: &Subscription,
) -> Result<(), DomainError> {
    let result = sqlx::query(
        r#"
        UPDATE subscriptions SET
            plan_type = $2,
            status = $3,
            payment_method = $4,
            current_period_start = $5,
            current_period_end = $6,
            auto_renewal = $7,
            external_customer_ref = $8,
            external_payment_ref = $9,
            renewal_notified_at = $10,
            canceled_at = $11,
            updated_at = $12
        WHERE id = $1
        "#,
    )
    .bind(subscription.id.as_uuid())
    .bind(subscription.plan_type.as_str())
    .bind(subscription.status.as_str())
    .bind(subscription.payment_method.as_str())
    .bind(subscription.current_period_start.as_datetime())
    .bind(subscription.current_period_end.as_datetime())
    .bind(subscription.auto_renewal)
    .bind(&subscription.external_customer_ref)
    .bind(&subscription.external_payment_ref)
    .bind(subscription.renewal_notified_at.as_ref().map(Timestamp::as_datetime))
    .bind(subscription.canceled_at.as_ref().map(Timestamp::as_datetime))
    .bind(subscription.updated_at.as_datetime())
    .execute(executor)
    .await
    .map_err(|e| map_db_error("Failed to update subscription", e))?;

    if result.rows_affected() == 0 {
        return Err(DomainError::not_found("Subscription", subscription.id));
    }
    Ok(())
}

async fn insert_invoice<'e>(
    executor: impl PgExecutor<'e>,
    invoice: &Invoice,
) -> Result<SaveResult, DomainError> {
    let result = sqlx::query(
        r#"
        INSERT INTO invoices (
            id, subscription_id, external_invoice_ref, amount, status,
            invoice_number, paid_at, due_date, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (external_invoice_ref) DO NOTHING
        "#,
    )
    .bind(invoice.id.as_uuid())
    .bind(invoice.subscription_id.as_uuid())
    .bind(&invoice.external_invoice_ref)
    .bind(invoice.amount)
    .bind(invoice.status.as_str())
    .bind(&invoice.invoice_number)
    .bind(invoice.paid_at.as_ref().map(Timestamp::as_datetime))
    .bind(invoice.due_date.as_ref().map(Timestamp::as_datetime))
    .bind(invoice.created_at.as_datetime())
    .execute(executor)
    .await
    .map_err(|e| map_db_error("Failed to record invoice", e))?;

    if result.rows_affected() == 0 {
        Ok(SaveResult::AlreadyExists)
    } else {
        Ok(SaveResult::Inserted)
    }
}

/// Both statements run on the caller's transaction.
async fn write_entitlements(
    conn: &mut PgConnection,
    id: &SubscriptionId,
    features: &BTreeSet<Feature>,
) -> Result<(), DomainError> {
    sqlx::query("DELETE FROM entitlements WHERE subscription_id = $1")
        .bind(id.as_uuid())
        .execute(&mut *conn)
        .await
        .map_err(|e| map_db_error("Failed to clear entitlements", e))?;

    let names: Vec<String> = features.iter().map(|f| f.as_str().to_string()).collect();
    if !names.is_empty() {
        sqlx::query(
            r#"
            INSERT INTO entitlements (subscription_id, feature)
            SELECT $1, unnest($2::text[])
            "#,
        )
        .bind(id.as_uuid())
        .bind(&names)
        .execute(&mut *conn)
        .await
        .map_err(|e| map_db_error("Failed to grant entitlements", e))?;
    }
    Ok(())
}

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn insert(&self, subscription: &Subscription) -> Result<(), DomainError> {
        insert_subscription(&self.pool, subscription).await
    }

    async fn update(&self, subscription: &Subscription) -> Result<(), DomainError> {
        update_subscription(&self.pool, subscription).await
    }

    async fn apply_change(&self, change: &SubscriptionChange) -> Result<SaveResult, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_db_error("Failed to begin subscription change", e))?;

        if let Some(invoice) = &change.invoice {
            if insert_invoice(&mut *tx, invoice).await? == SaveResult::AlreadyExists {
                tx.rollback()
                    .await
                    .map_err(|e| map_db_error("Failed to roll back subscription change", e))?;
                return Ok(SaveResult::AlreadyExists);
            }
        }
        match change.write {
            SubscriptionWrite::Insert => insert_subscription(&mut *tx, &change.subscription).await?,
            SubscriptionWrite::Update => update_subscription(&mut *tx, &change.subscription).await?,
        }
        if let Some(features) = &change.entitlements {
            write_entitlements(&mut *tx, &change.subscription.id, features).await?;
        }

        tx.commit()
            .await
            .map_err(|e| map_db_error("Failed to commit subscription change", e))?;
        Ok(SaveResult::Inserted)
    }

    async fn find_by_id(&self, id: &SubscriptionId) -> Result<Option<Subscription>, DomainError> {
        let sql = format!("SELECT {} FROM subscriptions WHERE id = $1", SUBSCRIPTION_COLUMNS);
        let row: Option<SubscriptionRow> = sqlx::query_as(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to load subscription", e))?;
        row.map(Subscription::try_from).transpose()
    }

    async fn find_open_for_organization(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Option<Subscription>, DomainError> {
        let sql = format!(
            "SELECT {} FROM subscriptions \
             WHERE organization_id = $1 AND status IN ('PENDING', 'ACTIVE')",
            SUBSCRIPTION_COLUMNS
        );
        let row: Option<SubscriptionRow> = sqlx::query_as(&sql)
            .bind(organization_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to load open subscription", e))?;
        row.map(Subscription::try_from).transpose()
    }

    async fn find_by_customer_ref(
        &self,
        customer_ref: &str,
    ) -> Result<Option<Subscription>, DomainError> {
        self.fetch_one_where(
            "external_customer_ref = $1 AND status <> 'CANCELED'",
            customer_ref,
        )
        .await
    }

    async fn find_by_payment_ref(
        &self,
        payment_ref: &str,
    ) -> Result<Option<Subscription>, DomainError> {
        self.fetch_one_where("external_payment_ref = $1", payment_ref)
            .await
    }

    async fn record_invoice(&self, invoice: &Invoice) -> Result<SaveResult, DomainError> {
        insert_invoice(&self.pool, invoice).await
    }

    async fn invoices_for(&self, id: &SubscriptionId) -> Result<Vec<Invoice>, DomainError> {
        let rows: Vec<InvoiceRow> = sqlx::query_as(
            r#"
            SELECT id, subscription_id, external_invoice_ref, amount, status,
                   invoice_number, paid_at, due_date, created_at
            FROM invoices
            WHERE subscription_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to load invoices", e))?;

        rows.into_iter().map(Invoice::try_from).collect()
    }

    async fn replace_entitlements(
        &self,
        id: &SubscriptionId,
        features: &BTreeSet<Feature>,
    ) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_db_error("Failed to begin transaction", e))?;
        write_entitlements(&mut *tx, id, features).await?;
        tx.commit()
            .await
            .map_err(|e| map_db_error("Failed to commit entitlements", e))
    }

    async fn entitlements_for(
        &self,
        id: &SubscriptionId,
    ) -> Result<BTreeSet<Feature>, DomainError> {
        let names: Vec<String> =
            sqlx::query_scalar("SELECT feature FROM entitlements WHERE subscription_id = $1")
                .bind(id.as_uuid())
                .fetch_all(&self.pool)
                .await
                .map_err(|e| map_db_error("Failed to load entitlements", e))?;

        Ok(parse_features(names))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;

    fn row() -> SubscriptionRow {
        let now = Utc::now();
        SubscriptionRow {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            plan_type: "STANDARD".to_string(),
            status: "ACTIVE".to_string(),
            payment_method: "BANK_TRANSFER".to_string(),
            base_price: 120_000,
            discount_type: "EARLY_BIRD".to_string(),
            discount_percent: 10,
            discount_amount: 12_000,
            final_price: 108_000,
            current_period_start: now,
            current_period_end: now,
            auto_renewal: true,
            external_customer_ref: None,
            external_payment_ref: None,
            renewal_notified_at: None,
            canceled_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn row_converts_to_subscription() {
        let sub = Subscription::try_from(row()).unwrap();
        assert_eq!(sub.plan_type, PlanType::Standard);
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert_eq!(sub.discount_type, DiscountType::EarlyBird);
        assert_eq!(sub.final_price, 108_000);
    }

    #[test]
    fn unknown_status_is_permanent_error() {
        let mut bad = row();
        bad.status = "PAUSED".to_string();
        let err = Subscription::try_from(bad).unwrap_err();
        assert_eq!(err.code, ErrorCode::Permanent);
    }

    #[test]
    fn invoice_row_rejects_unknown_status() {
        let now = Utc::now();
        let bad = InvoiceRow {
            id: Uuid::new_v4(),
            subscription_id: Uuid::new_v4(),
            external_invoice_ref: "in_1".to_string(),
            amount: 1,
            status: "void".to_string(),
            invoice_number: "INV-20240101-ABCDEF12".to_string(),
            paid_at: None,
            due_date: None,
            created_at: now,
        };
        assert!(Invoice::try_from(bad).is_err());
    }

    #[test]
    fn unknown_features_are_skipped() {
        let features = parse_features(vec![
            "newsletter".to_string(),
            "retired_feature".to_string(),
        ]);
        assert_eq!(features.len(), 1);
        assert!(features.contains(&Feature::Newsletter));
    }
}
