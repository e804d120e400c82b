//! In-memory subscription repository.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, OrganizationId, SubscriptionId};
use crate::domain::subscription::{Feature, Invoice, Subscription, SubscriptionStatus};
use crate::ports::{SaveResult, SubscriptionChange, SubscriptionRepository, SubscriptionWrite};

use super::FailureSwitch;

#[derive(Debug, Clone, Default)]
struct State {
    subscriptions: HashMap<SubscriptionId, Subscription>,
    invoices: Vec<Invoice>,
    entitlements: HashMap<SubscriptionId, BTreeSet<Feature>>,
}

impl State {
    /// Mirrors the partial unique index on (organization_id) for open statuses.
    fn check_open_slot(&self, candidate: &Subscription) -> Result<(), DomainError> {
        if !candidate.status.occupies_organization_slot() {
            return Ok(());
        }
        let taken = self.subscriptions.values().any(|s| {
            s.id != candidate.id
                && s.organization_id == candidate.organization_id
                && s.status.occupies_organization_slot()
        });
        if taken {
            return Err(DomainError::conflict(format!(
                "Organization {} already has an open subscription",
                candidate.organization_id
            )));
        }
        Ok(())
    }

    fn insert(&mut self, subscription: &Subscription) -> Result<(), DomainError> {
        if self.subscriptions.contains_key(&subscription.id) {
            return Err(DomainError::conflict(format!(
                "Subscription {} already exists",
                subscription.id
            )));
        }
        self.check_open_slot(subscription)?;
        self.subscriptions
            .insert(subscription.id, subscription.clone());
        Ok(())
    }

    fn update(&mut self, subscription: &Subscription) -> Result<(), DomainError> {
        if !self.subscriptions.contains_key(&subscription.id) {
            return Err(DomainError::not_found("Subscription", subscription.id));
        }
        self.check_open_slot(subscription)?;
        self.subscriptions
            .insert(subscription.id, subscription.clone());
        Ok(())
    }

    fn record_invoice(&mut self, invoice: &Invoice) -> SaveResult {
        if self
            .invoices
            .iter()
            .any(|i| i.external_invoice_ref == invoice.external_invoice_ref)
        {
            return SaveResult::AlreadyExists;
        }
        self.invoices.push(invoice.clone());
        SaveResult::Inserted
    }
}

#[derive(Debug, Default)]
pub struct InMemorySubscriptionRepository {
    state: RwLock<State>,
    failure: FailureSwitch,
    commit_failure: FailureSwitch,
}

impl InMemorySubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every call fail with `error` until cleared with `None`.
    pub fn fail_with(&self, error: Option<DomainError>) {
        self.failure.set(error);
    }

    /// Makes the next `apply_change` fail after staging its writes, so
    /// nothing it staged is kept. Fires once.
    pub fn fail_next_change(&self, error: DomainError) {
        self.commit_failure.set(Some(error));
    }

    // === Test Helpers ===

    pub async fn all(&self) -> Vec<Subscription> {
        self.state.read().await.subscriptions.values().cloned().collect()
    }

    pub async fn for_organization(&self, organization_id: &OrganizationId) -> Vec<Subscription> {
        self.state
            .read()
            .await
            .subscriptions
            .values()
            .filter(|s| &s.organization_id == organization_id)
            .cloned()
            .collect()
    }

    pub async fn all_invoices(&self) -> Vec<Invoice> {
        self.state.read().await.invoices.clone()
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn insert(&self, subscription: &Subscription) -> Result<(), DomainError> {
        self.failure.check()?;
        self.state.write().await.insert(subscription)
    }

    async fn update(&self, subscription: &Subscription) -> Result<(), DomainError> {
        self.failure.check()?;
        self.state.write().await.update(subscription)
    }

    async fn apply_change(&self, change: &SubscriptionChange) -> Result<SaveResult, DomainError> {
        self.failure.check()?;
        let mut state = self.state.write().await;
        let mut staged = state.clone();

        if let Some(invoice) = &change.invoice {
            if staged.record_invoice(invoice) == SaveResult::AlreadyExists {
                return Ok(SaveResult::AlreadyExists);
            }
        }
        match change.write {
            SubscriptionWrite::Insert => staged.insert(&change.subscription)?,
            SubscriptionWrite::Update => staged.update(&change.subscription)?,
        }
        if let Some(features) = &change.entitlements {
            staged
                .entitlements
                .insert(change.subscription.id, features.clone());
        }

        self.commit_failure.take()?;
        *state = staged;
        Ok(SaveResult::Inserted)
    }

    async fn find_by_id(&self, id: &SubscriptionId) -> Result<Option<Subscription>, DomainError> {
        self.failure.check()?;
        Ok(self.state.read().await.subscriptions.get(id).cloned())
    }

    async fn find_open_for_organization(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Option<Subscription>, DomainError> {
        self.failure.check()?;
        Ok(self
            .state
            .read()
            .await
            .subscriptions
            .values()
            .find(|s| &s.organization_id == organization_id && s.status.occupies_organization_slot())
            .cloned())
    }

    async fn find_by_customer_ref(
        &self,
        customer_ref: &str,
    ) -> Result<Option<Subscription>, DomainError> {
        self.failure.check()?;
        Ok(self
            .state
            .read()
            .await
            .subscriptions
            .values()
            .filter(|s| {
                s.external_customer_ref.as_deref() == Some(customer_ref)
                    && s.status != SubscriptionStatus::Canceled
            })
            .max_by_key(|s| s.created_at)
            .cloned())
    }

    async fn find_by_payment_ref(
        &self,
        payment_ref: &str,
    ) -> Result<Option<Subscription>, DomainError> {
        self.failure.check()?;
        Ok(self
            .state
            .read()
            .await
            .subscriptions
            .values()
            .filter(|s| s.external_payment_ref.as_deref() == Some(payment_ref))
            .max_by_key(|s| s.created_at)
            .cloned())
    }

    async fn record_invoice(&self, invoice: &Invoice) -> Result<SaveResult, DomainError> {
        self.failure.check()?;
        Ok(self.state.write().await.record_invoice(invoice))
    }

    async fn invoices_for(&self, id: &SubscriptionId) -> Result<Vec<Invoice>, DomainError> {
        self.failure.check()?;
        Ok(self
            .state
            .read()
            .await
            .invoices
            .iter()
            .filter(|i| &i.subscription_id == id)
            .cloned()
            .collect())
    }

    async fn replace_entitlements(
        &self,
        id: &SubscriptionId,
        features: &BTreeSet<Feature>,
    ) -> Result<(), DomainError> {
        self.failure.check()?;
        self.state
            .write()
            .await
            .entitlements
            .insert(*id, features.clone());
        Ok(())
    }

    async fn entitlements_for(
        &self,
        id: &SubscriptionId,
    ) -> Result<BTreeSet<Feature>, DomainError> {
        self.failure.check()?;
        Ok(self
            .state
            .read()
            .await
            .entitlements
            .get(id)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ErrorCode, Timestamp};
    use crate::domain::subscription::{DiscountType, PaymentMethod, PlanType};

    fn card(org: OrganizationId) -> Subscription {
        Subscription::create(
            SubscriptionId::new(),
            org,
            PlanType::Standard,
            DiscountType::None,
            PaymentMethod::Card,
            Timestamp::now(),
            365,
        )
    }

    #[tokio::test]
    async fn second_open_subscription_for_org_conflicts() {
        let repo = InMemorySubscriptionRepository::new();
        let org = OrganizationId::new();

        repo.insert(&card(org)).await.unwrap();
        let err = repo.insert(&card(org)).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn canceled_subscription_frees_the_slot() {
        let repo = InMemorySubscriptionRepository::new();
        let org = OrganizationId::new();
        let mut first = card(org);
        repo.insert(&first).await.unwrap();

        first.cancel(Timestamp::now()).unwrap();
        repo.update(&first).await.unwrap();

        assert!(repo.insert(&card(org)).await.is_ok());
    }

    #[tokio::test]
    async fn duplicate_invoice_ref_is_reported_not_stored() {
        let repo = InMemorySubscriptionRepository::new();
        let sub_id = SubscriptionId::new();
        let now = Timestamp::now();

        let first = repo
            .record_invoice(&Invoice::paid(sub_id, "in_1", 10, now))
            .await
            .unwrap();
        let second = repo
            .record_invoice(&Invoice::paid(sub_id, "in_1", 10, now))
            .await
            .unwrap();

        assert_eq!(first, SaveResult::Inserted);
        assert_eq!(second, SaveResult::AlreadyExists);
        assert_eq!(repo.invoices_for(&sub_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_change_keeps_nothing() {
        let repo = InMemorySubscriptionRepository::new();
        let sub = card(OrganizationId::new());
        let change = SubscriptionChange::insert(sub.clone())
            .with_entitlements(BTreeSet::from([Feature::Newsletter]))
            .with_invoice(Invoice::paid(sub.id, "in_1", 10, Timestamp::now()));

        repo.fail_next_change(DomainError::transient("commit lost"));
        let err = repo.apply_change(&change).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::Transient);
        assert!(repo.all().await.is_empty());
        assert!(repo.all_invoices().await.is_empty());
        assert!(repo.entitlements_for(&sub.id).await.unwrap().is_empty());

        assert_eq!(repo.apply_change(&change).await.unwrap(), SaveResult::Inserted);
        assert_eq!(repo.all().await.len(), 1);
        assert_eq!(repo.entitlements_for(&sub.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn change_with_recorded_invoice_writes_nothing() {
        let repo = InMemorySubscriptionRepository::new();
        let mut sub = card(OrganizationId::new());
        repo.insert(&sub).await.unwrap();
        repo.record_invoice(&Invoice::paid(sub.id, "in_1", 10, Timestamp::now()))
            .await
            .unwrap();

        sub.cancel(Timestamp::now()).unwrap();
        let change = SubscriptionChange::update(sub.clone())
            .with_invoice(Invoice::paid(sub.id, "in_1", 10, Timestamp::now()));

        assert_eq!(
            repo.apply_change(&change).await.unwrap(),
            SaveResult::AlreadyExists
        );
        let stored = repo.find_by_id(&sub.id).await.unwrap().unwrap();
        assert_eq!(stored.status, SubscriptionStatus::Pending);
    }

    #[tokio::test]
    async fn customer_ref_lookup_skips_canceled() {
        let repo = InMemorySubscriptionRepository::new();
        let mut sub = card(OrganizationId::new());
        sub.external_customer_ref = Some("cus_1".into());
        sub.cancel(Timestamp::now()).unwrap();
        repo.insert(&sub).await.unwrap();

        assert!(repo.find_by_customer_ref("cus_1").await.unwrap().is_none());
    }
}
