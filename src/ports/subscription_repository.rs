//! Subscription repository port.
//!
//! Covers the subscription aggregate plus the rows that hang off it:
//! invoices and materialized entitlements.
//!
//! # Uniqueness guarantees required from implementations
//!
//! - At most one subscription per organization with status PENDING or ACTIVE.
//!   Violations surface as `ErrorCode::Conflict`.
//! - `Invoice::external_invoice_ref` is unique. Duplicates are reported as
//!   `SaveResult::AlreadyExists`, not as errors.
//! - `(subscription_id, feature)` is unique.
//!
//! Lifecycle transitions go through [`SubscriptionRepository::apply_change`],
//! which writes the subscription row, its invoice and its entitlements
//! together. A retried webhook therefore never finds half of a transition.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, OrganizationId, SubscriptionId};
use crate::domain::subscription::{Feature, Invoice, Subscription};

use super::SaveResult;

/// How `apply_change` writes the subscription row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionWrite {
    Insert,
    Update,
}

/// A subscription row write plus the rows that must move with it.
#[derive(Debug, Clone)]
pub struct SubscriptionChange {
    pub write: SubscriptionWrite,
    pub subscription: Subscription,
    /// Replaces the stored entitlement set when present.
    pub entitlements: Option<BTreeSet<Feature>>,
    /// Recorded first. An existing `external_invoice_ref` aborts the change.
    pub invoice: Option<Invoice>,
}

impl SubscriptionChange {
    pub fn insert(subscription: Subscription) -> Self {
        Self {
            write: SubscriptionWrite::Insert,
            subscription,
            entitlements: None,
            invoice: None,
        }
    }

    pub fn update(subscription: Subscription) -> Self {
        Self {
            write: SubscriptionWrite::Update,
            subscription,
            entitlements: None,
            invoice: None,
        }
    }

    pub fn with_entitlements(mut self, features: BTreeSet<Feature>) -> Self {
        self.entitlements = Some(features);
        self
    }

    pub fn with_invoice(mut self, invoice: Invoice) -> Self {
        self.invoice = Some(invoice);
        self
    }
}

#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Insert a new subscription.
    ///
    /// # Errors
    ///
    /// - `Conflict` if the organization already has a PENDING or ACTIVE subscription
    /// - `Transient` on persistence failure
    async fn insert(&self, subscription: &Subscription) -> Result<(), DomainError>;

    /// Persist changes to an existing subscription.
    ///
    /// # Errors
    ///
    /// - `NotFound` if it does not exist
    /// - `Conflict` if the change would violate the one-open-per-organization rule
    async fn update(&self, subscription: &Subscription) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &SubscriptionId) -> Result<Option<Subscription>, DomainError>;

    /// The PENDING or ACTIVE subscription of an organization, if any.
    async fn find_open_for_organization(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Option<Subscription>, DomainError>;

    /// Most recently created non-canceled subscription with this gateway customer id.
    async fn find_by_customer_ref(
        &self,
        customer_ref: &str,
    ) -> Result<Option<Subscription>, DomainError>;

    /// Subscription with this gateway subscription id.
    async fn find_by_payment_ref(
        &self,
        payment_ref: &str,
    ) -> Result<Option<Subscription>, DomainError>;

    /// Apply a change atomically. Either every write commits or none does.
    ///
    /// Returns `SaveResult::AlreadyExists`, writing nothing, when the change
    /// carries an invoice whose external ref is already recorded.
    ///
    /// # Errors
    ///
    /// Same as `insert` / `update` for the subscription row.
    async fn apply_change(&self, change: &SubscriptionChange) -> Result<SaveResult, DomainError>;

    /// Record an invoice, deduplicated on `external_invoice_ref`.
    async fn record_invoice(&self, invoice: &Invoice) -> Result<SaveResult, DomainError>;

    async fn invoices_for(&self, id: &SubscriptionId) -> Result<Vec<Invoice>, DomainError>;

    /// Make the stored entitlement set equal to `features`.
    async fn replace_entitlements(
        &self,
        id: &SubscriptionId,
        features: &BTreeSet<Feature>,
    ) -> Result<(), DomainError>;

    async fn entitlements_for(&self, id: &SubscriptionId)
        -> Result<BTreeSet<Feature>, DomainError>;
}
