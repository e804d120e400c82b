//! Subscription aggregate entity.
//!
//! A Subscription is an organization's paid membership for one yearly term
//! at a time. An organization has at most one Subscription that is PENDING
//! or ACTIVE; older SUSPENDED or CANCELED rows are kept as history.
//!
//! # Design Decisions
//!
//! - **Money in minor units**: all monetary values are i64, never floats
//! - **Price fixed at creation**: the breakdown is stored, not recomputed
//! - **External refs as keys**: gateway events locate rows by
//!   `external_customer_ref` / `external_payment_ref`, never by guesswork

use crate::domain::foundation::{OrganizationId, StateMachine, SubscriptionId, Timestamp};
use serde::{Deserialize, Serialize};

use super::{
    calculate_price, DiscountType, PaymentMethod, PlanType, SubscriptionError, SubscriptionStatus,
};

/// Subscription aggregate.
///
/// # Invariants
///
/// - `final_price == base_price - discount_amount`
/// - Status transitions follow [`SubscriptionStatus`] rules
/// - `canceled_at` is set iff status is CANCELED
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub organization_id: OrganizationId,
    pub plan_type: PlanType,
    pub status: SubscriptionStatus,
    pub payment_method: PaymentMethod,

    pub base_price: i64,
    pub discount_type: DiscountType,
    pub discount_percent: i64,
    pub discount_amount: i64,
    pub final_price: i64,

    pub current_period_start: Timestamp,
    pub current_period_end: Timestamp,
    pub auto_renewal: bool,

    /// Gateway customer id. Invoice events are matched on this.
    pub external_customer_ref: Option<String>,

    /// Gateway subscription id. Cancellation events are matched on this.
    pub external_payment_ref: Option<String>,

    /// When the renewal reminder for the current period was sent.
    pub renewal_notified_at: Option<Timestamp>,
    pub canceled_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Subscription {
    /// Creates a subscription with its price breakdown computed from plan and discount.
    ///
    /// CARD subscriptions start PENDING with an empty period; the period is
    /// set on activation. BANK_TRANSFER subscriptions start ACTIVE for one term.
    pub fn create(
        id: SubscriptionId,
        organization_id: OrganizationId,
        plan_type: PlanType,
        discount_type: DiscountType,
        payment_method: PaymentMethod,
        now: Timestamp,
        term_days: i64,
    ) -> Self {
        let price = calculate_price(plan_type, discount_type);
        let (status, period_end) = if payment_method.requires_external_confirmation() {
            (SubscriptionStatus::Pending, now)
        } else {
            (SubscriptionStatus::Active, now.add_days(term_days))
        };

        Self {
            id,
            organization_id,
            plan_type,
            status,
            payment_method,
            base_price: price.base_price,
            discount_type,
            discount_percent: price.discount_percent,
            discount_amount: price.discount_amount,
            final_price: price.final_price,
            current_period_start: now,
            current_period_end: period_end,
            auto_renewal: payment_method == PaymentMethod::Card,
            external_customer_ref: None,
            external_payment_ref: None,
            renewal_notified_at: None,
            canceled_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a subscription that is already ACTIVE because the gateway
    /// confirmed payment for an organization with no PENDING row.
    #[allow(clippy::too_many_arguments)]
    pub fn create_confirmed(
        id: SubscriptionId,
        organization_id: OrganizationId,
        plan_type: PlanType,
        discount_type: DiscountType,
        now: Timestamp,
        term_days: i64,
        customer_ref: Option<String>,
        payment_ref: Option<String>,
    ) -> Self {
        let mut sub = Self::create(
            id,
            organization_id,
            plan_type,
            discount_type,
            PaymentMethod::Card,
            now,
            term_days,
        );
        sub.status = SubscriptionStatus::Active;
        sub.current_period_end = now.add_days(term_days);
        sub.external_customer_ref = customer_ref;
        sub.external_payment_ref = payment_ref;
        sub
    }

    /// Returns true if entitlements should be granted.
    pub fn is_active(&self) -> bool {
        self.status == SubscriptionStatus::Active
    }

    /// Confirms the first payment. Starts the first term.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless the subscription is PENDING.
    pub fn activate(
        &mut self,
        now: Timestamp,
        term_days: i64,
        customer_ref: Option<String>,
        payment_ref: Option<String>,
    ) -> Result<(), SubscriptionError> {
        if self.status != SubscriptionStatus::Pending {
            return Err(SubscriptionError::invalid_transition(
                self.status,
                SubscriptionStatus::Active,
            ));
        }
        self.transition_to(SubscriptionStatus::Active)?;
        self.current_period_start = now;
        self.current_period_end = now.add_days(term_days);
        if customer_ref.is_some() {
            self.external_customer_ref = customer_ref;
        }
        if payment_ref.is_some() {
            self.external_payment_ref = payment_ref;
        }
        self.updated_at = now;
        Ok(())
    }

    /// Extends the current period by one term after a cycle payment.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless the subscription is ACTIVE.
    pub fn renew(&mut self, now: Timestamp, term_days: i64) -> Result<(), SubscriptionError> {
        self.transition_to(SubscriptionStatus::Active)?;
        self.current_period_start = self.current_period_end;
        self.current_period_end = self.current_period_end.add_days(term_days);
        self.renewal_notified_at = None;
        self.updated_at = now;
        Ok(())
    }

    /// Suspends after a failed payment.
    pub fn suspend(&mut self, now: Timestamp) -> Result<(), SubscriptionError> {
        self.transition_to(SubscriptionStatus::Suspended)?;
        self.updated_at = now;
        Ok(())
    }

    /// Cancels the subscription. Terminal.
    pub fn cancel(&mut self, now: Timestamp) -> Result<(), SubscriptionError> {
        self.transition_to(SubscriptionStatus::Canceled)?;
        self.canceled_at = Some(now);
        self.auto_renewal = false;
        self.updated_at = now;
        Ok(())
    }

    fn transition_to(&mut self, target: SubscriptionStatus) -> Result<(), SubscriptionError> {
        self.status = self
            .status
            .transition_to(target)
            .map_err(|_| SubscriptionError::invalid_transition(self.status, target))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TERM: i64 = 365;

    fn now() -> Timestamp {
        Timestamp::from_unix_secs(1_705_276_800).unwrap()
    }

    fn card_subscription() -> Subscription {
        Subscription::create(
            SubscriptionId::new(),
            OrganizationId::new(),
            PlanType::Standard,
            DiscountType::EarlyBird,
            PaymentMethod::Card,
            now(),
            TERM,
        )
    }

    fn active_subscription() -> Subscription {
        let mut sub = card_subscription();
        sub.activate(now(), TERM, Some("cus_1".into()), Some("sub_1".into()))
            .unwrap();
        sub
    }

    // Construction tests

    #[test]
    fn card_subscription_starts_pending() {
        let sub = card_subscription();
        assert_eq!(sub.status, SubscriptionStatus::Pending);
        assert!(sub.auto_renewal);
        assert_eq!(sub.current_period_end, sub.current_period_start);
    }

    #[test]
    fn bank_transfer_subscription_starts_active_for_one_term() {
        let sub = Subscription::create(
            SubscriptionId::new(),
            OrganizationId::new(),
            PlanType::Expert,
            DiscountType::None,
            PaymentMethod::BankTransfer,
            now(),
            TERM,
        );
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert_eq!(sub.current_period_end, now().add_days(TERM));
        assert!(!sub.auto_renewal);
    }

    #[test]
    fn price_breakdown_is_stored() {
        let sub = card_subscription();
        assert_eq!(sub.base_price, 120_000);
        assert_eq!(sub.discount_percent, 10);
        assert_eq!(sub.discount_amount, 12_000);
        assert_eq!(sub.final_price, sub.base_price - sub.discount_amount);
    }

    #[test]
    fn create_confirmed_is_active_with_refs() {
        let sub = Subscription::create_confirmed(
            SubscriptionId::new(),
            OrganizationId::new(),
            PlanType::Expert,
            DiscountType::Partner,
            now(),
            TERM,
            Some("cus_9".into()),
            Some("sub_9".into()),
        );
        assert!(sub.is_active());
        assert_eq!(sub.external_customer_ref.as_deref(), Some("cus_9"));
        assert_eq!(sub.final_price, 204_000);
    }

    // Transition tests

    #[test]
    fn activate_sets_period_and_refs() {
        let sub = active_subscription();
        assert!(sub.is_active());
        assert_eq!(sub.current_period_end, now().add_days(TERM));
        assert_eq!(sub.external_payment_ref.as_deref(), Some("sub_1"));
    }

    #[test]
    fn activate_twice_is_rejected() {
        let mut sub = active_subscription();
        let err = sub.activate(now(), TERM, None, None).unwrap_err();
        assert!(matches!(err, SubscriptionError::InvalidTransition { .. }));
    }

    #[test]
    fn renew_extends_period_and_resets_reminder() {
        let mut sub = active_subscription();
        sub.renewal_notified_at = Some(now());
        let old_end = sub.current_period_end;

        sub.renew(now(), TERM).unwrap();

        assert_eq!(sub.current_period_end, old_end.add_days(TERM));
        assert_eq!(sub.current_period_start, old_end);
        assert!(sub.renewal_notified_at.is_none());
    }

    #[test]
    fn suspended_cannot_renew() {
        let mut sub = active_subscription();
        sub.suspend(now()).unwrap();
        assert!(sub.renew(now(), TERM).is_err());
        assert_eq!(sub.status, SubscriptionStatus::Suspended);
    }

    #[test]
    fn cancel_stamps_canceled_at() {
        let mut sub = active_subscription();
        sub.cancel(now()).unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Canceled);
        assert_eq!(sub.canceled_at, Some(now()));
        assert!(!sub.auto_renewal);
    }

    #[test]
    fn canceled_cannot_be_canceled_again() {
        let mut sub = active_subscription();
        sub.cancel(now()).unwrap();
        assert!(sub.cancel(now()).is_err());
    }
}
