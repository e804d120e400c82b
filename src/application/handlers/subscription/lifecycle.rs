//! SubscriptionLifecycle - applies verified gateway events to subscriptions.
//!
//! Every handler keys off external references (organization id in checkout
//! metadata, gateway customer id, gateway subscription id, invoice id), so a
//! duplicate or out-of-order delivery degrades to [`LifecycleOutcome::NoChange`]
//! instead of a second transition.
//!
//! Each transition is written through `SubscriptionRepository::apply_change`,
//! so the row, its invoice and its entitlements commit together. A transient
//! failure leaves nothing behind and the gateway's redelivery applies the
//! whole transition.
//!
//! Applied transitions are audited with no user id, best-effort.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::application::handlers::audit::AuditRecorder;
use crate::domain::audit::AuditAction;
use crate::domain::foundation::{OrganizationId, SubscriptionId, Timestamp};
use crate::domain::payment::{
    CheckoutSession, GatewayEvent, GatewayEventType, GatewayInvoice, GatewaySubscription,
    WebhookError,
};
use crate::domain::subscription::{
    entitlements_for, BillingPolicy, DiscountType, Invoice, PlanType, Subscription,
    SubscriptionStatus,
};
use crate::ports::{SaveResult, SubscriptionChange, SubscriptionRepository};

/// What applying one event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleOutcome {
    /// A PENDING subscription became ACTIVE.
    Activated(SubscriptionId),
    /// No PENDING subscription existed; a new ACTIVE one was created.
    Created(SubscriptionId),
    /// The current period was extended by one term.
    Renewed(SubscriptionId),
    /// An invoice was recorded without a status change.
    InvoiceRecorded(SubscriptionId),
    Suspended(SubscriptionId),
    Canceled(SubscriptionId),
    /// The event was already applied or does not apply to the current state.
    NoChange(String),
}

/// Routes a verified event to the handler for its type.
#[async_trait]
pub trait GatewayEventDispatcher: Send + Sync {
    /// # Errors
    ///
    /// `WebhookError::Ignored` for event types with no handler.
    async fn dispatch(&self, event: &GatewayEvent) -> Result<LifecycleOutcome, WebhookError>;
}

pub struct SubscriptionLifecycle {
    subscriptions: Arc<dyn SubscriptionRepository>,
    audit: AuditRecorder,
    policy: BillingPolicy,
}

impl SubscriptionLifecycle {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        audit: AuditRecorder,
        policy: BillingPolicy,
    ) -> Self {
        Self {
            subscriptions,
            audit,
            policy,
        }
    }

    /// First payment confirmed by the gateway.
    ///
    /// Activates the organization's PENDING subscription. If there is none,
    /// creates an ACTIVE one from the session metadata.
    pub async fn on_checkout_completed(
        &self,
        session: &CheckoutSession,
    ) -> Result<LifecycleOutcome, WebhookError> {
        let organization_id: OrganizationId = session
            .metadata_value("organization_id")
            .ok_or(WebhookError::MissingMetadata("organization_id"))?
            .parse()
            .map_err(|_| WebhookError::ParseError("organization_id is not a UUID".to_string()))?;
        let invoice_ref = session.invoice_ref().to_string();
        let now = Timestamp::now();

        let existing = self
            .subscriptions
            .find_open_for_organization(&organization_id)
            .await?;

        match existing {
            Some(mut subscription) if subscription.status == SubscriptionStatus::Pending => {
                let amount = session.amount_total.unwrap_or(subscription.final_price);
                subscription.activate(
                    now,
                    self.policy.term_days,
                    session.customer.clone(),
                    session.subscription.clone(),
                )?;
                let change = SubscriptionChange::update(subscription.clone())
                    .with_entitlements(entitlements_for(subscription.plan_type))
                    .with_invoice(Invoice::paid(subscription.id, &invoice_ref, amount, now));
                if self.subscriptions.apply_change(&change).await? == SaveResult::AlreadyExists {
                    return Ok(LifecycleOutcome::NoChange(format!(
                        "invoice {} already recorded",
                        invoice_ref
                    )));
                }

                tracing::info!(
                    subscription_id = %subscription.id,
                    organization_id = %organization_id,
                    "Subscription activated by checkout"
                );
                self.audit_transition(AuditAction::SubscriptionActivate, &subscription)
                    .await;
                Ok(LifecycleOutcome::Activated(subscription.id))
            }
            Some(subscription) => {
                let already_applied = subscription.external_payment_ref.is_some()
                    && subscription.external_payment_ref == session.subscription;
                let invoices = self.subscriptions.invoices_for(&subscription.id).await?;
                if already_applied || invoices.iter().any(|i| i.external_invoice_ref == invoice_ref)
                {
                    return Ok(LifecycleOutcome::NoChange(format!(
                        "checkout {} already applied to subscription {}",
                        session.id, subscription.id
                    )));
                }
                Err(WebhookError::Conflict(format!(
                    "organization {} already has {} subscription {}",
                    organization_id, subscription.status, subscription.id
                )))
            }
            None => self.create_from_checkout(organization_id, session, now).await,
        }
    }

    async fn create_from_checkout(
        &self,
        organization_id: OrganizationId,
        session: &CheckoutSession,
        now: Timestamp,
    ) -> Result<LifecycleOutcome, WebhookError> {
        let plan_value = session
            .metadata_value("plan_type")
            .ok_or(WebhookError::MissingMetadata("plan_type"))?;
        let plan_type = PlanType::parse(plan_value)
            .ok_or_else(|| WebhookError::ParseError(format!("unknown plan type {}", plan_value)))?;
        let discount_type = match session.metadata_value("discount_type") {
            Some(value) => DiscountType::parse(value).ok_or_else(|| {
                WebhookError::ParseError(format!("unknown discount type {}", value))
            })?,
            None => DiscountType::None,
        };

        let subscription = Subscription::create_confirmed(
            SubscriptionId::new(),
            organization_id,
            plan_type,
            discount_type,
            now,
            self.policy.term_days,
            session.customer.clone(),
            session.subscription.clone(),
        );
        let amount = session.amount_total.unwrap_or(subscription.final_price);
        let change = SubscriptionChange::insert(subscription.clone())
            .with_entitlements(entitlements_for(plan_type))
            .with_invoice(Invoice::paid(
                subscription.id,
                session.invoice_ref(),
                amount,
                now,
            ));
        // A concurrent delivery that created the row first surfaces as Conflict.
        if self.subscriptions.apply_change(&change).await? == SaveResult::AlreadyExists {
            return Ok(LifecycleOutcome::NoChange(format!(
                "invoice {} already recorded",
                session.invoice_ref()
            )));
        }

        tracing::info!(
            subscription_id = %subscription.id,
            organization_id = %organization_id,
            plan_type = %plan_type,
            "Subscription created from checkout"
        );
        self.audit_transition(AuditAction::SubscriptionCreate, &subscription)
            .await;
        Ok(LifecycleOutcome::Created(subscription.id))
    }

    /// Payment collected for an invoice.
    ///
    /// Renewal invoices extend the period of an ACTIVE subscription.
    /// SUSPENDED subscriptions get the invoice recorded and stay SUSPENDED.
    pub async fn on_invoice_paid(
        &self,
        invoice: &GatewayInvoice,
    ) -> Result<LifecycleOutcome, WebhookError> {
        let mut subscription = self.find_by_customer(invoice).await?;
        let now = Timestamp::now();

        match subscription.status {
            SubscriptionStatus::Active => {}
            SubscriptionStatus::Suspended => {
                let saved = self
                    .subscriptions
                    .record_invoice(&Invoice::paid(
                        subscription.id,
                        &invoice.id,
                        invoice.amount_paid,
                        now,
                    ))
                    .await?;
                tracing::warn!(
                    subscription_id = %subscription.id,
                    invoice_ref = %invoice.id,
                    "Invoice paid for suspended subscription; not reactivated"
                );
                return Ok(match saved {
                    SaveResult::Inserted => LifecycleOutcome::InvoiceRecorded(subscription.id),
                    SaveResult::AlreadyExists => {
                        LifecycleOutcome::NoChange(format!("invoice {} already recorded", invoice.id))
                    }
                });
            }
            status => {
                return Ok(LifecycleOutcome::NoChange(format!(
                    "subscription {} is {}",
                    subscription.id, status
                )))
            }
        }

        let paid = Invoice::paid(subscription.id, &invoice.id, invoice.amount_paid, now);
        let already_recorded =
            || LifecycleOutcome::NoChange(format!("invoice {} already recorded", invoice.id));

        if !invoice.is_renewal() {
            return Ok(match self.subscriptions.record_invoice(&paid).await? {
                SaveResult::Inserted => LifecycleOutcome::InvoiceRecorded(subscription.id),
                SaveResult::AlreadyExists => already_recorded(),
            });
        }

        // The invoice and the period extension commit together.
        subscription.renew(now, self.policy.term_days)?;
        let change = SubscriptionChange::update(subscription.clone()).with_invoice(paid);
        if self.subscriptions.apply_change(&change).await? == SaveResult::AlreadyExists {
            return Ok(already_recorded());
        }

        tracing::info!(
            subscription_id = %subscription.id,
            period_end = %subscription.current_period_end,
            "Subscription renewed"
        );
        self.audit_transition(AuditAction::SubscriptionRenew, &subscription)
            .await;
        Ok(LifecycleOutcome::Renewed(subscription.id))
    }

    /// Payment attempt failed. ACTIVE subscriptions are suspended.
    pub async fn on_payment_failed(
        &self,
        invoice: &GatewayInvoice,
    ) -> Result<LifecycleOutcome, WebhookError> {
        let mut subscription = self.find_by_customer(invoice).await?;
        let now = Timestamp::now();

        if !matches!(
            subscription.status,
            SubscriptionStatus::Active | SubscriptionStatus::Suspended
        ) {
            return Ok(LifecycleOutcome::NoChange(format!(
                "subscription {} is {}",
                subscription.id, subscription.status
            )));
        }

        let failed = Invoice::failed(subscription.id, &invoice.id, invoice.amount_due, now);

        if subscription.status == SubscriptionStatus::Suspended {
            self.subscriptions.record_invoice(&failed).await?;
            return Ok(LifecycleOutcome::NoChange(format!(
                "subscription {} already suspended",
                subscription.id
            )));
        }

        subscription.suspend(now)?;
        let change = SubscriptionChange::update(subscription.clone())
            .with_entitlements(BTreeSet::new())
            .with_invoice(failed);
        if self.subscriptions.apply_change(&change).await? == SaveResult::AlreadyExists {
            return Ok(LifecycleOutcome::NoChange(format!(
                "invoice {} already recorded",
                invoice.id
            )));
        }

        tracing::warn!(
            subscription_id = %subscription.id,
            invoice_ref = %invoice.id,
            "Subscription suspended after failed payment"
        );
        self.audit_transition(AuditAction::SubscriptionSuspend, &subscription)
            .await;
        Ok(LifecycleOutcome::Suspended(subscription.id))
    }

    /// The gateway subscription was deleted.
    pub async fn on_external_cancellation(
        &self,
        gateway_subscription: &GatewaySubscription,
    ) -> Result<LifecycleOutcome, WebhookError> {
        let mut subscription = self
            .subscriptions
            .find_by_payment_ref(&gateway_subscription.id)
            .await?
            .ok_or_else(|| {
                WebhookError::SubscriptionNotFound(format!(
                    "gateway subscription {}",
                    gateway_subscription.id
                ))
            })?;

        if subscription.status == SubscriptionStatus::Canceled {
            return Ok(LifecycleOutcome::NoChange(format!(
                "subscription {} already canceled",
                subscription.id
            )));
        }

        let now = Timestamp::now();
        subscription.cancel(now)?;
        let change =
            SubscriptionChange::update(subscription.clone()).with_entitlements(BTreeSet::new());
        self.subscriptions.apply_change(&change).await?;

        tracing::info!(subscription_id = %subscription.id, "Subscription canceled by gateway");
        self.audit_transition(AuditAction::SubscriptionCancel, &subscription)
            .await;
        Ok(LifecycleOutcome::Canceled(subscription.id))
    }

    async fn find_by_customer(&self, invoice: &GatewayInvoice) -> Result<Subscription, WebhookError> {
        let customer = invoice
            .customer
            .as_deref()
            .ok_or(WebhookError::MissingField("customer"))?;
        self.subscriptions
            .find_by_customer_ref(customer)
            .await?
            .ok_or_else(|| WebhookError::SubscriptionNotFound(format!("customer {}", customer)))
    }

    async fn audit_transition(&self, action: AuditAction, subscription: &Subscription) {
        let mut metadata = Map::new();
        metadata.insert(
            "organization_id".to_string(),
            Value::String(subscription.organization_id.to_string()),
        );
        metadata.insert(
            "status".to_string(),
            Value::String(subscription.status.to_string()),
        );
        metadata.insert(
            "plan_type".to_string(),
            Value::String(subscription.plan_type.to_string()),
        );
        metadata.insert(
            "current_period_end".to_string(),
            Value::String(subscription.current_period_end.to_string()),
        );
        self.audit
            .record_best_effort(None, action, subscription.id.to_string(), metadata)
            .await;
    }
}

#[async_trait]
impl GatewayEventDispatcher for SubscriptionLifecycle {
    async fn dispatch(&self, event: &GatewayEvent) -> Result<LifecycleOutcome, WebhookError> {
        match event.parsed_type() {
            GatewayEventType::CheckoutSessionCompleted => {
                self.on_checkout_completed(&event.object()?).await
            }
            GatewayEventType::InvoicePaid => self.on_invoice_paid(&event.object()?).await,
            GatewayEventType::InvoicePaymentFailed => {
                self.on_payment_failed(&event.object()?).await
            }
            GatewayEventType::SubscriptionDeleted => {
                self.on_external_cancellation(&event.object()?).await
            }
            GatewayEventType::Unknown => Err(WebhookError::Ignored(format!(
                "no handler for {}",
                event.event_type
            ))),
        }
    }
}
