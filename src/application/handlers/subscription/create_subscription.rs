//! CreateSubscriptionHandler - Command handler for administrator-created subscriptions.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::application::handlers::audit::AuditRecorder;
use crate::domain::audit::AuditAction;
use crate::domain::foundation::{Caller, ErrorCode, OrganizationId, SubscriptionId, Timestamp};
use crate::domain::subscription::{
    entitlements_for, BillingPolicy, DiscountType, Feature, Invoice, PaymentMethod, PlanType,
    Subscription, SubscriptionError,
};
use crate::ports::{OrganizationRepository, SubscriptionChange, SubscriptionRepository};

/// Command to create a subscription for an organization.
#[derive(Debug, Clone)]
pub struct CreateSubscriptionCommand {
    pub organization_id: OrganizationId,
    pub plan_type: PlanType,
    pub discount_type: DiscountType,
    pub payment_method: PaymentMethod,
}

/// Result of successful subscription creation.
#[derive(Debug, Clone)]
pub struct CreateSubscriptionResult {
    pub subscription: Subscription,
    /// The open bank-transfer invoice, if one was issued.
    pub invoice: Option<Invoice>,
    /// Granted features; empty until a CARD subscription is confirmed.
    pub entitlements: BTreeSet<Feature>,
}

/// Handler for creating subscriptions.
///
/// CARD subscriptions wait PENDING for the gateway's checkout confirmation.
/// BANK_TRANSFER subscriptions are ACTIVE at once, with entitlements granted
/// and an open invoice due after the configured number of days.
pub struct CreateSubscriptionHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    organizations: Arc<dyn OrganizationRepository>,
    audit: AuditRecorder,
    policy: BillingPolicy,
}

impl CreateSubscriptionHandler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        organizations: Arc<dyn OrganizationRepository>,
        audit: AuditRecorder,
        policy: BillingPolicy,
    ) -> Self {
        Self {
            subscriptions,
            organizations,
            audit,
            policy,
        }
    }

    pub async fn handle(
        &self,
        caller: &Caller,
        cmd: CreateSubscriptionCommand,
    ) -> Result<CreateSubscriptionResult, SubscriptionError> {
        // 1. Only administrators manage subscriptions
        caller.require_administrator()?;

        // 2. Organization must exist and be a customer
        let organization = self
            .organizations
            .find_by_id(&cmd.organization_id)
            .await?
            .ok_or_else(|| {
                SubscriptionError::not_found(format!("organization {}", cmd.organization_id))
            })?;
        if !organization.can_subscribe() {
            return Err(SubscriptionError::validation(
                "organization_id",
                "Operator organizations cannot hold subscriptions",
            ));
        }

        // 3. Fast path; the unique index below is the real guard
        if self
            .subscriptions
            .find_open_for_organization(&cmd.organization_id)
            .await?
            .is_some()
        {
            return Err(SubscriptionError::already_exists(cmd.organization_id));
        }

        // 4. Create
        let now = Timestamp::now();
        let subscription = Subscription::create(
            SubscriptionId::new(),
            cmd.organization_id,
            cmd.plan_type,
            cmd.discount_type,
            cmd.payment_method,
            now,
            self.policy.term_days,
        );
        // 5. Bank transfers are active immediately, with their open invoice
        let mut change = SubscriptionChange::insert(subscription.clone());
        let mut invoice = None;
        let mut entitlements = BTreeSet::new();
        if subscription.is_active() {
            entitlements = entitlements_for(subscription.plan_type);
            let open = Invoice::open_bank_transfer(
                subscription.id,
                subscription.final_price,
                now,
                self.policy.bank_transfer_due_days,
            );
            change = change
                .with_entitlements(entitlements.clone())
                .with_invoice(open.clone());
            invoice = Some(open);
        }
        self.subscriptions
            .apply_change(&change)
            .await
            .map_err(|err| match err.code {
                ErrorCode::Conflict => SubscriptionError::already_exists(cmd.organization_id),
                _ => SubscriptionError::from(err),
            })?;

        tracing::info!(
            subscription_id = %subscription.id,
            organization_id = %subscription.organization_id,
            status = %subscription.status,
            user_id = %caller.user_id,
            "Subscription created"
        );

        // 6. Audit
        let mut metadata = Map::new();
        metadata.insert(
            "organization_id".to_string(),
            Value::String(subscription.organization_id.to_string()),
        );
        metadata.insert(
            "plan_type".to_string(),
            Value::String(subscription.plan_type.to_string()),
        );
        metadata.insert(
            "payment_method".to_string(),
            Value::String(subscription.payment_method.as_str().to_string()),
        );
        metadata.insert("final_price".to_string(), Value::from(subscription.final_price));
        self.audit
            .record_best_effort(
                Some(caller.user_id.clone()),
                AuditAction::SubscriptionCreate,
                subscription.id.to_string(),
                metadata,
            )
            .await;

        Ok(CreateSubscriptionResult {
            subscription,
            invoice,
            entitlements,
        })
    }
}
