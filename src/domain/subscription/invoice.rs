//! Invoice records.
//!
//! Invoices are keyed by `external_invoice_ref`, which is unique. Recording the
//! same gateway invoice twice is a no-op at the datastore.

use crate::domain::foundation::{InvoiceId, SubscriptionId, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Open,
    Paid,
    Failed,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Open => "open",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "open" => Some(InvoiceStatus::Open),
            "paid" => Some(InvoiceStatus::Paid),
            "failed" => Some(InvoiceStatus::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub subscription_id: SubscriptionId,
    /// Idempotency key. Gateway invoice id, checkout session id, or
    /// `bank-transfer:<subscription id>`.
    pub external_invoice_ref: String,
    pub amount: i64,
    pub status: InvoiceStatus,
    /// Human-facing number, `INV-YYYYMMDD-XXXXXXXX`.
    pub invoice_number: String,
    pub paid_at: Option<Timestamp>,
    pub due_date: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl Invoice {
    /// Open invoice for an offline bank transfer, due `due_days` from now.
    pub fn open_bank_transfer(
        subscription_id: SubscriptionId,
        amount: i64,
        now: Timestamp,
        due_days: i64,
    ) -> Self {
        Self::build(
            subscription_id,
            Self::bank_transfer_ref(&subscription_id),
            amount,
            InvoiceStatus::Open,
            None,
            Some(now.add_days(due_days)),
            now,
        )
    }

    /// Invoice the gateway reports as paid.
    pub fn paid(
        subscription_id: SubscriptionId,
        external_invoice_ref: impl Into<String>,
        amount: i64,
        now: Timestamp,
    ) -> Self {
        Self::build(
            subscription_id,
            external_invoice_ref.into(),
            amount,
            InvoiceStatus::Paid,
            Some(now),
            None,
            now,
        )
    }

    /// Invoice the gateway reports as failed.
    pub fn failed(
        subscription_id: SubscriptionId,
        external_invoice_ref: impl Into<String>,
        amount: i64,
        now: Timestamp,
    ) -> Self {
        Self::build(
            subscription_id,
            external_invoice_ref.into(),
            amount,
            InvoiceStatus::Failed,
            None,
            None,
            now,
        )
    }

    pub fn bank_transfer_ref(subscription_id: &SubscriptionId) -> String {
        format!("bank-transfer:{}", subscription_id)
    }

    fn build(
        subscription_id: SubscriptionId,
        external_invoice_ref: String,
        amount: i64,
        status: InvoiceStatus,
        paid_at: Option<Timestamp>,
        due_date: Option<Timestamp>,
        now: Timestamp,
    ) -> Self {
        let id = InvoiceId::new();
        Self {
            invoice_number: invoice_number(&id, now),
            id,
            subscription_id,
            external_invoice_ref,
            amount,
            status,
            paid_at,
            due_date,
            created_at: now,
        }
    }
}

/// `INV-` + creation date + first 8 hex digits of the invoice id, uppercased.
fn invoice_number(id: &InvoiceId, now: Timestamp) -> String {
    let simple = id.as_uuid().simple().to_string().to_ascii_uppercase();
    format!(
        "INV-{}-{}",
        now.as_datetime().format("%Y%m%d"),
        &simple[..8]
    )
}
