//! Billing terms applied when subscriptions are created or renewed.

use serde::{Deserialize, Serialize};

/// Length of one paid term, in days.
pub const DEFAULT_TERM_DAYS: i64 = 365;

/// Days a bank-transfer invoice stays payable.
pub const DEFAULT_BANK_TRANSFER_DUE_DAYS: i64 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingPolicy {
    pub term_days: i64,
    pub bank_transfer_due_days: i64,
}

impl Default for BillingPolicy {
    fn default() -> Self {
        Self {
            term_days: DEFAULT_TERM_DAYS,
            bank_transfer_due_days: DEFAULT_BANK_TRANSFER_DUE_DAYS,
        }
    }
}
