//! Payment gateway and billing configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::payment::{WebhookVerifier, DEFAULT_TOLERANCE_SECS};
use crate::domain::subscription::{
    BillingPolicy, DEFAULT_BANK_TRANSFER_DUE_DAYS, DEFAULT_TERM_DAYS,
};

/// Payment configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Shared secret the gateway signs webhook payloads with
    pub webhook_secret: SecretString,

    /// Maximum age of a signed webhook, in seconds
    #[serde(default = "default_tolerance_secs")]
    pub webhook_tolerance_secs: i64,

    /// Length of one paid term, in days
    #[serde(default = "default_term_days")]
    pub term_days: i64,

    /// Days a bank-transfer invoice stays payable
    #[serde(default = "default_bank_transfer_due_days")]
    pub bank_transfer_due_days: i64,
}

impl PaymentConfig {
    pub fn billing_policy(&self) -> BillingPolicy {
        BillingPolicy {
            term_days: self.term_days,
            bank_transfer_due_days: self.bank_transfer_due_days,
        }
    }

    pub fn webhook_verifier(&self) -> WebhookVerifier {
        WebhookVerifier::new(self.webhook_secret.clone()).with_tolerance(self.webhook_tolerance_secs)
    }

    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let secret = self.webhook_secret.expose_secret();
        if secret.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__WEBHOOK_SECRET"));
        }
        if !secret.starts_with("whsec_") {
            return Err(ValidationError::InvalidWebhookSecret);
        }
        if self.webhook_tolerance_secs <= 0 {
            return Err(ValidationError::InvalidBillingPolicy(
                "webhook_tolerance_secs must be positive",
            ));
        }
        if self.term_days <= 0 {
            return Err(ValidationError::InvalidBillingPolicy("term_days must be positive"));
        }
        if self.bank_transfer_due_days <= 0 {
            return Err(ValidationError::InvalidBillingPolicy(
                "bank_transfer_due_days must be positive",
            ));
        }
        Ok(())
    }
}

fn default_tolerance_secs() -> i64 {
    DEFAULT_TOLERANCE_SECS
}

fn default_term_days() -> i64 {
    DEFAULT_TERM_DAYS
}

fn default_bank_transfer_due_days() -> i64 {
    DEFAULT_BANK_TRANSFER_DUE_DAYS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str) -> PaymentConfig {
        PaymentConfig {
            webhook_secret: SecretString::new(secret.to_string()),
            webhook_tolerance_secs: default_tolerance_secs(),
            term_days: default_term_days(),
            bank_transfer_due_days: default_bank_transfer_due_days(),
        }
    }

    #[test]
    fn test_billing_policy_uses_configured_terms() {
        let mut cfg = config("whsec_abc");
        cfg.term_days = 30;
        cfg.bank_transfer_due_days = 7;

        let policy = cfg.billing_policy();

        assert_eq!(policy.term_days, 30);
        assert_eq!(policy.bank_transfer_due_days, 7);
    }

    #[test]
    fn test_defaults_match_domain_policy() {
        assert_eq!(config("whsec_abc").billing_policy(), BillingPolicy::default());
    }

    #[test]
    fn test_validation_missing_webhook_secret() {
        assert!(matches!(
            config("").validate(),
            Err(ValidationError::MissingRequired(_))
        ));
    }

    #[test]
    fn test_validation_invalid_webhook_secret_prefix() {
        assert!(matches!(
            config("secret_xxx").validate(),
            Err(ValidationError::InvalidWebhookSecret)
        ));
    }

    #[test]
    fn test_validation_rejects_non_positive_terms() {
        let mut cfg = config("whsec_abc");
        cfg.term_days = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = config("whsec_abc");
        cfg.bank_transfer_due_days = -1;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validation_valid_config() {
        assert!(config("whsec_xyz789").validate().is_ok());
    }
}
