//! Email configuration (Resend)

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::application::handlers::notification::DeliveryTimeouts;

#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// Resend API key
    pub resend_api_key: SecretString,

    /// Override for the Resend API base URL
    #[serde(default)]
    pub resend_base_url: Option<String>,

    #[serde(default = "default_from_email")]
    pub from_email: String,

    #[serde(default = "default_from_name")]
    pub from_name: String,

    /// Product name shown in rendered subjects
    #[serde(default = "default_product_name")]
    pub product_name: String,

    /// Upper bound on one template render, in milliseconds
    #[serde(default = "default_render_timeout_ms")]
    pub render_timeout_ms: u64,

    /// Upper bound on one transport send, in milliseconds
    #[serde(default = "default_send_timeout_ms")]
    pub send_timeout_ms: u64,
}

impl EmailConfig {
    /// Get formatted "From" header value
    pub fn from_header(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }

    pub fn delivery_timeouts(&self) -> DeliveryTimeouts {
        DeliveryTimeouts {
            render: Duration::from_millis(self.render_timeout_ms),
            send: Duration::from_millis(self.send_timeout_ms),
        }
    }

    /// Validate email configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let key = self.resend_api_key.expose_secret();
        if key.is_empty() {
            return Err(ValidationError::MissingRequired("EMAIL__RESEND_API_KEY"));
        }
        if !key.starts_with("re_") {
            return Err(ValidationError::InvalidResendKey);
        }
        if !self.from_email.contains('@') {
            return Err(ValidationError::InvalidFromEmail);
        }
        if self.render_timeout_ms == 0 || self.send_timeout_ms == 0 {
            return Err(ValidationError::InvalidDeliveryTimeout);
        }
        Ok(())
    }
}

fn default_from_email() -> String {
    "noreply@memberdesk.org".to_string()
}

fn default_from_name() -> String {
    "Memberdesk".to_string()
}

fn default_product_name() -> String {
    "Memberdesk".to_string()
}

fn default_render_timeout_ms() -> u64 {
    5_000
}

fn default_send_timeout_ms() -> u64 {
    10_000
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(key: &str) -> EmailConfig {
        EmailConfig {
            resend_api_key: SecretString::new(key.to_string()),
            resend_base_url: None,
            from_email: default_from_email(),
            from_name: default_from_name(),
            product_name: default_product_name(),
            render_timeout_ms: default_render_timeout_ms(),
            send_timeout_ms: default_send_timeout_ms(),
        }
    }

    #[test]
    fn test_from_header() {
        let mut cfg = config("re_abc");
        cfg.from_email = "office@club.example".to_string();
        cfg.from_name = "Club Office".to_string();
        assert_eq!(cfg.from_header(), "Club Office <office@club.example>");
    }

    #[test]
    fn test_default_timeouts_match_delivery_defaults() {
        assert_eq!(config("re_abc").delivery_timeouts(), DeliveryTimeouts::default());
    }

    #[test]
    fn test_validation_missing_api_key() {
        assert!(matches!(
            config("").validate(),
            Err(ValidationError::MissingRequired(_))
        ));
    }

    #[test]
    fn test_validation_invalid_api_key_prefix() {
        assert!(matches!(
            config("sk_xxx").validate(),
            Err(ValidationError::InvalidResendKey)
        ));
    }

    #[test]
    fn test_validation_invalid_from_email() {
        let mut cfg = config("re_abc");
        cfg.from_email = "invalid-email".to_string();
        assert!(matches!(
            cfg.validate(),
            Err(ValidationError::InvalidFromEmail)
        ));
    }

    #[test]
    fn test_validation_zero_timeout() {
        let mut cfg = config("re_abc");
        cfg.send_timeout_ms = 0;
        assert!(matches!(
            cfg.validate(),
            Err(ValidationError::InvalidDeliveryTimeout)
        ));
    }
}
