//! Resend mail transport.
//!
//! # Configuration
//!
//! ```ignore
//! let transport = ResendMailTransport::new(api_key, "Memberdesk <noreply@example.org>");
//! ```

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::domain::foundation::DomainError;
use crate::ports::{MailTransport, OutgoingMail};

const DEFAULT_BASE_URL: &str = "https://api.resend.com";

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: Vec<String>,
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

pub struct ResendMailTransport {
    api_key: SecretString,
    from: String,
    base_url: String,
    http_client: reqwest::Client,
}

impl ResendMailTransport {
    pub fn new(api_key: SecretString, from: impl Into<String>) -> Self {
        Self {
            api_key,
            from: from.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            http_client: reqwest::Client::new(),
        }
    }

    /// Points the transport at a different API host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn recipient(mail: &OutgoingMail) -> String {
        match &mail.to_name {
            Some(name) if !name.trim().is_empty() => format!("{} <{}>", name.trim(), mail.to),
            _ => mail.to.clone(),
        }
    }
}

#[async_trait]
impl MailTransport for ResendMailTransport {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), DomainError> {
        let url = format!("{}/emails", self.base_url);
        let body = SendEmailRequest {
            from: &self.from,
            to: vec![Self::recipient(mail)],
            subject: &mail.subject,
            html: &mail.html,
            text: &mail.text,
        };

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::transient(format!("Mail provider unreachable: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, error = %error_text, "Resend send failed");
            return Err(DomainError::transient(format!(
                "Mail provider rejected message ({})",
                status
            )));
        }

        Ok(())
    }
}
