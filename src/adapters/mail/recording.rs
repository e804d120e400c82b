//! In-memory mail transport that records every message.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::DomainError;
use crate::ports::{MailTransport, OutgoingMail};

#[derive(Debug, Default)]
pub struct RecordingMailTransport {
    sent: RwLock<Vec<OutgoingMail>>,
    /// Addresses whose delivery fails.
    rejected: RwLock<Vec<String>>,
    delay: RwLock<Option<Duration>>,
}

impl RecordingMailTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every send to `address` fail.
    pub async fn reject(&self, address: impl Into<String>) {
        self.rejected.write().await.push(address.into());
    }

    /// Delays every send, to exercise timeouts.
    pub async fn delay_by(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    pub async fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.read().await.clone()
    }
}

#[async_trait]
impl MailTransport for RecordingMailTransport {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), DomainError> {
        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.rejected.read().await.contains(&mail.to) {
            return Err(DomainError::transient(format!(
                "Mailbox {} unavailable",
                mail.to
            )));
        }
        self.sent.write().await.push(mail.clone());
        Ok(())
    }
}
