//! Outbound mail collaborator.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;

/// A fully rendered message ready to hand to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub to_name: Option<String>,
    pub subject: String,
    pub html: String,
    pub text: String,
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Hands the message to the provider.
    ///
    /// # Errors
    ///
    /// `Transient` if the provider rejected or could not be reached.
    async fn send(&self, mail: &OutgoingMail) -> Result<(), DomainError>;
}
