//! NotificationDelivery - render, send and record one attempt.
//!
//! Renderer and transport calls are bounded by timeouts. A timeout counts as
//! a failed attempt, never as a retry.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::notification::{
    NotificationHistoryRecord, Recipient, RenderedTemplate, TemplateParams, TemplateType,
};
use crate::ports::{MailTransport, NotificationHistoryRepository, OutgoingMail, TemplateRenderer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryTimeouts {
    pub render: Duration,
    pub send: Duration,
}

impl Default for DeliveryTimeouts {
    fn default() -> Self {
        Self {
            render: Duration::from_secs(5),
            send: Duration::from_secs(10),
        }
    }
}

#[derive(Clone)]
pub struct NotificationDelivery {
    renderer: Arc<dyn TemplateRenderer>,
    transport: Arc<dyn MailTransport>,
    history: Arc<dyn NotificationHistoryRepository>,
    timeouts: DeliveryTimeouts,
}

impl NotificationDelivery {
    pub fn new(
        renderer: Arc<dyn TemplateRenderer>,
        transport: Arc<dyn MailTransport>,
        history: Arc<dyn NotificationHistoryRepository>,
        timeouts: DeliveryTimeouts,
    ) -> Self {
        Self {
            renderer,
            transport,
            history,
            timeouts,
        }
    }

    pub fn history(&self) -> &Arc<dyn NotificationHistoryRepository> {
        &self.history
    }

    /// Renders a template. The error is the message stored on a FAILED record.
    pub async fn render(
        &self,
        template_type: TemplateType,
        params: &TemplateParams,
    ) -> Result<RenderedTemplate, String> {
        match tokio::time::timeout(
            self.timeouts.render,
            self.renderer.render(template_type, params),
        )
        .await
        {
            Ok(Ok(rendered)) => Ok(rendered),
            Ok(Err(err)) => Err(format!("render failed: {}", err)),
            Err(_) => Err(format!(
                "render timed out after {}ms",
                self.timeouts.render.as_millis()
            )),
        }
    }

    /// Hands rendered content to the transport.
    pub async fn deliver(
        &self,
        recipient: &Recipient,
        content: &RenderedTemplate,
    ) -> Result<(), String> {
        let mail = OutgoingMail {
            to: recipient.email.trim().to_string(),
            to_name: recipient.name.clone(),
            subject: content.subject.clone(),
            html: content.html.clone(),
            text: content.text.clone(),
        };
        match tokio::time::timeout(self.timeouts.send, self.transport.send(&mail)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(format!("send failed: {}", err)),
            Err(_) => Err(format!(
                "send timed out after {}ms",
                self.timeouts.send.as_millis()
            )),
        }
    }

    /// Appends the record. A failed write is logged; the attempt already happened.
    pub async fn persist(&self, record: &NotificationHistoryRecord) {
        if let Err(err) = self.history.append(record).await {
            tracing::warn!(
                history_id = %record.id,
                template_type = %record.template_type,
                status = ?record.status,
                error = %err,
                "Failed to write notification history"
            );
        }
    }
}
