//! Built-in templates rendered with plain string formatting.
//!
//! Output depends only on the template type and inputs, so re-rendering a
//! stored record reproduces the original message byte for byte.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::foundation::DomainError;
use crate::domain::notification::{
    ContactParams, KnownParams, PaymentFailedParams, RenderedTemplate, RenewalReminderParams,
    TemplateParams, TemplateType, WelcomeParams,
};
use crate::ports::TemplateRenderer;

#[derive(Debug, Clone)]
pub struct BuiltinTemplateRenderer {
    product_name: String,
}

impl BuiltinTemplateRenderer {
    pub fn new(product_name: impl Into<String>) -> Self {
        Self {
            product_name: product_name.into(),
        }
    }

    fn contact(&self, p: &ContactParams) -> RenderedTemplate {
        let subject = format!("[{}] Contact: {}", self.product_name, p.subject);
        let text = format!(
            "From: {} <{}>\n\n{}\n",
            p.sender_name, p.sender_email, p.message
        );
        let html = format!(
            "<p><strong>From:</strong> {} &lt;{}&gt;</p>\n<p>{}</p>",
            escape(&p.sender_name),
            escape(&p.sender_email),
            escape(&p.message).replace('\n', "<br>")
        );
        RenderedTemplate {
            subject,
            html,
            text,
        }
    }

    fn welcome(&self, p: &WelcomeParams) -> RenderedTemplate {
        RenderedTemplate {
            subject: format!("Welcome to {}", self.product_name),
            html: format!(
                "<p>Welcome, {}.</p>\n<p>Your {} plan is now active.</p>",
                escape(&p.organization_name),
                escape(&p.plan_type)
            ),
            text: format!(
                "Welcome, {}.\n\nYour {} plan is now active.\n",
                p.organization_name, p.plan_type
            ),
        }
    }

    fn renewal_reminder(&self, p: &RenewalReminderParams) -> RenderedTemplate {
        let amount = format_amount(p.amount);
        RenderedTemplate {
            subject: format!("Your {} membership renews on {}", self.product_name, p.period_end),
            html: format!(
                "<p>Dear {},</p>\n<p>Your membership renews on {} for {}.</p>",
                escape(&p.organization_name),
                escape(&p.period_end),
                amount
            ),
            text: format!(
                "Dear {},\n\nYour membership renews on {} for {}.\n",
                p.organization_name, p.period_end, amount
            ),
        }
    }

    fn payment_failed(&self, p: &PaymentFailedParams) -> RenderedTemplate {
        let amount = format_amount(p.amount);
        let reference = p
            .invoice_number
            .as_deref()
            .map(|n| format!(" for invoice {}", n))
            .unwrap_or_default();
        RenderedTemplate {
            subject: format!("Payment failed for your {} membership", self.product_name),
            html: format!(
                "<p>Dear {},</p>\n<p>We could not collect {}{}. Your membership is suspended until payment succeeds.</p>",
                escape(&p.organization_name),
                amount,
                escape(&reference)
            ),
            text: format!(
                "Dear {},\n\nWe could not collect {}{}. Your membership is suspended until payment succeeds.\n",
                p.organization_name, amount, reference
            ),
        }
    }

    fn generic(&self, template_type: TemplateType, fields: &Map<String, Value>) -> RenderedTemplate {
        let lines: Vec<(String, String)> = fields
            .iter()
            .map(|(k, v)| {
                let value = match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (k.clone(), value)
            })
            .collect();
        RenderedTemplate {
            subject: format!("[{}] {}", self.product_name, template_type),
            html: lines
                .iter()
                .map(|(k, v)| format!("<p><strong>{}:</strong> {}</p>", escape(k), escape(v)))
                .collect::<Vec<_>>()
                .join("\n"),
            text: lines
                .iter()
                .map(|(k, v)| format!("{}: {}\n", k, v))
                .collect(),
        }
    }
}

impl Default for BuiltinTemplateRenderer {
    fn default() -> Self {
        Self::new("Memberdesk")
    }
}

#[async_trait]
impl TemplateRenderer for BuiltinTemplateRenderer {
    async fn render(
        &self,
        template_type: TemplateType,
        params: &TemplateParams,
    ) -> Result<RenderedTemplate, DomainError> {
        params.validate_for(template_type)?;
        Ok(match params {
            TemplateParams::Known(KnownParams::Contact(p)) => self.contact(p),
            TemplateParams::Known(KnownParams::Welcome(p)) => self.welcome(p),
            TemplateParams::Known(KnownParams::RenewalReminder(p)) => self.renewal_reminder(p),
            TemplateParams::Known(KnownParams::PaymentFailed(p)) => self.payment_failed(p),
            TemplateParams::Generic(fields) => self.generic(template_type, fields),
        })
    }
}

/// Minor units as `major.minor`.
fn format_amount(minor: i64) -> String {
    let sign = if minor < 0 { "-" } else { "" };
    let abs = minor.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;

    fn contact() -> TemplateParams {
        TemplateParams::Known(KnownParams::Contact(ContactParams {
            sender_name: "Ada <admin>".into(),
            sender_email: "ada@example.org".into(),
            subject: "Venue".into(),
            message: "Line one\nLine two".into(),
        }))
    }

    #[tokio::test]
    async fn rendering_is_deterministic() {
        let renderer = BuiltinTemplateRenderer::default();

        let first = renderer.render(TemplateType::Contact, &contact()).await.unwrap();
        let second = renderer.render(TemplateType::Contact, &contact()).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.subject, "[Memberdesk] Contact: Venue");
    }

    #[tokio::test]
    async fn html_is_escaped() {
        let renderer = BuiltinTemplateRenderer::default();
        let rendered = renderer.render(TemplateType::Contact, &contact()).await.unwrap();
        assert!(rendered.html.contains("Ada &lt;admin&gt;"));
        assert!(rendered.html.contains("Line one<br>Line two"));
    }

    #[tokio::test]
    async fn mismatched_inputs_are_rejected() {
        let renderer = BuiltinTemplateRenderer::default();
        let err = renderer
            .render(TemplateType::Welcome, &contact())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[test]
    fn amounts_render_in_major_units() {
        assert_eq!(format_amount(108_000), "1080.00");
        assert_eq!(format_amount(5), "0.05");
        assert_eq!(format_amount(-250), "-2.50");
    }
}
