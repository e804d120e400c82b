//! Template rendering collaborator.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::notification::{RenderedTemplate, TemplateParams, TemplateType};

/// Produces subject and bodies for a template.
///
/// Implementations must be deterministic: the same type and inputs yield the
/// same output, which is what makes resend reproducible.
#[async_trait]
pub trait TemplateRenderer: Send + Sync {
    async fn render(
        &self,
        template_type: TemplateType,
        params: &TemplateParams,
    ) -> Result<RenderedTemplate, DomainError>;
}
