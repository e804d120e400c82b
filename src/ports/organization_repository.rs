//! Organization repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, OrganizationId};
use crate::domain::subscription::Organization;

#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    /// Insert or update an organization.
    async fn save(&self, organization: &Organization) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &OrganizationId) -> Result<Option<Organization>, DomainError>;
}
