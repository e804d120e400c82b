//! Identity provider collaborator.
//!
//! Resolves the caller of an inbound request. Session mechanics live outside
//! this service; the result is passed explicitly into every admin operation.

use async_trait::async_trait;
use http::HeaderMap;

use crate::domain::foundation::{Caller, DomainError};

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// # Errors
    ///
    /// `Unauthorized` if the request carries no resolvable identity.
    async fn resolve(&self, headers: &HeaderMap) -> Result<Caller, DomainError>;
}
