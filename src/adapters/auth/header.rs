//! Header-based identity provider.
//!
//! The service runs behind an authenticating gateway that strips client
//! supplied identity headers and sets its own. This adapter reads them back.
//!
//! ```text
//! X-User-Id: admin-42
//! X-User-Role: administrator
//! ```

use async_trait::async_trait;
use http::HeaderMap;

use crate::domain::foundation::{Caller, DomainError, ErrorCode, Role, UserId};
use crate::ports::IdentityProvider;

pub const USER_ID_HEADER: &str = "X-User-Id";
pub const ROLE_HEADER: &str = "X-User-Role";

/// Resolves the caller from `X-User-Id` and `X-User-Role`.
///
/// A missing or empty user id is `Unauthorized`. A missing role resolves to
/// `Member`; an unknown role is `Unauthorized`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderIdentityProvider;

impl HeaderIdentityProvider {
    pub fn new() -> Self {
        Self
    }
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

#[async_trait]
impl IdentityProvider for HeaderIdentityProvider {
    async fn resolve(&self, headers: &HeaderMap) -> Result<Caller, DomainError> {
        let user_id = header_value(headers, USER_ID_HEADER)
            .ok_or_else(|| DomainError::new(ErrorCode::Unauthorized, "Authentication required"))
            .and_then(|raw| {
                UserId::new(raw)
                    .map_err(|_| DomainError::new(ErrorCode::Unauthorized, "Invalid user id"))
            })?;

        let role = match header_value(headers, ROLE_HEADER) {
            None => Role::Member,
            Some(raw) => Role::parse(raw).ok_or_else(|| {
                DomainError::new(ErrorCode::Unauthorized, format!("Unknown role: {}", raw))
            })?,
        };

        Ok(Caller::new(user_id, role))
    }
}
