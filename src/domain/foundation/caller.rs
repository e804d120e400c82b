//! Explicit caller identity.
//!
//! Every administrative operation receives the caller as a parameter. There is
//! no ambient session state anywhere in the domain or application layers.

use serde::{Deserialize, Serialize};

use super::{DomainError, ErrorCode, UserId};

/// Role resolved by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Staff of the operator organization. May mutate, roll back and resend.
    Administrator,
    /// Member of a customer organization. Read-only from this service's view.
    Member,
}

impl Role {
    /// Parses a role name as delivered by the identity provider.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" | "administrator" => Some(Role::Administrator),
            "member" => Some(Role::Member),
            _ => None,
        }
    }
}

/// The authenticated party performing an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: UserId,
    pub role: Role,
}

impl Caller {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Convenience constructor for an administrator.
    pub fn administrator(user_id: UserId) -> Self {
        Self::new(user_id, Role::Administrator)
    }

    pub fn is_administrator(&self) -> bool {
        self.role == Role::Administrator
    }

    /// Fails with `Forbidden` unless the caller is an administrator.
    pub fn require_administrator(&self) -> Result<(), DomainError> {
        if self.is_administrator() {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::Forbidden,
                format!("User {} is not an administrator", self.user_id),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_roles() {
        assert_eq!(Role::parse("Admin"), Some(Role::Administrator));
        assert_eq!(Role::parse("administrator"), Some(Role::Administrator));
        assert_eq!(Role::parse("member"), Some(Role::Member));
        assert_eq!(Role::parse("root"), None);
    }

    #[test]
    fn member_is_not_allowed_admin_operations() {
        let caller = Caller::new(UserId::new("u-1").unwrap(), Role::Member);
        let err = caller.require_administrator().unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[test]
    fn administrator_passes_check() {
        let caller = Caller::administrator(UserId::new("u-2").unwrap());
        assert!(caller.require_administrator().is_ok());
    }
}
