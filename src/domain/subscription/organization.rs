//! Subscribing organizations.

use crate::domain::foundation::{OrganizationId, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrganizationType {
    /// A member organization that subscribes to plans.
    Customer,
    /// The organization running the platform. Its staff are administrators.
    Operator,
}

impl OrganizationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrganizationType::Customer => "CUSTOMER",
            OrganizationType::Operator => "OPERATOR",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CUSTOMER" => Some(OrganizationType::Customer),
            "OPERATOR" => Some(OrganizationType::Operator),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrganizationId,
    pub name: String,
    pub organization_type: OrganizationType,
    pub created_at: Timestamp,
}

impl Organization {
    pub fn customer(id: OrganizationId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            organization_type: OrganizationType::Customer,
            created_at: Timestamp::now(),
        }
    }

    /// Only customer organizations may hold subscriptions.
    pub fn can_subscribe(&self) -> bool {
        self.organization_type == OrganizationType::Customer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_cannot_subscribe() {
        let mut org = Organization::customer(OrganizationId::new(), "Acme");
        assert!(org.can_subscribe());
        org.organization_type = OrganizationType::Operator;
        assert!(!org.can_subscribe());
    }
}
