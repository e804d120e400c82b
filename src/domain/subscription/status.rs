//! Subscription status state machine.

use crate::domain::foundation::StateMachine;
use serde::{Deserialize, Serialize};

/// Subscription lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionStatus {
    /// Awaiting gateway confirmation of the first payment.
    Pending,

    /// Paid and entitled.
    Active,

    /// A renewal payment failed. Not reactivated automatically.
    Suspended,

    /// Terminal.
    Canceled,
}

impl SubscriptionStatus {
    /// Returns true for the statuses covered by the one-per-organization rule.
    pub fn occupies_organization_slot(&self) -> bool {
        matches!(self, SubscriptionStatus::Pending | SubscriptionStatus::Active)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Pending => "PENDING",
            SubscriptionStatus::Active => "ACTIVE",
            SubscriptionStatus::Suspended => "SUSPENDED",
            SubscriptionStatus::Canceled => "CANCELED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(SubscriptionStatus::Pending),
            "ACTIVE" => Some(SubscriptionStatus::Active),
            "SUSPENDED" => Some(SubscriptionStatus::Suspended),
            "CANCELED" => Some(SubscriptionStatus::Canceled),
            _ => None,
        }
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StateMachine for SubscriptionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SubscriptionStatus::*;
        matches!(
            (self, target),
            // From PENDING
            (Pending, Active)
                | (Pending, Canceled)
            // From ACTIVE
                | (Active, Active) // Renewal
                | (Active, Suspended)
                | (Active, Canceled)
            // From SUSPENDED: no way back to ACTIVE
                | (Suspended, Canceled)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SubscriptionStatus::*;
        match self {
            Pending => vec![Active, Canceled],
            Active => vec![Active, Suspended, Canceled],
            Suspended => vec![Canceled],
            Canceled => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SubscriptionStatus::*;

    #[test]
    fn pending_can_activate_or_cancel() {
        assert_eq!(Pending.transition_to(Active), Ok(Active));
        assert_eq!(Pending.transition_to(Canceled), Ok(Canceled));
        assert!(Pending.transition_to(Suspended).is_err());
    }

    #[test]
    fn active_can_renew() {
        assert_eq!(Active.transition_to(Active), Ok(Active));
    }

    #[test]
    fn active_can_suspend_or_cancel() {
        assert!(Active.can_transition_to(&Suspended));
        assert!(Active.can_transition_to(&Canceled));
        assert!(!Active.can_transition_to(&Pending));
    }

    #[test]
    fn suspended_cannot_reactivate() {
        assert!(!Suspended.can_transition_to(&Active));
        assert!(Suspended.transition_to(Active).is_err());
        assert_eq!(Suspended.transition_to(Canceled), Ok(Canceled));
    }

    #[test]
    fn canceled_is_terminal() {
        assert!(Canceled.is_terminal());
        for target in [Pending, Active, Suspended, Canceled] {
            assert!(!Canceled.can_transition_to(&target));
        }
    }

    #[test]
    fn valid_transitions_agree_with_can_transition_to() {
        for from in [Pending, Active, Suspended, Canceled] {
            for to in [Pending, Active, Suspended, Canceled] {
                assert_eq!(
                    from.can_transition_to(&to),
                    from.valid_transitions().contains(&to),
                    "{:?} -> {:?}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn only_pending_and_active_occupy_slot() {
        assert!(Pending.occupies_organization_slot());
        assert!(Active.occupies_organization_slot());
        assert!(!Suspended.occupies_organization_slot());
        assert!(!Canceled.occupies_organization_slot());
    }

    #[test]
    fn status_parses_its_own_string() {
        for s in [Pending, Active, Suspended, Canceled] {
            assert_eq!(SubscriptionStatus::parse(s.as_str()), Some(s));
        }
    }
}
