//! Audited actions.
//!
//! Actions are namespaced `resource_type.verb`. The rollbackable subset is a
//! separate enum so that adding an action cannot silently make it reversible.

use serde::{Deserialize, Serialize};

use crate::domain::content::ContentKind;

/// Every action the audit log can record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditAction {
    #[serde(rename = "subscription.create")]
    SubscriptionCreate,
    #[serde(rename = "subscription.activate")]
    SubscriptionActivate,
    #[serde(rename = "subscription.renew")]
    SubscriptionRenew,
    #[serde(rename = "subscription.suspend")]
    SubscriptionSuspend,
    #[serde(rename = "subscription.cancel")]
    SubscriptionCancel,
    #[serde(rename = "event.update")]
    EventUpdate,
    #[serde(rename = "event.delete")]
    EventDelete,
    #[serde(rename = "notice.update")]
    NoticeUpdate,
    #[serde(rename = "notice.delete")]
    NoticeDelete,
    #[serde(rename = "organization.update")]
    OrganizationUpdate,
    #[serde(rename = "notification.resend")]
    NotificationResend,
    #[serde(rename = "audit_log.rollback")]
    AuditLogRollback,
}

impl AuditAction {
    pub const ALL: [AuditAction; 12] = [
        AuditAction::SubscriptionCreate,
        AuditAction::SubscriptionActivate,
        AuditAction::SubscriptionRenew,
        AuditAction::SubscriptionSuspend,
        AuditAction::SubscriptionCancel,
        AuditAction::EventUpdate,
        AuditAction::EventDelete,
        AuditAction::NoticeUpdate,
        AuditAction::NoticeDelete,
        AuditAction::OrganizationUpdate,
        AuditAction::NotificationResend,
        AuditAction::AuditLogRollback,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::SubscriptionCreate => "subscription.create",
            AuditAction::SubscriptionActivate => "subscription.activate",
            AuditAction::SubscriptionRenew => "subscription.renew",
            AuditAction::SubscriptionSuspend => "subscription.suspend",
            AuditAction::SubscriptionCancel => "subscription.cancel",
            AuditAction::EventUpdate => "event.update",
            AuditAction::EventDelete => "event.delete",
            AuditAction::NoticeUpdate => "notice.update",
            AuditAction::NoticeDelete => "notice.delete",
            AuditAction::OrganizationUpdate => "organization.update",
            AuditAction::NotificationResend => "notification.resend",
            AuditAction::AuditLogRollback => "audit_log.rollback",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == s)
    }

    /// The rollbackable view of this action, if it has one.
    ///
    /// Exhaustive on purpose: a new variant does not compile until it is
    /// classified here.
    pub fn rollbackable(&self) -> Option<RollbackableAction> {
        match self {
            AuditAction::EventUpdate => Some(RollbackableAction::EventUpdate),
            AuditAction::EventDelete => Some(RollbackableAction::EventDelete),
            AuditAction::NoticeUpdate => Some(RollbackableAction::NoticeUpdate),
            AuditAction::NoticeDelete => Some(RollbackableAction::NoticeDelete),
            AuditAction::SubscriptionCreate
            | AuditAction::SubscriptionActivate
            | AuditAction::SubscriptionRenew
            | AuditAction::SubscriptionSuspend
            | AuditAction::SubscriptionCancel
            | AuditAction::OrganizationUpdate
            | AuditAction::NotificationResend
            | AuditAction::AuditLogRollback => None,
        }
    }

    pub fn is_rollbackable(&self) -> bool {
        self.rollbackable().is_some()
    }

    /// Update action for a content kind.
    pub fn content_update(kind: ContentKind) -> Self {
        RollbackableAction::update(kind).into()
    }

    /// Delete action for a content kind.
    pub fn content_delete(kind: ContentKind) -> Self {
        RollbackableAction::delete(kind).into()
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a rollbackable action is reversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollbackClass {
    /// Restore the fields captured in the `before` snapshot.
    Update,
    /// Clear the logical-delete flag.
    Delete,
}

/// The subset of [`AuditAction`] that can be rolled back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RollbackableAction {
    EventUpdate,
    EventDelete,
    NoticeUpdate,
    NoticeDelete,
}

impl RollbackableAction {
    pub fn update(kind: ContentKind) -> Self {
        match kind {
            ContentKind::Event => RollbackableAction::EventUpdate,
            ContentKind::Notice => RollbackableAction::NoticeUpdate,
        }
    }

    pub fn delete(kind: ContentKind) -> Self {
        match kind {
            ContentKind::Event => RollbackableAction::EventDelete,
            ContentKind::Notice => RollbackableAction::NoticeDelete,
        }
    }

    pub fn class(&self) -> RollbackClass {
        match self {
            RollbackableAction::EventUpdate | RollbackableAction::NoticeUpdate => {
                RollbackClass::Update
            }
            RollbackableAction::EventDelete | RollbackableAction::NoticeDelete => {
                RollbackClass::Delete
            }
        }
    }

    /// Kind of content item this action targets.
    pub fn content_kind(&self) -> ContentKind {
        match self {
            RollbackableAction::EventUpdate | RollbackableAction::EventDelete => ContentKind::Event,
            RollbackableAction::NoticeUpdate | RollbackableAction::NoticeDelete => {
                ContentKind::Notice
            }
        }
    }
}

impl From<RollbackableAction> for AuditAction {
    fn from(action: RollbackableAction) -> Self {
        match action {
            RollbackableAction::EventUpdate => AuditAction::EventUpdate,
            RollbackableAction::EventDelete => AuditAction::EventDelete,
            RollbackableAction::NoticeUpdate => AuditAction::NoticeUpdate,
            RollbackableAction::NoticeDelete => AuditAction::NoticeDelete,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rollbackable_set_is_content_updates_and_deletes() {
        let rollbackable: Vec<_> = AuditAction::ALL
            .into_iter()
            .filter(AuditAction::is_rollbackable)
            .collect();
        assert_eq!(
            rollbackable,
            vec![
                AuditAction::EventUpdate,
                AuditAction::EventDelete,
                AuditAction::NoticeUpdate,
                AuditAction::NoticeDelete,
            ]
        );
    }

    #[test]
    fn rollback_action_is_never_rollbackable() {
        assert!(!AuditAction::AuditLogRollback.is_rollbackable());
    }

    #[test]
    fn rollbackable_round_trips_into_audit_action() {
        for action in AuditAction::ALL {
            if let Some(r) = action.rollbackable() {
                assert_eq!(AuditAction::from(r), action);
            }
        }
    }

    #[test]
    fn serde_uses_namespaced_names() {
        let json = serde_json::to_string(&AuditAction::AuditLogRollback).unwrap();
        assert_eq!(json, "\"audit_log.rollback\"");
        let back: AuditAction = serde_json::from_str("\"notice.delete\"").unwrap();
        assert_eq!(back, AuditAction::NoticeDelete);
    }

    #[test]
    fn parse_agrees_with_as_str() {
        for action in AuditAction::ALL {
            assert_eq!(AuditAction::parse(action.as_str()), Some(action));
        }
        assert_eq!(AuditAction::parse("event.publish"), None);
    }

    #[test]
    fn classes_and_kinds() {
        assert_eq!(RollbackableAction::EventDelete.class(), RollbackClass::Delete);
        assert_eq!(RollbackableAction::NoticeUpdate.class(), RollbackClass::Update);
        assert_eq!(
            RollbackableAction::NoticeUpdate.content_kind(),
            ContentKind::Notice
        );
        assert_eq!(
            AuditAction::content_update(ContentKind::Event),
            AuditAction::EventUpdate
        );
    }
}
