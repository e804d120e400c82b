//! Partial flag updates.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

use super::{ContentItem, ContentKind};

/// A set of flag writes. `None` means "leave as is", never "false".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlagPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_canceled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_deleted: Option<bool>,
}

impl FlagPatch {
    pub fn is_empty(&self) -> bool {
        self.is_published.is_none() && self.is_canceled.is_none() && self.is_deleted.is_none()
    }

    /// Rejects flags the kind does not have.
    pub fn validate_for(&self, kind: ContentKind) -> Result<(), ValidationError> {
        if self.is_canceled.is_some() && !kind.supports_cancel() {
            return Err(ValidationError::invalid_format(
                "is_canceled",
                format!("{} items cannot be canceled", kind),
            ));
        }
        Ok(())
    }

    /// Keeps only the writes that would change `item`.
    pub fn effective_against(&self, item: &ContentItem) -> FlagPatch {
        FlagPatch {
            is_published: self.is_published.filter(|v| *v != item.is_published),
            is_canceled: self
                .is_canceled
                .filter(|v| item.kind.supports_cancel() && *v != item.is_canceled),
            is_deleted: self.is_deleted.filter(|v| *v != item.is_deleted),
        }
    }
}
