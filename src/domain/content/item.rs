//! Content items: events and notices.

use crate::domain::foundation::{ContentId, Timestamp};
use serde::{Deserialize, Serialize};

use super::FlagPatch;

/// Kind of content item. Determines which flags exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    /// A scheduled event. Can be canceled.
    Event,
    /// A published notice.
    Notice,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Event => "event",
            ContentKind::Notice => "notice",
        }
    }

    /// Parses the path segment form, accepting singular or plural.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "event" | "events" => Some(ContentKind::Event),
            "notice" | "notices" => Some(ContentKind::Notice),
            _ => None,
        }
    }

    pub fn supports_cancel(&self) -> bool {
        matches!(self, ContentKind::Event)
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event or notice managed by administrators.
///
/// Deletion is logical: `is_deleted` hides the item and is trivially reversible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: ContentId,
    pub kind: ContentKind,
    pub title: String,
    pub is_published: bool,
    /// Always false for notices.
    pub is_canceled: bool,
    pub is_deleted: bool,
    pub updated_at: Timestamp,
}

impl ContentItem {
    /// Creates an unpublished item.
    pub fn new(id: ContentId, kind: ContentKind, title: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            title: title.into(),
            is_published: false,
            is_canceled: false,
            is_deleted: false,
            updated_at: Timestamp::now(),
        }
    }

    /// Writes every field present in `patch`. Absent fields are untouched.
    pub fn apply(&mut self, patch: &FlagPatch, now: Timestamp) {
        if let Some(v) = patch.is_published {
            self.is_published = v;
        }
        if let Some(v) = patch.is_canceled {
            if self.kind.supports_cancel() {
                self.is_canceled = v;
            }
        }
        if let Some(v) = patch.is_deleted {
            self.is_deleted = v;
        }
        self.updated_at = now;
    }
}
