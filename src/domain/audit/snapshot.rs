//! "Before" snapshots captured when a content item is updated.
//!
//! A snapshot is the minimal projection of the fields an update changed,
//! taken immediately before the change. Stored snapshots are parsed into a
//! closed set of shapes; anything else is kept verbatim as `Unrecognized`
//! and rollback refuses to act on it.

use serde::{Deserialize, Serialize};

use crate::domain::content::{ContentItem, ContentKind, FlagPatch};

/// Flags an event update can change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventFlags {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_canceled: Option<bool>,
}

/// Flags a notice update can change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoticeFlags {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
}

/// Recognized snapshot shapes, tagged by content kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentSnapshot {
    Event(EventFlags),
    Notice(NoticeFlags),
}

impl ContentSnapshot {
    /// Captures the current values of exactly the fields `patch` will change.
    ///
    /// Returns `None` when the patch changes nothing.
    pub fn capture(item: &ContentItem, patch: &FlagPatch) -> Option<Self> {
        let effective = patch.effective_against(item);
        let is_published = effective.is_published.map(|_| item.is_published);
        let snapshot = match item.kind {
            ContentKind::Event => ContentSnapshot::Event(EventFlags {
                is_published,
                is_canceled: effective.is_canceled.map(|_| item.is_canceled),
            }),
            ContentKind::Notice => ContentSnapshot::Notice(NoticeFlags { is_published }),
        };
        if snapshot.is_empty() {
            None
        } else {
            Some(snapshot)
        }
    }

    pub fn kind(&self) -> ContentKind {
        match self {
            ContentSnapshot::Event(_) => ContentKind::Event,
            ContentSnapshot::Notice(_) => ContentKind::Notice,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_patch().is_empty()
    }

    /// The writes that put the captured fields back.
    pub fn to_patch(&self) -> FlagPatch {
        match self {
            ContentSnapshot::Event(flags) => FlagPatch {
                is_published: flags.is_published,
                is_canceled: flags.is_canceled,
                is_deleted: None,
            },
            ContentSnapshot::Notice(flags) => FlagPatch {
                is_published: flags.is_published,
                is_canceled: None,
                is_deleted: None,
            },
        }
    }
}

/// A stored `before` value: either a recognized shape or raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BeforeSnapshot {
    Known(ContentSnapshot),
    Unrecognized(serde_json::Value),
}

impl BeforeSnapshot {
    /// Parses a stored value. Never fails: unknown shapes are kept as-is.
    pub fn from_value(value: &serde_json::Value) -> Self {
        match serde_json::from_value::<ContentSnapshot>(value.clone()) {
            Ok(snapshot) => BeforeSnapshot::Known(snapshot),
            Err(_) => BeforeSnapshot::Unrecognized(value.clone()),
        }
    }

    pub fn known(&self) -> Option<&ContentSnapshot> {
        match self {
            BeforeSnapshot::Known(snapshot) => Some(snapshot),
            BeforeSnapshot::Unrecognized(_) => None,
        }
    }
}

impl From<ContentSnapshot> for BeforeSnapshot {
    fn from(snapshot: ContentSnapshot) -> Self {
        BeforeSnapshot::Known(snapshot)
    }
}
