//! Administrator-managed content whose flag mutations are audited and reversible.

mod item;
mod patch;

pub use item::{ContentItem, ContentKind};
pub use patch::FlagPatch;
