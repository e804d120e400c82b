//! Audit domain - append-only log of administrative and lifecycle mutations.
//!
//! # Module Structure
//!
//! - `action` - Closed set of audited actions and the rollbackable subset
//! - `snapshot` - Typed "before" snapshots with an unrecognized fallback
//! - `entry` - Audit log entries and their metadata

mod action;
mod entry;
mod snapshot;

pub use action::{AuditAction, RollbackClass, RollbackableAction};
pub use entry::{AuditLogEntry, BEFORE_KEY};
pub use snapshot::{BeforeSnapshot, ContentSnapshot, EventFlags, NoticeFlags};
