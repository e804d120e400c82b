//! Audit handlers.
//!
//! ## Commands
//! - Recording audit entries (used by every mutating handler)
//! - Rolling back a rollbackable entry
//!
//! ## Queries
//! - Listing recent entries or entries for one resource

mod list_audit_logs;
mod recorder;
mod rollback_audit_entry;

pub use list_audit_logs::{ListAuditLogsHandler, ListAuditLogsQuery};
pub use recorder::AuditRecorder;
pub use rollback_audit_entry::{
    RollbackAuditEntryCommand, RollbackAuditEntryHandler, RollbackAuditEntryResult,
};
