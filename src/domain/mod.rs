//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, caller, errors, timestamps)
//! - `subscription` - Plans, pricing, subscription lifecycle and invoices
//! - `payment` - Signed payment gateway events
//! - `content` - Administrator-managed events and notices
//! - `audit` - Audit log actions, snapshots and entries
//! - `notification` - Templates and notification history

pub mod audit;
pub mod content;
pub mod foundation;
pub mod notification;
pub mod payment;
pub mod subscription;

