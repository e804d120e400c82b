//! Subscription domain - plans, pricing, lifecycle and invoices.
//!
//! # Module Structure
//!
//! - `plan` - Plan type, discount type, payment method and feature enums
//! - `pricing` - Pure price and entitlement calculation
//! - `status` - Subscription status state machine
//! - `aggregate` - Subscription aggregate entity
//! - `invoice` - Invoice records keyed by external reference
//! - `organization` - Subscribing organizations
//! - `policy` - Term length and invoice due dates
//! - `errors` - Subscription-specific errors

mod aggregate;
mod errors;
mod invoice;
mod organization;
mod plan;
mod policy;
mod pricing;
mod status;

pub use aggregate::Subscription;
pub use errors::SubscriptionError;
pub use invoice::{Invoice, InvoiceStatus};
pub use organization::{Organization, OrganizationType};
pub use plan::{DiscountType, Feature, PaymentMethod, PlanType};
pub use policy::{BillingPolicy, DEFAULT_BANK_TRANSFER_DUE_DAYS, DEFAULT_TERM_DAYS};
pub use pricing::{calculate_price, entitlements_for, has_entitlement, PriceBreakdown};
pub use status::SubscriptionStatus;
