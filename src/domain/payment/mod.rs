//! Payment gateway domain - signed webhook events and their payloads.
//!
//! # Module Structure
//!
//! - `gateway_event` - Event envelope, event types and typed payload objects
//! - `webhook_verifier` - HMAC-SHA256 signature verification
//! - `webhook_errors` - Error taxonomy with retry semantics

mod gateway_event;
mod webhook_errors;
mod webhook_verifier;

pub use gateway_event::{
    CheckoutSession, GatewayEvent, GatewayEventData, GatewayEventType, GatewayInvoice,
    GatewaySubscription, SUBSCRIPTION_CYCLE,
};
pub use webhook_errors::WebhookError;
pub use webhook_verifier::{sign_payload, SignatureHeader, WebhookVerifier, DEFAULT_TOLERANCE_SECS};

#[cfg(test)]
pub use gateway_event::GatewayEventBuilder;
