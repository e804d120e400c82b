//! Payment gateway webhook endpoint.
//!
//! No caller is involved; every delivery is authenticated by its signature.

mod handlers;
mod routes;

pub use handlers::{handle_payment_webhook, WebhookAck, SIGNATURE_HEADER};
pub use routes::webhook_routes;
