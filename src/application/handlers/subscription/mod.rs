//! Subscription handlers.
//!
//! - `CreateSubscriptionHandler` - administrator creates a subscription
//! - `SubscriptionLifecycle` - applies gateway events to subscriptions
//! - `HandleGatewayWebhookHandler` - verified, idempotent webhook entry point

mod create_subscription;
mod handle_gateway_webhook;
mod lifecycle;

pub use create_subscription::{
    CreateSubscriptionCommand, CreateSubscriptionHandler, CreateSubscriptionResult,
};
pub use handle_gateway_webhook::{
    HandleGatewayWebhookCommand, HandleGatewayWebhookHandler, WebhookOutcome,
};
pub use lifecycle::{GatewayEventDispatcher, LifecycleOutcome, SubscriptionLifecycle};
