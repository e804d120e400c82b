//! HandleGatewayWebhookHandler - verifies, deduplicates and dispatches gateway events.
//!
//! ## Processing steps
//!
//! 1. Verify the signature; failures are returned and the event is never processed
//! 2. Acknowledge unknown event types without touching the idempotency table
//! 3. Claim the event id; a second delivery of a claimed id is a no-op
//! 4. Dispatch to the lifecycle
//!
//! ## Failure handling
//!
//! A retryable failure releases the claim and is returned, so the HTTP layer
//! answers 503 and the gateway redelivers. Any other failure can never
//! succeed on redelivery: it is logged and acknowledged, and the claim stays.

use std::sync::Arc;

use crate::domain::payment::{GatewayEventType, WebhookError, WebhookVerifier};
use crate::ports::{ProcessedEventStore, ProcessedGatewayEvent, SaveResult};

use super::{GatewayEventDispatcher, LifecycleOutcome};

#[derive(Debug, Clone)]
pub struct HandleGatewayWebhookCommand {
    /// Raw request body, exactly as signed.
    pub payload: Vec<u8>,
    /// Value of the signature header.
    pub signature: String,
}

/// How a verified delivery was acknowledged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    Processed(LifecycleOutcome),
    /// The event id was already claimed by an earlier delivery.
    Duplicate,
    /// No handler for the event type.
    Ignored(String),
    /// Processing failed permanently; acknowledged so the gateway stops retrying.
    Acknowledged { reason: String },
}

pub struct HandleGatewayWebhookHandler {
    verifier: WebhookVerifier,
    processed_events: Arc<dyn ProcessedEventStore>,
    dispatcher: Arc<dyn GatewayEventDispatcher>,
}

impl HandleGatewayWebhookHandler {
    pub fn new(
        verifier: WebhookVerifier,
        processed_events: Arc<dyn ProcessedEventStore>,
        dispatcher: Arc<dyn GatewayEventDispatcher>,
    ) -> Self {
        Self {
            verifier,
            processed_events,
            dispatcher,
        }
    }

    /// # Errors
    ///
    /// - Authentication failures and `ParseError` for unverifiable deliveries
    /// - `Database` when processing failed transiently; the claim is released
    pub async fn handle(
        &self,
        cmd: HandleGatewayWebhookCommand,
    ) -> Result<WebhookOutcome, WebhookError> {
        let event = self
            .verifier
            .verify_and_parse(&cmd.payload, &cmd.signature)?;

        if event.parsed_type() == GatewayEventType::Unknown {
            tracing::debug!(event_id = %event.id, event_type = %event.event_type, "Ignoring gateway event");
            return Ok(WebhookOutcome::Ignored(event.event_type));
        }

        let claim = ProcessedGatewayEvent::new(&event.id, &event.event_type);
        if self.processed_events.claim(&claim).await? == SaveResult::AlreadyExists {
            tracing::info!(event_id = %event.id, "Gateway event already processed");
            return Ok(WebhookOutcome::Duplicate);
        }

        match self.dispatcher.dispatch(&event).await {
            Ok(outcome) => {
                tracing::info!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    outcome = ?outcome,
                    "Gateway event processed"
                );
                Ok(WebhookOutcome::Processed(outcome))
            }
            Err(WebhookError::Ignored(reason)) => Ok(WebhookOutcome::Ignored(reason)),
            Err(err) if err.is_retryable() => {
                if let Err(release_err) = self.processed_events.release(&event.id).await {
                    tracing::error!(
                        event_id = %event.id,
                        error = %release_err,
                        "Failed to release gateway event claim"
                    );
                }
                tracing::error!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    error = %err,
                    "Gateway event failed; awaiting redelivery"
                );
                Err(err)
            }
            Err(err) => {
                tracing::warn!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    code = %err.code(),
                    error = %err,
                    "Gateway event rejected"
                );
                Ok(WebhookOutcome::Acknowledged {
                    reason: err.to_string(),
                })
            }
        }
    }
}
