//! HTTP handler for gateway deliveries.
//!
//! The response status is what drives gateway redelivery: 2xx stops it,
//! 4xx stops it, 5xx asks for another attempt.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::adapters::http::{AppState, ErrorResponse};
use crate::application::handlers::{HandleGatewayWebhookCommand, WebhookOutcome};
use crate::domain::payment::WebhookError;

pub const SIGNATURE_HEADER: &str = "Stripe-Signature";

/// Body of a 200 answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WebhookAck {
    pub received: bool,
    /// `processed`, `duplicate`, `ignored` or `acknowledged`.
    pub result: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl From<WebhookOutcome> for WebhookAck {
    fn from(outcome: WebhookOutcome) -> Self {
        let (result, detail) = match outcome {
            WebhookOutcome::Processed(outcome) => ("processed", Some(format!("{:?}", outcome))),
            WebhookOutcome::Duplicate => ("duplicate", None),
            WebhookOutcome::Ignored(event_type) => ("ignored", Some(event_type)),
            WebhookOutcome::Acknowledged { reason } => ("acknowledged", Some(reason)),
        };
        Self {
            received: true,
            result: result.to_string(),
            detail,
        }
    }
}

/// POST /webhooks/payment
pub async fn handle_payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(signature) = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
    else {
        tracing::warn!("Gateway delivery without signature header");
        return webhook_error_response(WebhookError::InvalidSignature);
    };

    let cmd = HandleGatewayWebhookCommand {
        payload: body.to_vec(),
        signature: signature.to_string(),
    };

    match state.webhook_handler().handle(cmd).await {
        Ok(outcome) => (StatusCode::OK, Json(WebhookAck::from(outcome))).into_response(),
        Err(err) => webhook_error_response(err),
    }
}

fn webhook_error_response(err: WebhookError) -> Response {
    let status = err.status_code();
    if err.is_retryable() {
        tracing::error!(error = %err, "Gateway delivery failed, requesting redelivery");
    } else if err.is_authentication_failure() {
        tracing::warn!(error = %err, "Rejected unverifiable gateway delivery");
    }
    let body = ErrorResponse {
        code: err.code().to_string(),
        message: err.to_string(),
    };
    (status, Json(body)).into_response()
}
