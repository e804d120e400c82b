//! HTTP adapters - REST API implementations.
//!
//! - `webhooks` - Signed payment gateway deliveries
//! - `admin` - Administrative subscription, content, audit and notification endpoints
//! - `notifications` - Notification sends open to authenticated callers
//! - `middleware` - Caller resolution
//!
//! `router` assembles them with request tracing.

pub mod admin;
pub mod error;
pub mod middleware;
pub mod notifications;
pub mod state;
pub mod webhooks;

pub use error::{ApiError, ErrorResponse};
pub use state::AppState;

use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use self::middleware::identity_middleware;

/// Builds the complete application router.
///
/// # Routes
/// - `GET /health`
/// - `POST /webhooks/payment`
/// - `POST /notifications`
/// - `/admin/...` (see [`admin::admin_routes`])
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/webhooks", webhooks::webhook_routes())
        .nest("/notifications", notifications::notification_routes())
        .nest("/admin", admin::admin_routes())
        .layer(axum::middleware::from_fn_with_state(
            state.identity.clone(),
            identity_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}
