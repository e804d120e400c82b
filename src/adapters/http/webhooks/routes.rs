use axum::routing::post;
use axum::Router;

use super::handlers::handle_payment_webhook;
use crate::adapters::http::AppState;

/// # Routes
/// - `POST /payment` - Signed gateway deliveries
pub fn webhook_routes() -> Router<AppState> {
    Router::new().route("/payment", post(handle_payment_webhook))
}
