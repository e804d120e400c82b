//! Notification send endpoint.
//!
//! CONTACT relays are open to any authenticated caller; the application
//! handler rejects every other template for non-administrators.

mod dto;
mod handlers;

pub use dto::{parse_params, parse_template_type, NotificationResponse, SendNotificationRequest};
pub use handlers::send_notification;

use axum::routing::post;
use axum::Router;

use super::AppState;

/// # Routes
/// - `POST /` - Render, send and record one notification
pub fn notification_routes() -> Router<AppState> {
    Router::new().route("/", post(send_notification))
}
