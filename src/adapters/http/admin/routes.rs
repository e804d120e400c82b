use axum::routing::{get, patch, post};
use axum::Router;

use super::handlers::{
    create_subscription, delete_content, list_audit_logs, resend_notification,
    rollback_audit_entry, send_notification_batch, update_content_flags,
};
use crate::adapters::http::AppState;

/// Create the admin API router.
///
/// # Routes
///
/// ## Subscriptions
/// - `POST /subscriptions` - Create a subscription for an organization
///
/// ## Content
/// - `PATCH /content/:kind/:id` - Update publication, cancellation or deletion flags
/// - `DELETE /content/:kind/:id` - Logically delete an item
///
/// ## Audit
/// - `GET /audit-logs` - Recent entries, optionally for one resource
/// - `POST /audit-logs/:log_id/rollback` - Reverse a rollbackable entry
///
/// ## Notifications
/// - `POST /notifications/batch` - Send one template to many recipients
/// - `POST /notifications/:history_id/resend` - Resend a recorded notification
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/subscriptions", post(create_subscription))
        .route(
            "/content/:kind/:id",
            patch(update_content_flags).delete(delete_content),
        )
        .route("/audit-logs", get(list_audit_logs))
        .route("/audit-logs/:log_id/rollback", post(rollback_audit_entry))
        .route("/notifications/batch", post(send_notification_batch))
        .route(
            "/notifications/:history_id/resend",
            post(resend_notification),
        )
}
