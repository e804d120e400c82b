use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::adapters::http::middleware::RequireCaller;
use crate::adapters::http::{ApiError, AppState};
use crate::application::handlers::SendNotificationCommand;

use super::dto::{parse_params, parse_template_type, NotificationResponse, SendNotificationRequest};

/// POST /notifications
///
/// 201 when the mail was accepted, 502 when delivery failed. Both are recorded.
pub async fn send_notification(
    State(state): State<AppState>,
    RequireCaller(caller): RequireCaller,
    Json(request): Json<SendNotificationRequest>,
) -> Result<(StatusCode, Json<NotificationResponse>), ApiError> {
    let cmd = SendNotificationCommand {
        template_type: parse_template_type(&request.template_type)?,
        params: parse_params(&request.params)?,
        recipient: request.recipient,
    };

    let record = state.send_notification_handler().send(&caller, cmd).await?;
    let status = if record.is_sent() {
        StatusCode::CREATED
    } else {
        StatusCode::BAD_GATEWAY
    };
    Ok((status, Json(NotificationResponse::from(record))))
}
