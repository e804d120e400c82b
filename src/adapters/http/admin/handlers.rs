//! HTTP handlers for admin endpoints.
//!
//! These handlers parse path and body input, then hand the resolved caller to
//! the application layer.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::adapters::http::middleware::RequireCaller;
use crate::adapters::http::notifications::{parse_params, parse_template_type};
use crate::adapters::http::{ApiError, AppState};
use crate::application::handlers::{
    CreateSubscriptionCommand, DeleteContentCommand, ListAuditLogsQuery,
    ResendNotificationCommand, RollbackAuditEntryCommand, SendBatchCommand,
    UpdateContentFlagsCommand,
};
use crate::domain::content::{ContentItem, FlagPatch};

use super::dto::{
    parse_id, parse_kind, AuditLogsQueryParams, AuditLogsResponse, BatchResponse,
    ContentResponse, CreateSubscriptionRequest, ResendResponse, RollbackResponse,
    SendBatchRequest, SubscriptionResponse,
};

// ════════════════════════════════════════════════════════════════════════════════
// Subscriptions
// ════════════════════════════════════════════════════════════════════════════════

/// POST /admin/subscriptions
pub async fn create_subscription(
    State(state): State<AppState>,
    RequireCaller(caller): RequireCaller,
    Json(request): Json<CreateSubscriptionRequest>,
) -> Result<(StatusCode, Json<SubscriptionResponse>), ApiError> {
    let parsed = request.parse()?;
    let cmd = CreateSubscriptionCommand {
        organization_id: parsed.organization_id,
        plan_type: parsed.plan_type,
        discount_type: parsed.discount_type,
        payment_method: parsed.payment_method,
    };

    let result = state.create_subscription_handler().handle(&caller, cmd).await?;
    Ok((StatusCode::CREATED, Json(result.into())))
}

// ════════════════════════════════════════════════════════════════════════════════
// Content
// ════════════════════════════════════════════════════════════════════════════════

/// PATCH /admin/content/:kind/:id
pub async fn update_content_flags(
    State(state): State<AppState>,
    RequireCaller(caller): RequireCaller,
    Path((kind, id)): Path<(String, String)>,
    Json(patch): Json<FlagPatch>,
) -> Result<Json<ContentResponse>, ApiError> {
    let cmd = UpdateContentFlagsCommand {
        kind: parse_kind(&kind)?,
        id: parse_id(&id, "content id")?,
        patch,
    };

    let result = state.update_content_handler().handle(&caller, cmd).await?;
    Ok(Json(result.into()))
}

/// DELETE /admin/content/:kind/:id
pub async fn delete_content(
    State(state): State<AppState>,
    RequireCaller(caller): RequireCaller,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Json<ContentItem>, ApiError> {
    let cmd = DeleteContentCommand {
        kind: parse_kind(&kind)?,
        id: parse_id(&id, "content id")?,
    };

    let item = state.delete_content_handler().handle(&caller, cmd).await?;
    Ok(Json(item))
}

// ════════════════════════════════════════════════════════════════════════════════
// Audit
// ════════════════════════════════════════════════════════════════════════════════

/// GET /admin/audit-logs
pub async fn list_audit_logs(
    State(state): State<AppState>,
    RequireCaller(caller): RequireCaller,
    Query(params): Query<AuditLogsQueryParams>,
) -> Result<Json<AuditLogsResponse>, ApiError> {
    let query = ListAuditLogsQuery {
        resource_id: params.resource_id,
        limit: params.limit,
    };

    let entries = state.list_audit_logs_handler().handle(&caller, query).await?;
    Ok(Json(AuditLogsResponse { entries }))
}

/// POST /admin/audit-logs/:log_id/rollback
pub async fn rollback_audit_entry(
    State(state): State<AppState>,
    RequireCaller(caller): RequireCaller,
    Path(log_id): Path<String>,
) -> Result<Json<RollbackResponse>, ApiError> {
    let cmd = RollbackAuditEntryCommand {
        log_id: parse_id(&log_id, "audit log id")?,
    };

    let result = state.rollback_handler().handle(&caller, cmd).await?;
    Ok(Json(result.into()))
}

// ════════════════════════════════════════════════════════════════════════════════
// Notifications
// ════════════════════════════════════════════════════════════════════════════════

/// POST /admin/notifications/:history_id/resend
///
/// 200 when the resend was accepted, 500 when delivery failed.
pub async fn resend_notification(
    State(state): State<AppState>,
    RequireCaller(caller): RequireCaller,
    Path(history_id): Path<String>,
) -> Result<(StatusCode, Json<ResendResponse>), ApiError> {
    let cmd = ResendNotificationCommand {
        history_id: parse_id(&history_id, "history id")?,
    };

    let record = state
        .resend_notification_handler()
        .handle(&caller, cmd)
        .await?;
    let status = if record.is_sent() {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    Ok((status, Json(ResendResponse::from(&record))))
}

/// POST /admin/notifications/batch
pub async fn send_notification_batch(
    State(state): State<AppState>,
    RequireCaller(caller): RequireCaller,
    Json(request): Json<SendBatchRequest>,
) -> Result<Json<BatchResponse>, ApiError> {
    let cmd = SendBatchCommand {
        template_type: parse_template_type(&request.template_type)?,
        params: parse_params(&request.params)?,
        recipients: request.recipients,
    };

    let result = state
        .send_notification_handler()
        .send_batch(&caller, cmd)
        .await?;
    Ok(Json(result.into()))
}
