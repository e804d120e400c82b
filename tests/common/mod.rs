//! Shared harness for HTTP integration tests.
//!
//! Builds the real router over in-memory adapters and a recording mail
//! transport, and keeps handles to every store for assertions.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use memberdesk::adapters::auth::{HeaderIdentityProvider, ROLE_HEADER, USER_ID_HEADER};
use memberdesk::adapters::http::webhooks::SIGNATURE_HEADER;
use memberdesk::adapters::http::{router, AppState};
use memberdesk::adapters::in_memory::{
    InMemoryAuditLog, InMemoryContentRepository, InMemoryNotificationHistory,
    InMemoryOrganizationRepository, InMemoryProcessedEventStore, InMemorySubscriptionRepository,
};
use memberdesk::adapters::mail::RecordingMailTransport;
use memberdesk::adapters::templates::BuiltinTemplateRenderer;
use memberdesk::application::handlers::{DeliveryTimeouts, NotificationDelivery};
use memberdesk::domain::content::{ContentItem, ContentKind};
use memberdesk::domain::foundation::{ContentId, OrganizationId};
use memberdesk::domain::payment::{sign_payload, WebhookVerifier};
use memberdesk::domain::subscription::{BillingPolicy, Organization};
use memberdesk::ports::{ContentRepository, OrganizationRepository};

pub const WEBHOOK_SECRET: &str = "whsec_integration_secret";
pub const ADMIN_ID: &str = "admin-1";
pub const MEMBER_ID: &str = "member-1";

pub struct Harness {
    pub app: Router,
    pub subscriptions: Arc<InMemorySubscriptionRepository>,
    pub organizations: Arc<InMemoryOrganizationRepository>,
    pub content: Arc<InMemoryContentRepository>,
    pub audit_log: InMemoryAuditLog,
    pub processed_events: Arc<InMemoryProcessedEventStore>,
    pub history: Arc<InMemoryNotificationHistory>,
    pub mail: Arc<RecordingMailTransport>,
}

impl Harness {
    pub fn new() -> Self {
        let subscriptions = Arc::new(InMemorySubscriptionRepository::new());
        let organizations = Arc::new(InMemoryOrganizationRepository::new());
        let audit_log = InMemoryAuditLog::new();
        let content = Arc::new(InMemoryContentRepository::new(audit_log.clone()));
        let processed_events = Arc::new(InMemoryProcessedEventStore::new());
        let history = Arc::new(InMemoryNotificationHistory::new());
        let mail = Arc::new(RecordingMailTransport::new());

        let notifications = NotificationDelivery::new(
            Arc::new(BuiltinTemplateRenderer::new("Memberdesk")),
            mail.clone(),
            history.clone(),
            DeliveryTimeouts::default(),
        );

        let state = AppState {
            identity: Arc::new(HeaderIdentityProvider),
            subscriptions: subscriptions.clone(),
            organizations: organizations.clone(),
            content: content.clone(),
            audit_log: Arc::new(audit_log.clone()),
            processed_events: processed_events.clone(),
            notifications,
            verifier: WebhookVerifier::new(SecretString::new(WEBHOOK_SECRET.to_string())),
            policy: BillingPolicy::default(),
        };

        Self {
            app: router(state),
            subscriptions,
            organizations,
            content,
            audit_log,
            processed_events,
            history,
            mail,
        }
    }

    pub async fn organization(&self) -> OrganizationId {
        let id = OrganizationId::new();
        self.organizations
            .save(&Organization::customer(id, "Harbor Rowing Club"))
            .await
            .unwrap();
        id
    }

    pub async fn event(&self, title: &str) -> ContentItem {
        let item = ContentItem::new(ContentId::new(), ContentKind::Event, title);
        self.content.save(&item).await.unwrap();
        item
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    pub async fn as_admin(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.send(caller_request(method, uri, ADMIN_ID, "admin", body))
            .await
    }

    pub async fn as_member(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.send(caller_request(method, uri, MEMBER_ID, "member", body))
            .await
    }

    pub async fn deliver(&self, event: &Value) -> (StatusCode, Value) {
        self.send(signed_webhook(event)).await
    }
}

pub fn caller_request(
    method: Method,
    uri: &str,
    user_id: &str,
    role: &str,
    body: Option<Value>,
) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(USER_ID_HEADER, user_id)
        .header(ROLE_HEADER, role);
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub fn signed_webhook(event: &Value) -> Request<Body> {
    let payload = event.to_string();
    let signature = sign_payload(WEBHOOK_SECRET, chrono::Utc::now().timestamp(), &payload);
    Request::builder()
        .method(Method::POST)
        .uri("/webhooks/payment")
        .header(SIGNATURE_HEADER, signature)
        .header("content-type", "application/json")
        .body(Body::from(payload))
        .unwrap()
}

pub fn gateway_event(id: &str, event_type: &str, object: Value) -> Value {
    serde_json::json!({
        "id": id,
        "type": event_type,
        "created": chrono::Utc::now().timestamp(),
        "data": { "object": object }
    })
}
