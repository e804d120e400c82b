//! Caller resolution middleware and extractor.
//!
//! ```text
//! Request → identity_middleware → injects Caller into extensions
//!                                        ↓
//!                          Handler → RequireCaller reads from extensions
//! ```
//!
//! Requests without identity headers pass through untouched; the webhook
//! endpoint never needs a caller. Handlers that do use `RequireCaller`.

use std::sync::Arc;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::adapters::auth::USER_ID_HEADER;
use crate::adapters::http::error::ApiError;
use crate::domain::foundation::{Caller, ErrorCode};
use crate::ports::IdentityProvider;

pub type IdentityState = Arc<dyn IdentityProvider>;

pub async fn identity_middleware(
    State(identity): State<IdentityState>,
    mut request: Request,
    next: Next,
) -> Response {
    if !request.headers().contains_key(USER_ID_HEADER) {
        return next.run(request).await;
    }

    match identity.resolve(request.headers()).await {
        Ok(caller) => {
            request.extensions_mut().insert(caller);
            next.run(request).await
        }
        Err(err) => {
            tracing::debug!(error = %err, "Caller could not be resolved");
            ApiError::from(err).into_response()
        }
    }
}

/// Extractor for handlers that need an authenticated caller.
#[derive(Debug, Clone)]
pub struct RequireCaller(pub Caller);

#[axum::async_trait]
impl<S> FromRequestParts<S> for RequireCaller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Caller>()
            .cloned()
            .map(RequireCaller)
            .ok_or_else(|| ApiError::new(ErrorCode::Unauthorized, "Authentication required"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::auth::{HeaderIdentityProvider, ROLE_HEADER};
    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{middleware, Router};
    use tower::ServiceExt;

    async fn whoami(RequireCaller(caller): RequireCaller) -> String {
        caller.user_id.to_string()
    }

    fn app() -> Router {
        let identity: IdentityState = Arc::new(HeaderIdentityProvider::new());
        Router::new()
            .route("/whoami", get(whoami))
            .layer(middleware::from_fn_with_state(identity, identity_middleware))
    }

    #[tokio::test]
    async fn resolved_caller_reaches_handler() {
        let response = app()
            .oneshot(
                axum::http::Request::builder()
                    .uri("/whoami")
                    .header(USER_ID_HEADER, "admin-1")
                    .header(ROLE_HEADER, "admin")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_identity_is_rejected_by_extractor() {
        let response = app()
            .oneshot(
                axum::http::Request::builder()
                    .uri("/whoami")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_role_is_rejected_by_middleware() {
        let response = app()
            .oneshot(
                axum::http::Request::builder()
                    .uri("/whoami")
                    .header(USER_ID_HEADER, "u-1")
                    .header(ROLE_HEADER, "superuser")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
