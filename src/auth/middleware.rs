//! Authentication Middleware
//!
//! Two independent stages that routes compose in order:
//!
//! 1. [`require_auth`] reads `Authorization: Bearer <token>`, verifies it and
//!    stores the decoded [`Identity`] in the request extensions (401 on failure).
//! 2. [`require_role`] checks that identity against a required [`Role`]
//!    (403 on mismatch).
//!
//! Each stage short-circuits, so a rejected request never reaches the handler.

use crate::api::ApiError;
use crate::auth::jwt::JwtHandler;
use crate::auth::models::{Identity, Role};
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Token carried by a well-formed `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Reject requests without a valid token; attach the identity otherwise.
pub async fn require_auth(
    State(jwt_handler): State<Arc<JwtHandler>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers()).ok_or(ApiError::MissingToken)?;
    let claims = jwt_handler.verify(token)?;

    debug!(user_id = claims.user.id, role = %claims.user.role, "Authenticated request");
    req.extensions_mut().insert(claims.user);

    Ok(next.run(req).await)
}

/// Reject authenticated requests whose role differs from the required one.
///
/// Must run after [`require_auth`]; a request without an identity is treated
/// as unauthenticated.
pub async fn require_role(
    State(required): State<Role>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = req
        .extensions()
        .get::<Identity>()
        .ok_or(ApiError::MissingToken)?;

    if identity.role != required {
        warn!(
            user_id = identity.id,
            role = %identity.role,
            required = %required,
            "Role gate rejected request"
        );
        return Err(ApiError::Forbidden);
    }

    Ok(next.run(req).await)
}

/// Handlers behind [`require_auth`] can take `Identity` as an argument.
#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .ok_or(ApiError::MissingToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::TOKEN_TTL_SECS;
    use axum::{body::Body, http::StatusCode, middleware, routing::get, Router};
    use chrono::Utc;
    use tower::{ServiceBuilder, ServiceExt};

    const SECRET: &str = "middleware-test-secret";

    fn identity(role: Role) -> Identity {
        Identity {
            id: 1,
            username: "alice".to_string(),
            role,
        }
    }

    async fn whoami(identity: Identity) -> String {
        identity.username
    }

    fn app(required: Option<Role>) -> Router {
        let jwt = Arc::new(JwtHandler::new(SECRET));
        let router = Router::new().route("/", get(whoami));
        match required {
            None => router.route_layer(middleware::from_fn_with_state(jwt, require_auth)),
            Some(role) => router.route_layer(
                ServiceBuilder::new()
                    .layer(middleware::from_fn_with_state(jwt, require_auth))
                    .layer(middleware::from_fn_with_state(role, require_role)),
            ),
        }
    }

    async fn call(app: Router, authorization: Option<String>) -> StatusCode {
        let mut req = axum::http::Request::builder().uri("/");
        if let Some(value) = authorization {
            req = req.header(AUTHORIZATION, value);
        }
        app.oneshot(req.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    fn bearer(role: Role) -> Option<String> {
        let token = JwtHandler::new(SECRET).issue(&identity(role)).unwrap();
        Some(format!("Bearer {token}"))
    }

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, "Bearer abc.def.ghi".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));

        headers.insert(AUTHORIZATION, "bearer abc".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc"));

        for bad in ["abc.def.ghi", "Basic dXNlcjpwYXNz", "Bearer ", "Bearer"] {
            headers.insert(AUTHORIZATION, bad.parse().unwrap());
            assert_eq!(bearer_token(&headers), None, "{bad:?}");
        }
    }

    #[tokio::test]
    async fn test_missing_or_malformed_header_is_401() {
        assert_eq!(call(app(None), None).await, StatusCode::UNAUTHORIZED);
        assert_eq!(
            call(app(None), Some("Token abc".to_string())).await,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            call(app(None), Some("Bearer not-a-jwt".to_string())).await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler() {
        let response = app(None)
            .oneshot(
                axum::http::Request::builder()
                    .uri("/")
                    .header(AUTHORIZATION, bearer(Role::User).unwrap())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"alice");
    }

    #[tokio::test]
    async fn test_expired_and_foreign_tokens_are_401() {
        let stale = JwtHandler::new(SECRET)
            .issue_at(&identity(Role::Admin), Utc::now().timestamp() - 2 * TOKEN_TTL_SECS)
            .unwrap();
        assert_eq!(
            call(app(None), Some(format!("Bearer {stale}"))).await,
            StatusCode::UNAUTHORIZED
        );

        let foreign = JwtHandler::new("someone-else").issue(&identity(Role::Admin)).unwrap();
        assert_eq!(
            call(app(None), Some(format!("Bearer {foreign}"))).await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn test_role_gate() {
        assert_eq!(
            call(app(Some(Role::Admin)), bearer(Role::User)).await,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            call(app(Some(Role::Admin)), bearer(Role::Admin)).await,
            StatusCode::OK
        );
        // authentication still runs first
        assert_eq!(
            call(app(Some(Role::Admin)), None).await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn test_role_gate_without_auth_stage_is_401() {
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .route_layer(middleware::from_fn_with_state(Role::Admin, require_role));
        assert_eq!(call(app, None).await, StatusCode::UNAUTHORIZED);
    }
}
