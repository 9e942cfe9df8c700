use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::convert::Infallible;

use crate::error::ApiError;
use crate::models::Principal;
use crate::server::AppState;

/// Guard for protected routes.
///
/// Verifies the bearer token, resolves the user and attaches the
/// [`Principal`] to the request before the handler runs. Any failure ends
/// the request with a 401 envelope.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers()).ok_or_else(|| {
        tracing::debug!("Rejected {} {}: no token", request.method(), request.uri().path());
        ApiError::unauthorized("Not authorized, no token")
    })?;

    let principal = resolve_principal(&state, &token).await?;
    request.extensions_mut().insert(principal);

    Ok(next.run(request).await)
}

/// Token from `Authorization: Bearer <token>`, if there is a usable one
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_str = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?.trim();

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Verify signature + expiry and load the user behind the token
pub async fn resolve_principal(state: &AppState, token: &str) -> Result<Principal, ApiError> {
    let claims = state.keys.verify(token).map_err(|e| {
        tracing::warn!("Token verification failed: {}", e);
        ApiError::unauthorized("Not authorized, token failed")
    })?;

    match state.users().get(&claims.sub).await? {
        Some(user) => Ok(user.principal()),
        None => {
            tracing::warn!("Token subject '{}' no longer exists", claims.sub);
            Err(ApiError::unauthorized("Not authorized, user not found"))
        }
    }
}

/// Caller identity on public routes: a valid token yields a principal,
/// anything else is anonymous.
#[derive(Debug, Clone)]
pub struct MaybePrincipal(pub Option<Principal>);

#[async_trait]
impl FromRequestParts<AppState> for MaybePrincipal {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(principal) = parts.extensions.get::<Principal>() {
            return Ok(Self(Some(principal.clone())));
        }

        let principal = match bearer_token(&parts.headers) {
            Some(token) => resolve_principal(state, &token).await.ok(),
            None => None,
        };
        Ok(Self(principal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::{Envelope, Status};
    use crate::testing::{read_json, TestApp};
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        routing::get,
        Extension, Router,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    async fn whoami(Extension(principal): Extension<Principal>) -> String {
        principal.email
    }

    fn guarded(app: &TestApp) -> Router {
        Router::new()
            .route("/private", get(whoami))
            .route_layer(axum::middleware::from_fn_with_state(app.state.clone(), require_auth))
            .with_state(app.state.clone())
    }

    fn get_private(authorization: Option<&str>) -> HttpRequest<Body> {
        let mut builder = HttpRequest::builder().uri("/private");
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, "Basic abc".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, "Bearer    ".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, "Bearer abc.def".parse().unwrap());
        assert_eq!(bearer_token(&headers).as_deref(), Some("abc.def"));
    }

    #[tokio::test]
    async fn missing_header_is_rejected() {
        let app = TestApp::new().await;
        let response = guarded(&app).oneshot(get_private(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body: Envelope<Value> = read_json(response).await;
        assert_eq!(body.status, Status::Error);
        assert_eq!(body.message, "Not authorized, no token");
    }

    #[tokio::test]
    async fn forged_token_is_rejected() {
        let app = TestApp::new().await;
        let response = guarded(&app)
            .oneshot(get_private(Some("Bearer not-a-jwt")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body: Envelope<Value> = read_json(response).await;
        assert_eq!(body.message, "Not authorized, token failed");
        assert!(body.data.is_none());
    }

    #[tokio::test]
    async fn valid_token_attaches_principal() {
        let app = TestApp::new().await;
        let bearer = format!("Bearer {}", app.admin_token());
        let response = guarded(&app).oneshot(get_private(Some(&bearer))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], app.admin.email.as_bytes());
    }

    #[tokio::test]
    async fn token_for_deleted_user_is_rejected() {
        let app = TestApp::new().await;
        let bearer = format!("Bearer {}", app.admin_token());
        app.state.users().delete(&app.admin.id).await.unwrap();

        let response = guarded(&app).oneshot(get_private(Some(&bearer))).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: Envelope<Value> = read_json(response).await;
        assert_eq!(body.message, "Not authorized, user not found");
    }
}
