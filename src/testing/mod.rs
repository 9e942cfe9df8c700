//! Router-level test harness over the in-memory store.

use axum::{
    body::Body,
    http::{header, Method, Request},
    response::Response,
    Router,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use crate::config::AppConfig;
use crate::database::MemoryStore;
use crate::models::User;
use crate::server::{self, AppState};

pub const ADMIN_EMAIL: &str = "admin@folio.test";
pub const ADMIN_PASSWORD: &str = "correct horse";

/// Development preset with cheap hashing and no rate limiting
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.api.enable_rate_limiting = false;
    config.api.enable_request_logging = false;
    config.security.jwt_secret = "test-secret".to_string();
    config.security.bcrypt_cost = 4;
    config.security.admin_email = ADMIN_EMAIL.to_string();
    config.security.admin_password = ADMIN_PASSWORD.to_string();
    config
}

/// One router per app, so rate-limit windows persist across requests
pub struct TestApp {
    pub state: AppState,
    pub admin: User,
    router: Router,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(config: AppConfig) -> Self {
        let state = AppState::new(config, Arc::new(MemoryStore::new())).expect("test keys");
        server::seed_admin(&state).await.expect("seed admin");
        let admin = state
            .users()
            .find_one(|u| u.email == ADMIN_EMAIL)
            .await
            .expect("users readable")
            .expect("admin seeded");

        let router = server::app(state.clone());
        Self { state, admin, router }
    }

    pub fn admin_token(&self) -> String {
        self.state.keys.issue(&self.admin.id).expect("token")
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        self.router()
            .oneshot(builder.body(body).expect("request"))
            .await
            .expect("infallible")
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> Response {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> Response {
        self.send(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: Option<&str>, body: Value) -> Response {
        self.send(Method::PATCH, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> Response {
        self.send(Method::DELETE, uri, token, None).await
    }

    /// POST an arbitrary (possibly broken) JSON body
    pub async fn post_raw(&self, uri: &str, body: &'static str) -> Response {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .expect("request");
        self.router().oneshot(request).await.expect("infallible")
    }
}

pub async fn read_json<T: DeserializeOwned>(response: Response) -> T {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        panic!("invalid JSON ({}): {}", e, String::from_utf8_lossy(&bytes))
    })
}
