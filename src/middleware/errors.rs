//! Terminal error handling: everything that escapes a controller still
//! leaves the server as an error envelope.

use axum::{
    async_trait,
    body::Body,
    extract::{FromRequest, Request},
    http::{
        header::{CONTENT_LENGTH, CONTENT_TYPE},
        StatusCode, Uri,
    },
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::any::Any;
use tower_http::catch_panic::ResponseForPanic;

use crate::envelope::{Envelope, ErrorDetail};
use crate::error::ApiError;

/// Upper bound on a framework-generated body we are willing to rewrite
const MAX_REWRITE_BODY: usize = 64 * 1024;

/// Turns a panicking handler into a 500 error envelope. The panic payload is
/// attached as `errors[0].stack` only when `expose_details` is set.
#[derive(Debug, Clone, Copy)]
pub struct PanicEnvelope {
    expose_details: bool,
}

impl PanicEnvelope {
    pub fn new(expose_details: bool) -> Self {
        Self { expose_details }
    }
}

impl ResponseForPanic for PanicEnvelope {
    type ResponseBody = Body;

    fn response_for_panic(&mut self, err: Box<dyn Any + Send + 'static>) -> Response<Self::ResponseBody> {
        let detail = if let Some(s) = err.downcast_ref::<String>() {
            s.clone()
        } else if let Some(s) = err.downcast_ref::<&str>() {
            s.to_string()
        } else {
            "panic with non-string payload".to_string()
        };

        tracing::error!("[Error] handler panicked: {}", detail);

        let errors = self.expose_details.then(|| vec![ErrorDetail::stack(detail)]);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(Envelope::<Value>::error("Internal Server Error", errors)),
        )
            .into_response()
    }
}

/// Rewrite non-JSON error responses produced outside the controllers
/// (method mismatch, body limits, ...) into error envelopes, keeping their
/// status code and headers.
pub async fn enforce_envelope(request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    let status = response.status();

    if !(status.is_client_error() || status.is_server_error()) || is_json(&response) {
        return response;
    }

    let (parts, body) = response.into_parts();
    let text = axum::body::to_bytes(body, MAX_REWRITE_BODY)
        .await
        .ok()
        .and_then(|bytes| String::from_utf8(bytes.to_vec()).ok())
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty());

    let message = text.unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string());
    tracing::debug!("Enveloping bare {} response: {}", status, message);

    let mut rewritten = (status, Json(Envelope::<Value>::error(message, None))).into_response();
    for (name, value) in parts.headers.iter() {
        if name != CONTENT_TYPE && name != CONTENT_LENGTH {
            rewritten.headers_mut().insert(name.clone(), value.clone());
        }
    }
    rewritten
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/json"))
        .unwrap_or(false)
}

/// Fallback for unknown routes
pub async fn route_not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("Not found - {}", uri.path()))
}

/// `Json<T>` whose rejection is a 400 error envelope
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::Status;
    use crate::testing::read_json;
    use axum::{routing::post, Router};
    use tower::ServiceExt;
    use tower_http::catch_panic::CatchPanicLayer;

    async fn explode() -> &'static str {
        panic!("database exploded")
    }

    async fn echo(JsonBody(value): JsonBody<Value>) -> Json<Value> {
        Json(value)
    }

    fn router(expose_details: bool) -> Router {
        Router::new()
            .route("/explode", axum::routing::get(explode))
            .route("/echo", post(echo))
            .fallback(route_not_found)
            .layer(axum::middleware::from_fn(enforce_envelope))
            .layer(CatchPanicLayer::custom(PanicEnvelope::new(expose_details)))
    }

    fn request(method: &str, uri: &str, body: &'static str) -> Request {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn panic_becomes_500_envelope_with_stack_outside_production() {
        let response = router(true).oneshot(request("GET", "/explode", "")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body: Envelope<Value> = read_json(response).await;
        assert_eq!(body.status, Status::Error);
        let errors = body.errors.unwrap();
        assert_eq!(errors[0].stack.as_deref(), Some("database exploded"));
    }

    #[tokio::test]
    async fn panic_details_hidden_in_production() {
        let response = router(false).oneshot(request("GET", "/explode", "")).await.unwrap();
        let body: Envelope<Value> = read_json(response).await;
        assert_eq!(body.message, "Internal Server Error");
        assert!(body.errors.is_none());
    }

    #[tokio::test]
    async fn unknown_route_is_404_envelope() {
        let response = router(true).oneshot(request("GET", "/nowhere", "")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: Envelope<Value> = read_json(response).await;
        assert_eq!(body.message, "Not found - /nowhere");
    }

    #[tokio::test]
    async fn method_mismatch_keeps_status() {
        let response = router(true).oneshot(request("DELETE", "/echo", "")).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert!(response.headers().contains_key("allow"));
        let body: Envelope<Value> = read_json(response).await;
        assert_eq!(body.status, Status::Error);
    }

    #[tokio::test]
    async fn malformed_json_is_400_envelope() {
        let response = router(true).oneshot(request("POST", "/echo", "{not json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Envelope<Value> = read_json(response).await;
        assert_eq!(body.status, Status::Error);
        assert!(!body.message.is_empty());
    }

    #[tokio::test]
    async fn valid_json_passes_through() {
        let response = router(true).oneshot(request("POST", "/echo", r#"{"a":1}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = read_json(response).await;
        assert_eq!(body["a"], 1);
    }
}
