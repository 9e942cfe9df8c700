//! HTTP client with the response interceptor.
//!
//! Every call returns `Result<T, ClientError>`. Envelopes are unwrapped to
//! their `data`, non-enveloped bodies are decoded as-is, and every failure
//! except a 401 publishes one error notification before it is returned.

use reqwest::{header::AUTHORIZATION, Method};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use thiserror::Error;
use url::Url;

use super::notify::{NotificationBus, Variant};
use super::storage::StorageError;
use crate::envelope::{Envelope, ErrorDetail, Status};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const DEGENERATE_ERROR_MESSAGE: &str = "Operation failed";
const FALLBACK_MESSAGE: &str = "Something went wrong";

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with an error (or an error envelope)
    #[error("{message}")]
    Api {
        status: u16,
        message: String,
        errors: Vec<ErrorDetail>,
    },

    /// No response was received
    #[error("{0}")]
    Transport(String),

    /// A body claimed to be an envelope but did not fit the schema
    #[error("Malformed response envelope: {0}")]
    MalformedEnvelope(String),

    /// `data` did not decode into the requested type
    #[error("Unexpected response data: {0}")]
    Decode(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Invalid request URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ClientError {
    /// HTTP status, when the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    pub fn errors(&self) -> &[ErrorDetail] {
        match self {
            ClientError::Api { errors, .. } => errors,
            _ => &[],
        }
    }

    /// Whether this failure is published as a notification. 401s are left
    /// to the session logic; local storage and URL errors never reach the
    /// wire.
    pub fn notifies(&self) -> bool {
        match self {
            ClientError::Api { status, .. } => *status != 401,
            ClientError::Storage(_) | ClientError::Url(_) => false,
            _ => true,
        }
    }
}

/// The `Authorization` header shared by every request of a session.
/// Readers snapshot it at dispatch time.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    header: Arc<RwLock<Option<String>>>,
}

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_bearer(&self, token: &str) {
        *self.write() = Some(format!("Bearer {}", token));
    }

    pub fn clear(&self) {
        *self.write() = None;
    }

    pub fn authorization(&self) -> Option<String> {
        match self.header.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Option<String>> {
        match self.header.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Apply the response rules to a status code and raw body. Pure: it neither
/// notifies nor logs.
pub fn intercept(status: u16, body: &[u8]) -> Result<Value, ClientError> {
    let parsed = parse_body(body);

    if !(200..300).contains(&status) {
        let message = parsed
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Request failed with status code {}", status));
        let errors = parsed
            .get("errors")
            .cloned()
            .and_then(|e| serde_json::from_value(e).ok())
            .unwrap_or_default();
        return Err(ClientError::Api { status, message, errors });
    }

    let is_envelope = parsed.as_object().map_or(false, |o| o.contains_key("status"));
    if !is_envelope {
        return Ok(parsed);
    }

    let envelope: Envelope<Value> =
        serde_json::from_value(parsed).map_err(|e| ClientError::MalformedEnvelope(e.to_string()))?;

    match envelope.status {
        Status::Success => Ok(envelope.data.unwrap_or(Value::Null)),
        Status::Error => {
            let message = Some(envelope.message)
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEGENERATE_ERROR_MESSAGE.to_string());
            Err(ClientError::Api {
                status,
                message,
                errors: envelope.errors.unwrap_or_default(),
            })
        }
    }
}

/// JSON when it parses, the text itself otherwise, `null` when empty
fn parse_body(body: &[u8]) -> Value {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(_) => Value::String(String::from_utf8_lossy(body).into_owned()),
    }
}

#[derive(Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    base: Url,
    credentials: Credentials,
    bus: NotificationBus,
}

impl HttpClient {
    pub fn new(base_url: &str, credentials: Credentials, bus: NotificationBus) -> Result<Self, ClientError> {
        let inner = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        // A trailing slash keeps any path prefix when joining endpoints
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let prefixed = format!("{}/", base.path());
            base.set_path(&prefixed);
        }

        Ok(Self {
            inner,
            base,
            credentials,
            bus,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn bus(&self) -> &NotificationBus {
        &self.bus
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.execute(Method::GET, path, None).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = self.encode(body)?;
        self.execute(Method::POST, path, Some(body)).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = self.encode(body)?;
        self.execute(Method::PUT, path, Some(body)).await
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = self.encode(body)?;
        self.execute(Method::PATCH, path, Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.execute(Method::DELETE, path, None).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, ClientError> {
        let url = self.endpoint(path)?;
        tracing::debug!("{} {}", method, url);

        let mut request = self.inner.request(method, url);
        if let Some(authorization) = self.credentials.authorization() {
            request = request.header(AUTHORIZATION, authorization);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let result = match request.send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                match response.bytes().await {
                    Ok(bytes) => intercept(status, &bytes),
                    Err(e) => Err(transport(e)),
                }
            }
            Err(e) => Err(transport(e)),
        };

        let decoded = result.and_then(|value| {
            serde_json::from_value(value).map_err(|e| ClientError::Decode(e.to_string()))
        });
        decoded.map_err(|err| self.surface(err))
    }

    /// `path` is relative to the base URL, leading slash or not
    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base.join(path.trim_start_matches('/'))?)
    }

    fn encode<B: Serialize + ?Sized>(&self, body: &B) -> Result<Value, ClientError> {
        serde_json::to_value(body).map_err(|e| self.surface(ClientError::Decode(e.to_string())))
    }

    fn surface(&self, err: ClientError) -> ClientError {
        if err.notifies() {
            self.bus.show(err.to_string(), Variant::Error);
        } else {
            tracing::debug!("Not notifying: {}", err);
        }
        err
    }
}

fn transport(err: reqwest::Error) -> ClientError {
    let message = err.to_string();
    if message.trim().is_empty() {
        ClientError::Transport(FALLBACK_MESSAGE.to_string())
    } else {
        ClientError::Transport(message)
    }
}
