use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

use crate::config::RateLimitRule;
use crate::error::ApiError;

const LIMIT_HEADER: HeaderName = HeaderName::from_static("ratelimit-limit");
const REMAINING_HEADER: HeaderName = HeaderName::from_static("ratelimit-remaining");

/// Windows are swept once the table grows past this many clients
const SWEEP_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window request counter keyed by client address
#[derive(Debug, Clone)]
pub struct RateLimiter {
    rule: Arc<RateLimitRule>,
    windows: Arc<Mutex<HashMap<String, Window>>>,
}

impl RateLimiter {
    pub fn new(rule: RateLimitRule) -> Self {
        Self {
            rule: Arc::new(rule),
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Count one request; `Some(remaining)` when allowed, `None` when over
    /// the limit.
    pub fn hit(&self, key: &str) -> Option<u32> {
        let now = Instant::now();
        let window_len = self.rule.window();
        let mut windows = match self.windows.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if windows.len() > SWEEP_THRESHOLD {
            windows.retain(|_, w| now.duration_since(w.started) < window_len);
        }

        let window = windows.entry(key.to_string()).or_insert(Window { started: now, count: 0 });
        if now.duration_since(window.started) >= window_len {
            *window = Window { started: now, count: 0 };
        }

        if window.count >= self.rule.max_requests {
            return None;
        }
        window.count += 1;
        Some(self.rule.max_requests - window.count)
    }

    pub fn rule(&self) -> &RateLimitRule {
        &self.rule
    }
}

pub async fn rate_limit(State(limiter): State<RateLimiter>, request: Request, next: Next) -> Response {
    let key = client_key(&request);
    let limit = HeaderValue::from(limiter.rule().max_requests);

    match limiter.hit(&key) {
        Some(remaining) => {
            let mut response = next.run(request).await;
            response.headers_mut().insert(LIMIT_HEADER, limit);
            response.headers_mut().insert(REMAINING_HEADER, HeaderValue::from(remaining));
            response
        }
        None => {
            tracing::warn!("Rate limit exceeded for {} on {}", key, request.uri().path());
            let mut response = ApiError::too_many_requests(limiter.rule().message.clone()).into_response();
            response.headers_mut().insert(LIMIT_HEADER, limit);
            response.headers_mut().insert(REMAINING_HEADER, HeaderValue::from(0u32));
            response
        }
    }
}

fn client_key(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
