use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::server::AppState;

/// GET /api/health - liveness plus a store round-trip.
///
/// Deliberately bare JSON (no envelope) so load balancers can read it.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let time = chrono::Utc::now().to_rfc3339();

    match state.store.ping().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "ok": true, "time": time }))),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "ok": false, "time": time })),
            )
        }
    }
}
