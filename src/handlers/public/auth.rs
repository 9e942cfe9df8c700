// handlers/public/auth.rs - POST /api/auth/login
use axum::extract::State;

use crate::auth::verify_password;
use crate::envelope::ErrorDetail;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, JsonBody};
use crate::models::{non_blank, LoginRequest, LoginResponse};
use crate::server::AppState;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Exchange email + password for a bearer token.
///
/// Unknown email and wrong password are indistinguishable to the caller.
pub async fn login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let email = non_blank(request.email.as_deref());
    let password = request.password.as_deref().filter(|p| !p.is_empty());

    let (email, password) = match (email, password) {
        (Some(email), Some(password)) => (email, password),
        (email, password) => {
            let mut errors = Vec::new();
            if email.is_none() {
                errors.push(ErrorDetail::field("email", "Email is required"));
            }
            if password.is_none() {
                errors.push(ErrorDetail::field("password", "Password is required"));
            }
            return Err(ApiError::validation_error("Email and password are required", errors));
        }
    };

    let user = state
        .users()
        .find_one(|user| user.email.eq_ignore_ascii_case(email))
        .await?;

    let Some(user) = user else {
        tracing::warn!("Login rejected: unknown email {}", email);
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    };

    if !verify_password(password.to_string(), user.password_hash.clone()).await {
        tracing::warn!("Login rejected: bad password for {}", user.email);
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    let token = state.keys.issue(&user.id)?;
    tracing::info!("User {} logged in", user.email);

    Ok(ApiResponse::success(LoginResponse {
        token,
        principal: user.principal(),
    })
    .message("Login successful"))
}
