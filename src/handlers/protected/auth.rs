// handlers/protected/auth.rs - GET /api/auth/me
use axum::Extension;

use crate::middleware::{ApiResponse, ApiResult};
use crate::models::Principal;

/// Identity behind the presented token
pub async fn me(Extension(principal): Extension<Principal>) -> ApiResult<Principal> {
    Ok(ApiResponse::success(principal).message("User profile retrieved"))
}

#[cfg(test)]
mod tests {
    use crate::envelope::Envelope;
    use crate::models::Principal;
    use crate::testing::{read_json, TestApp};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn me_returns_principal() {
        let app = TestApp::new().await;
        let response = app.get("/api/auth/me", Some(&app.admin_token())).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body: Envelope<Principal> = read_json(response).await;
        assert_eq!(body.message, "User profile retrieved");
        assert_eq!(body.data.unwrap(), app.admin.principal());
    }

    #[tokio::test]
    async fn me_without_token_is_401() {
        let app = TestApp::new().await;
        assert_eq!(app.get("/api/auth/me", None).await.status(), StatusCode::UNAUTHORIZED);
    }
}
