use axum::extract::{Path, State};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::Project;
use crate::server::AppState;

/// GET /api/projects - every project, newest first
pub async fn project_list(State(state): State<AppState>) -> ApiResult<Vec<Project>> {
    let mut projects = state.projects().all().await?;
    projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(ApiResponse::success(projects).message("Projects retrieved successfully"))
}

/// GET /api/projects/:slug - the path segment is matched against the slug
/// first and the id second, so admin tooling can address by either.
pub async fn project_get(State(state): State<AppState>, Path(key): Path<String>) -> ApiResult<Project> {
    let project = state
        .projects()
        .find_one(|p| p.slug == key)
        .await?;

    let project = match project {
        Some(project) => Some(project),
        None => state.projects().get(&key).await?,
    };

    project
        .map(|p| ApiResponse::success(p).message("Project retrieved successfully"))
        .ok_or_else(|| ApiError::not_found("Project not found"))
}

#[cfg(test)]
mod tests {
    use crate::envelope::{Envelope, Status};
    use crate::models::{Project, ProjectInput};
    use crate::testing::{read_json, TestApp};
    use axum::http::StatusCode;
    use serde_json::Value;

    async fn seed(app: &TestApp, title: &str, slug: &str) -> Project {
        let project = Project::create(title.to_string(), slug.to_string(), ProjectInput::default());
        app.state.projects().insert(&project).await.unwrap();
        project
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let app = TestApp::new().await;
        seed(&app, "Older", "older").await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        seed(&app, "Newer", "newer").await;

        let body: Envelope<Vec<Project>> = read_json(app.get("/api/projects", None).await).await;
        assert_eq!(body.message, "Projects retrieved successfully");
        let slugs: Vec<_> = body.data.unwrap().into_iter().map(|p| p.slug).collect();
        assert_eq!(slugs, vec!["newer", "older"]);
    }

    #[tokio::test]
    async fn get_by_slug_or_id() {
        let app = TestApp::new().await;
        let project = seed(&app, "Atlas", "atlas").await;

        let by_slug: Envelope<Project> = read_json(app.get("/api/projects/atlas", None).await).await;
        assert_eq!(by_slug.data.unwrap().id, project.id);

        let by_id: Envelope<Project> =
            read_json(app.get(&format!("/api/projects/{}", project.id), None).await).await;
        assert_eq!(by_id.data.unwrap().slug, "atlas");
    }

    #[tokio::test]
    async fn missing_project_is_404_envelope() {
        let app = TestApp::new().await;
        let response = app.get("/api/projects/ghost", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body: Envelope<Value> = read_json(response).await;
        assert_eq!(body.status, Status::Error);
        assert_eq!(body.message, "Project not found");
    }
}
