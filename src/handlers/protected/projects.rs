use axum::extract::{Path, State};

use crate::error::ApiError;
use crate::handlers::fresh_slug;
use crate::middleware::{ApiResponse, ApiResult, JsonBody};
use crate::models::{non_blank, new_id, Project, ProjectInput};
use crate::server::AppState;

/// POST /api/projects
pub async fn project_create(
    State(state): State<AppState>,
    JsonBody(mut input): JsonBody<ProjectInput>,
) -> ApiResult<Project> {
    let title = non_blank(input.title.as_deref())
        .ok_or_else(|| ApiError::field_error("title", "Title is required"))?
        .to_string();

    let _slugs = state.lock_slugs().await;
    let existing = state.projects().all().await?;
    let requested = input.slug.take();
    let source = non_blank(requested.as_deref()).unwrap_or(&title);
    let slug = fresh_slug(source, &new_id(), existing.iter().map(|p| p.slug.as_str()));

    let project = Project::create(title, slug, input);
    state.projects().insert(&project).await?;
    tracing::info!("Created project {} ({})", project.slug, project.id);

    Ok(ApiResponse::created(project).message("Project created successfully"))
}

/// PUT /api/projects/:id - partial update; screenshots are appended
pub async fn project_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(mut input): JsonBody<ProjectInput>,
) -> ApiResult<Project> {
    let projects = state.projects();
    let mut project = projects
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Project not found"))?;

    if input.title.is_some() && non_blank(input.title.as_deref()).is_none() {
        return Err(ApiError::field_error("title", "Title cannot be empty"));
    }

    let _slugs = match input.slug {
        Some(_) => Some(state.lock_slugs().await),
        None => None,
    };
    if let Some(requested) = input.slug.take() {
        if let Some(requested) = non_blank(Some(requested.as_str())) {
            let existing = projects.all().await?;
            let others = existing.iter().filter(|p| p.id != project.id).map(|p| p.slug.as_str());
            input.slug = Some(fresh_slug(requested, &project.id, others));
        }
    }

    project.apply(input);
    if !projects.save(&project).await? {
        return Err(ApiError::not_found("Project not found"));
    }

    Ok(ApiResponse::success(project).message("Project updated successfully"))
}

/// DELETE /api/projects/:id
pub async fn project_delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    if !state.projects().delete(&id).await? {
        return Err(ApiError::not_found("Project not found"));
    }
    tracing::info!("Deleted project {}", id);

    Ok(ApiResponse::success(()).message("Project removed successfully"))
}

#[cfg(test)]
mod tests {
    use crate::envelope::{Envelope, Status};
    use crate::models::Project;
    use crate::testing::{read_json, TestApp};
    use axum::http::StatusCode;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tokio::task::JoinSet;

    #[tokio::test]
    async fn create_requires_token() {
        let app = TestApp::new().await;
        let response = app.post("/api/projects", None, json!({ "title": "Atlas" })).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(app.state.projects().all().await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn create_assigns_unique_slugs() {
        let app = TestApp::new().await;
        let token = app.admin_token();

        let first = app.post("/api/projects", Some(&token), json!({ "title": "Atlas Map" })).await;
        assert_eq!(first.status(), StatusCode::CREATED);
        let first: Envelope<Project> = read_json(first).await;
        assert_eq!(first.message, "Project created successfully");
        assert_eq!(first.data.unwrap().slug, "atlas-map");

        let second: Envelope<Project> = read_json(
            app.post("/api/projects", Some(&token), json!({ "title": "Atlas  map!", "techStack": ["rust"] }))
                .await,
        )
        .await;
        let second = second.data.unwrap();
        assert_eq!(second.slug, "atlas-map-1");
        assert_eq!(second.tech_stack, vec!["rust"]);
    }

    #[tokio::test]
    async fn create_without_title_is_400() {
        let app = TestApp::new().await;
        let response = app
            .post("/api/projects", Some(&app.admin_token()), json!({ "summary": "no title" }))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body: Envelope<Value> = read_json(response).await;
        assert_eq!(body.status, Status::Error);
        assert_eq!(body.errors.unwrap()[0].field.as_deref(), Some("title"));
    }

    #[tokio::test]
    async fn update_appends_screenshots() {
        let app = TestApp::new().await;
        let token = app.admin_token();
        let created: Envelope<Project> = read_json(
            app.post("/api/projects", Some(&token), json!({ "title": "Atlas", "screenshots": ["/uploads/a.png"] }))
                .await,
        )
        .await;
        let id = created.data.unwrap().id;

        let response = app
            .put(
                &format!("/api/projects/{}", id),
                Some(&token),
                json!({ "summary": "Maps", "screenshots": ["/uploads/b.png"] }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let updated: Envelope<Project> = read_json(response).await;
        let updated = updated.data.unwrap();
        assert_eq!(updated.summary, "Maps");
        assert_eq!(updated.title, "Atlas");
        assert_eq!(updated.screenshots, vec!["/uploads/a.png", "/uploads/b.png"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_get_distinct_slugs() {
        let app = Arc::new(TestApp::new().await);
        let token = app.admin_token();

        let mut tasks = JoinSet::new();
        for _ in 0..8 {
            let app = app.clone();
            let token = token.clone();
            tasks.spawn(async move {
                let response = app.post("/api/projects", Some(&token), json!({ "title": "Atlas" })).await;
                assert_eq!(response.status(), StatusCode::CREATED);
                let body: Envelope<Project> = read_json(response).await;
                body.data.unwrap().slug
            });
        }

        let mut slugs = Vec::new();
        while let Some(slug) = tasks.join_next().await {
            slugs.push(slug.unwrap());
        }
        slugs.sort();
        slugs.dedup();
        assert_eq!(slugs.len(), 8);
    }

    #[tokio::test]
    async fn delete_then_delete_again() {
        let app = TestApp::new().await;
        let token = app.admin_token();
        let created: Envelope<Project> =
            read_json(app.post("/api/projects", Some(&token), json!({ "title": "Atlas" })).await).await;
        let path = format!("/api/projects/{}", created.data.unwrap().id);

        let response = app.delete(&path, Some(&token)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = read_json(response).await;
        assert_eq!(body, json!({ "status": "success", "message": "Project removed successfully", "data": null }));

        let again = app.delete(&path, Some(&token)).await;
        assert_eq!(again.status(), StatusCode::NOT_FOUND);
    }
}
