use axum::{
    extract::{Path, State},
    Extension,
};

use crate::error::ApiError;
use crate::handlers::fresh_slug;
use crate::handlers::public::blogs::find_blog;
use crate::middleware::{ApiResponse, ApiResult, JsonBody};
use crate::models::{new_id, non_blank, Blog, BlogInput, Principal};
use crate::server::AppState;

/// POST /api/blogs - author is the caller
pub async fn blog_create(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    JsonBody(input): JsonBody<BlogInput>,
) -> ApiResult<Blog> {
    let title = non_blank(input.title.as_deref())
        .ok_or_else(|| ApiError::field_error("title", "Title is required"))?
        .to_string();

    let _slugs = state.lock_slugs().await;
    let existing = state.blogs().all().await?;
    let slug = fresh_slug(&title, &new_id(), existing.iter().map(|b| b.slug.as_str()));

    let blog = Blog::create(title, slug, input, Some(principal));
    state.blogs().insert(&blog).await?;
    tracing::info!("Created blog {} (published: {})", blog.slug, blog.published);

    Ok(ApiResponse::created(blog).message("Blog created successfully"))
}

/// PUT /api/blogs/:slug
///
/// A changed title moves the post to a fresh slug; the old one stops
/// resolving.
pub async fn blog_update(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    JsonBody(input): JsonBody<BlogInput>,
) -> ApiResult<Blog> {
    let mut blog = find_blog(&state, &slug).await?;

    let retitled = match input.title.as_deref() {
        None => None,
        Some(title) => match non_blank(Some(title)) {
            None => return Err(ApiError::field_error("title", "Title cannot be empty")),
            Some(title) if title == blog.title => None,
            Some(title) => Some(title.to_string()),
        },
    };

    let _slugs = match retitled {
        Some(_) => Some(state.lock_slugs().await),
        None => None,
    };
    if let Some(title) = &retitled {
        let existing = state.blogs().all().await?;
        let others = existing.iter().filter(|b| b.id != blog.id).map(|b| b.slug.as_str());
        blog.slug = fresh_slug(title, &blog.id, others);
    }

    blog.apply(input);
    save(&state, &blog).await?;

    Ok(ApiResponse::success(blog).message("Blog updated successfully"))
}

/// DELETE /api/blogs/:slug
pub async fn blog_delete(State(state): State<AppState>, Path(slug): Path<String>) -> ApiResult<()> {
    let blog = find_blog(&state, &slug).await?;
    if !state.blogs().delete(&blog.id).await? {
        return Err(ApiError::not_found("Blog not found"));
    }
    tracing::info!("Deleted blog {}", blog.slug);

    Ok(ApiResponse::success(()).message("Blog deleted successfully"))
}

/// PATCH /api/blogs/:slug/publish - flip the published flag
pub async fn blog_publish(State(state): State<AppState>, Path(slug): Path<String>) -> ApiResult<Blog> {
    let mut blog = find_blog(&state, &slug).await?;
    blog.toggle_published();
    save(&state, &blog).await?;

    let message = if blog.published {
        "Blog published"
    } else {
        "Blog unpublished"
    };
    Ok(ApiResponse::success(blog).message(message))
}

async fn save(state: &AppState, blog: &Blog) -> Result<(), ApiError> {
    if state.blogs().save(blog).await? {
        Ok(())
    } else {
        Err(ApiError::not_found("Blog not found"))
    }
}
