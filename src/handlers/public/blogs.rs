// handlers/public/blogs.rs - blog reads with optional caller identity
use axum::extract::{Path, RawQuery, State};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, MaybePrincipal};
use crate::models::{Blog, BlogPage, BlogQuery};
use crate::server::AppState;

/// GET /api/blogs
///
/// Filters: `published`, `search`, repeated `tags` / `categories`,
/// `featured`, `page`, `limit`. Anonymous callers only ever see published
/// posts, whatever `published` they ask for.
pub async fn blog_list(
    State(state): State<AppState>,
    MaybePrincipal(principal): MaybePrincipal,
    RawQuery(raw): RawQuery,
) -> ApiResult<BlogPage> {
    let mut query = BlogQuery::parse(raw.as_deref());
    if principal.is_none() {
        query.published = Some(true);
    }

    let page = query.paginate(state.blogs().all().await?);
    Ok(ApiResponse::success(page).message("Blogs retrieved successfully"))
}

/// GET /api/blogs/:slug - drafts are 404 for anonymous callers
pub async fn blog_get(
    State(state): State<AppState>,
    MaybePrincipal(principal): MaybePrincipal,
    Path(slug): Path<String>,
) -> ApiResult<Blog> {
    let blog = find_blog(&state, &slug).await?;
    if !blog.published && principal.is_none() {
        return Err(ApiError::not_found("Blog not found"));
    }

    Ok(ApiResponse::success(blog).message("Blog retrieved successfully"))
}

pub(crate) async fn find_blog(state: &AppState, slug: &str) -> Result<Blog, ApiError> {
    state
        .blogs()
        .find_one(|b| b.slug == slug)
        .await?
        .ok_or_else(|| ApiError::not_found("Blog not found"))
}

#[cfg(test)]
mod tests {
    use crate::envelope::Envelope;
    use crate::models::{Blog, BlogInput, BlogPage};
    use crate::testing::{read_json, TestApp};
    use axum::http::StatusCode;

    async fn seed(app: &TestApp, title: &str, published: bool, tags: &[&str]) -> Blog {
        let blog = Blog::create(
            title.to_string(),
            crate::models::slug::slugify(title),
            BlogInput {
                content: Some("some words here".to_string()),
                published: Some(published),
                tags: Some(tags.iter().map(|t| t.to_string()).collect()),
                ..Default::default()
            },
            None,
        );
        app.state.blogs().insert(&blog).await.unwrap();
        blog
    }

    fn slugs(page: &BlogPage) -> Vec<&str> {
        page.blogs.iter().map(|b| b.slug.as_str()).collect()
    }

    #[tokio::test]
    async fn anonymous_listing_hides_drafts() {
        let app = TestApp::new().await;
        seed(&app, "Live", true, &[]).await;
        seed(&app, "Draft", false, &[]).await;

        let body: Envelope<BlogPage> = read_json(app.get("/api/blogs?published=false", None).await).await;
        let page = body.data.unwrap();
        assert_eq!(slugs(&page), vec!["live"]);
        assert_eq!(page.pagination.total, 1);
    }

    #[tokio::test]
    async fn admin_listing_sees_everything_and_filters() {
        let app = TestApp::new().await;
        let token = app.admin_token();
        seed(&app, "Live", true, &["rust"]).await;
        seed(&app, "Draft", false, &["rust"]).await;
        seed(&app, "Other", true, &["go"]).await;

        let all: Envelope<BlogPage> = read_json(app.get("/api/blogs", Some(&token)).await).await;
        assert_eq!(all.data.unwrap().pagination.total, 3);

        let drafts: Envelope<BlogPage> =
            read_json(app.get("/api/blogs?published=false", Some(&token)).await).await;
        assert_eq!(slugs(&drafts.data.unwrap()), vec!["draft"]);

        let tagged: Envelope<BlogPage> =
            read_json(app.get("/api/blogs?tags=rust&limit=1", Some(&token)).await).await;
        let tagged = tagged.data.unwrap();
        assert_eq!(tagged.blogs.len(), 1);
        assert_eq!(tagged.pagination.total, 2);
        assert_eq!(tagged.pagination.pages, 2);
    }

    #[tokio::test]
    async fn invalid_token_reads_as_anonymous() {
        let app = TestApp::new().await;
        seed(&app, "Draft", false, &[]).await;

        let body: Envelope<BlogPage> = read_json(app.get("/api/blogs", Some("garbage")).await).await;
        assert!(body.data.unwrap().blogs.is_empty());
    }

    #[tokio::test]
    async fn draft_detail_is_404_for_anonymous() {
        let app = TestApp::new().await;
        seed(&app, "Draft", false, &[]).await;

        let anonymous = app.get("/api/blogs/draft", None).await;
        assert_eq!(anonymous.status(), StatusCode::NOT_FOUND);

        let admin = app.get("/api/blogs/draft", Some(&app.admin_token())).await;
        assert_eq!(admin.status(), StatusCode::OK);
        let body: Envelope<Blog> = read_json(admin).await;
        assert!(!body.data.unwrap().published);
    }
}
