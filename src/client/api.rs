//! Typed wrappers, one per endpoint.

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::http::{ClientError, HttpClient};
use crate::models::{
    Blog, BlogInput, BlogPage, BlogQuery, LoginRequest, LoginResponse, Message, MessageInput,
    MessageStatusUpdate, Principal, Project, ProjectInput,
};

/// Body of `GET /api/health` (not enveloped)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub ok: bool,
    #[serde(default)]
    pub time: Option<String>,
}

/// Percent-encode one path segment. Form encoding writes spaces as `+`,
/// which a path reads literally; a literal `+` is already `%2B` here.
fn segment(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

pub async fn health(http: &HttpClient) -> Result<Health, ClientError> {
    http.get("/api/health").await
}

// Auth

pub async fn login(http: &HttpClient, email: &str, password: &str) -> Result<LoginResponse, ClientError> {
    let request = LoginRequest {
        email: Some(email.to_string()),
        password: Some(password.to_string()),
    };
    http.post("/api/auth/login", &request).await
}

pub async fn me(http: &HttpClient) -> Result<Principal, ClientError> {
    http.get("/api/auth/me").await
}

// Projects

pub async fn list_projects(http: &HttpClient) -> Result<Vec<Project>, ClientError> {
    http.get("/api/projects").await
}

pub async fn get_project(http: &HttpClient, slug: &str) -> Result<Project, ClientError> {
    http.get(&format!("/api/projects/{}", segment(slug))).await
}

pub async fn create_project(http: &HttpClient, input: &ProjectInput) -> Result<Project, ClientError> {
    http.post("/api/projects", input).await
}

pub async fn update_project(http: &HttpClient, id: &str, input: &ProjectInput) -> Result<Project, ClientError> {
    http.put(&format!("/api/projects/{}", segment(id)), input).await
}

pub async fn delete_project(http: &HttpClient, id: &str) -> Result<(), ClientError> {
    http.delete(&format!("/api/projects/{}", segment(id))).await
}

// Blogs

pub async fn list_blogs(http: &HttpClient, query: &BlogQuery) -> Result<BlogPage, ClientError> {
    http.get(&format!("/api/blogs?{}", query.to_query_string())).await
}

pub async fn get_blog(http: &HttpClient, slug: &str) -> Result<Blog, ClientError> {
    http.get(&format!("/api/blogs/{}", segment(slug))).await
}

pub async fn create_blog(http: &HttpClient, input: &BlogInput) -> Result<Blog, ClientError> {
    http.post("/api/blogs", input).await
}

pub async fn update_blog(http: &HttpClient, slug: &str, input: &BlogInput) -> Result<Blog, ClientError> {
    http.put(&format!("/api/blogs/{}", segment(slug)), input).await
}

pub async fn delete_blog(http: &HttpClient, slug: &str) -> Result<(), ClientError> {
    http.delete(&format!("/api/blogs/{}", segment(slug))).await
}

pub async fn toggle_publish(http: &HttpClient, slug: &str) -> Result<Blog, ClientError> {
    http.patch(&format!("/api/blogs/{}/publish", segment(slug)), &json!({})).await
}

// Messages

pub async fn send_message(http: &HttpClient, input: &MessageInput) -> Result<Message, ClientError> {
    http.post("/api/messages", input).await
}

pub async fn list_messages(http: &HttpClient) -> Result<Vec<Message>, ClientError> {
    http.get("/api/messages").await
}

/// `read: None` toggles
pub async fn set_message_read(http: &HttpClient, id: &str, read: Option<bool>) -> Result<Message, ClientError> {
    http.patch(&format!("/api/messages/{}", segment(id)), &MessageStatusUpdate { read })
        .await
}

pub async fn delete_message(http: &HttpClient, id: &str) -> Result<(), ClientError> {
    http.delete(&format!("/api/messages/{}", segment(id))).await
}

#[cfg(test)]
mod tests {
    use super::segment;

    #[test]
    fn segments_are_path_encoded() {
        assert_eq!(segment("a b"), "a%20b");
        assert_eq!(segment("c++"), "c%2B%2B");
        assert_eq!(segment("a/b?c"), "a%2Fb%3Fc");
        assert_eq!(segment("hello-rust_1.0"), "hello-rust_1.0");
    }
}
