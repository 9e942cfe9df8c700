//! Entities shared by the API handlers and the client library.
//!
//! Field names follow the wire format (`_id`, camelCase), so the same types
//! are stored in the document store, returned in envelopes and decoded by the
//! client.

pub mod blog;
pub mod message;
pub mod project;
pub mod slug;
pub mod user;

pub use blog::{Blog, BlogInput, BlogPage, BlogQuery, Pagination, Seo};
pub use message::{Message, MessageInput, MessageStatusUpdate};
pub use project::{ImpactMetric, Project, ProjectImpact, ProjectInput, ProjectLinks};
pub use user::{LoginRequest, LoginResponse, Principal, User};

/// Fresh document id
pub fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Trimmed, non-empty text or `None`
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
