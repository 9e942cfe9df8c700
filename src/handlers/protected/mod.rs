// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Mounted behind `middleware::require_auth`; the verified principal is in
// the request extensions before any of these run.

pub mod auth; // GET /api/auth/me
pub mod blogs; // POST/PUT/DELETE /api/blogs, PATCH /api/blogs/:slug/publish
pub mod messages; // GET/PATCH/DELETE /api/messages
pub mod projects; // POST/PUT/DELETE /api/projects

pub use auth::me;
pub use blogs::{blog_create, blog_delete, blog_publish, blog_update};
pub use messages::{message_delete, message_list, message_update};
pub use projects::{project_create, project_delete, project_update};
