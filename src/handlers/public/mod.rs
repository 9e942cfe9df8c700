// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Security Level: none. Blog reads accept an optional bearer token so an
// admin sees drafts; every other route ignores identity entirely.
// Rate limiting for login and contact submission is attached in server.rs.

pub mod auth; // POST /api/auth/login
pub mod blogs; // GET /api/blogs, GET /api/blogs/:slug
pub mod health; // GET /api/health
pub mod messages; // POST /api/messages
pub mod projects; // GET /api/projects, GET /api/projects/:id

pub use auth::login;
pub use blogs::{blog_get, blog_list};
pub use health::health;
pub use messages::message_create;
pub use projects::{project_get, project_list};
