pub mod auth;
pub mod blogs;
pub mod messages;
pub mod projects;
