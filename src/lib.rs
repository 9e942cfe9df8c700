pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod database;
pub mod envelope;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod server;

#[cfg(test)]
pub mod testing;
