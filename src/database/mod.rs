pub mod memory;
pub mod postgres;
pub mod repository;

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use repository::{Document, Repository};

use crate::config::DatabaseConfig;

/// Errors from a document store backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Duplicate document {collection}/{id}")]
    Duplicate { collection: String, id: String },

    #[error("Store backend error: {0}")]
    Backend(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Schemaless JSON documents grouped by collection.
///
/// `list` returns documents in insertion order; ordering by content is the
/// repository's job.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert(&self, collection: &str, id: &str, document: Value) -> Result<(), StoreError>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError>;

    async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError>;

    /// Returns `false` when no document with that id exists
    async fn replace(&self, collection: &str, id: &str, document: Value) -> Result<bool, StoreError>;

    /// Returns `false` when no document with that id exists
    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

/// Pick the backend from configuration: Postgres when a URL is set.
pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn DocumentStore>, StoreError> {
    match &config.url {
        Some(url) => {
            let store = PostgresStore::connect(url, config.max_connections).await?;
            tracing::info!("Using Postgres document store");
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory document store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
